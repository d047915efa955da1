//! Perft driver for checking move generation.
//!
//! Usage: `perft [depth] [fen...]`. Prints the per-move breakdown and the
//! total node count. Defaults to depth 4 from the starting position.

use std::process::ExitCode;
use std::time::Instant;

use bitboard_chess::board::{Position, START_FEN};

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let depth = match args.next().map(|d| d.parse::<usize>()) {
        None => 4,
        Some(Ok(d)) => d,
        Some(Err(err)) => {
            eprintln!("invalid depth: {err}");
            return ExitCode::FAILURE;
        }
    };
    let fen_parts: Vec<String> = args.collect();
    let fen = if fen_parts.is_empty() {
        START_FEN.to_string()
    } else {
        fen_parts.join(" ")
    };

    let mut pos = match Position::try_from_fen(&fen) {
        Ok(pos) => pos,
        Err(err) => {
            eprintln!("invalid FEN: {err}");
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let divide = pos.perft_divide(depth);
    let elapsed = start.elapsed();

    let mut total = 0u64;
    for (m, nodes) in &divide {
        println!("{m}: {nodes}");
        total += nodes;
    }
    if divide.is_empty() {
        total = pos.perft(depth);
    }

    let secs = elapsed.as_secs_f64().max(1e-9);
    println!();
    println!("perft({depth}) = {total}");
    println!("time {:.3}s, {:.0} nps", secs, total as f64 / secs);
    ExitCode::SUCCESS
}
