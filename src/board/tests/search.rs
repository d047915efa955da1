//! Search algorithm tests.
//!
//! Tests for alpha-beta against exhaustive minimax, terminal scoring, mate
//! finding, cancellation and transposition table robustness.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::board::search::{
    find_best_move, mate_in_moves, mated_in, search, SearchConfig, SearchIterationInfo,
    SearchParams, SearchState, MATE_SCORE,
};
use crate::board::{Color, GameStatus, Move, Piece, Position};
use crate::book::LineBook;
use crate::evaluation::{Evaluator, MaterialEvaluator};
use crate::sync::StopFlag;
use crate::tt::BoundType;

fn pos(fen: &str) -> Position {
    Position::try_from_fen(fen).unwrap()
}

fn search_depth(p: &mut Position, depth: u32) -> crate::board::SearchResult {
    let mut state = SearchState::new(1);
    search(p, &mut state, SearchConfig::depth(depth), &StopFlag::new())
}

// ============================================================================
// Exhaustive reference
// ============================================================================

/// Plain negamax with the same leaf rules as the real search: draw checks
/// below the root, check extension, and a capture-only quiescence that skips
/// SEE-losing captures. No windows, no table, no reductions.
fn reference_negamax(p: &mut Position, depth: i32, ply: usize) -> i32 {
    reference_negamax_with(p, depth, ply, &MaterialEvaluator)
}

fn reference_negamax_with(p: &mut Position, depth: i32, ply: usize, eval: &dyn Evaluator) -> i32 {
    if ply > 0 {
        if p.is_fifty_move_draw() {
            return if p.in_check() && !p.has_legal_moves() {
                mated_in(ply)
            } else {
                0
            };
        }
        if p.is_threefold_repetition() || p.has_insufficient_material() {
            return 0;
        }
    }

    let in_check = p.in_check();
    let depth = if in_check { depth + 1 } else { depth };
    if depth <= 0 {
        return reference_quiescence(p, eval);
    }

    let moves = p.legal_moves();
    if moves.is_empty() {
        return if in_check { mated_in(ply) } else { 0 };
    }

    let mut best = i32::MIN;
    for &m in moves.iter() {
        p.make_move(m);
        let score = -reference_negamax_with(p, depth - 1, ply + 1, eval);
        p.unmake_move(m);
        best = best.max(score);
    }
    best
}

fn reference_quiescence(p: &mut Position, eval: &dyn Evaluator) -> i32 {
    let see_pruning = SearchParams::default().qsearch_see_pruning;
    let mut best = eval.evaluate(p);
    for &m in p.capture_moves().iter() {
        if see_pruning && !m.is_promotion() && !p.see_ge(m, 0) {
            continue;
        }
        p.make_move(m);
        let score = -reference_quiescence(p, eval);
        p.unmake_move(m);
        best = best.max(score);
    }
    best
}

/// Positions without perpetual-check shuffles inside the tested depths, so
/// transpositions cannot carry a deeper result into a shallower node.
const AGREEMENT_POSITIONS: &[(&str, u32)] = &[
    ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 3),
    ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 1),
    ("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1", 4),
    ("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4", 3),
    ("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", 4),
    ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 4),
];

#[test]
fn search_agrees_with_exhaustive_negamax() {
    for &(fen, max_depth) in AGREEMENT_POSITIONS {
        for depth in 1..=max_depth {
            let mut p = pos(fen);
            let expected = reference_negamax(&mut p, depth as i32, 0);
            let result = search_depth(&mut p, depth);

            assert_eq!(
                result.score, expected,
                "score mismatch for '{fen}' at depth {depth}"
            );
            assert!(p.is_legal(result.best_move), "illegal best move for '{fen}'");

            // The reported move really achieves the reported score.
            if mate_in_moves(expected).is_none() {
                let mv = result.best_move;
                p.make_move(mv);
                let achieved = -reference_negamax(&mut p, depth as i32 - 1, 1);
                p.unmake_move(mv);
                assert_eq!(achieved, expected, "{mv} does not achieve the score for '{fen}'");
            }
        }
    }
}

#[test]
fn aspiration_research_keeps_full_depth_score() {
    // A large tempo bonus flips the score sign with every extra ply, so each
    // iteration from the aspiration threshold on lands outside its window:
    // depth 4 fails high and depth 5 fails low.
    const TEMPO: i32 = 100;
    let tempo = |_: &Position| TEMPO;
    let params = SearchParams::default();
    let window = params.aspiration_window;
    let first_window_depth = params.aspiration_min_depth;
    let mut state = SearchState::with_components(
        1,
        params,
        Box::new(tempo),
        Box::new(crate::book::NoBook),
    );

    let seen: Arc<Mutex<Vec<SearchIterationInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let config = SearchConfig::depth(5).with_info_callback(Arc::new(move |info: &SearchIterationInfo| {
        sink.lock().unwrap().push(info.clone());
    }));

    let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
    let mut p = pos(fen);
    let result = search(&mut p, &mut state, config, &StopFlag::new());
    assert_eq!(result.depth, 5);
    assert_eq!(p.to_fen(), fen);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    for info in seen.iter() {
        let expected = reference_negamax_with(&mut p, info.depth as i32, 0, &tempo);
        assert_eq!(info.score, expected, "score mismatch at depth {}", info.depth);
        let expected_sign = if info.depth % 2 == 0 { TEMPO } else { -TEMPO };
        assert_eq!(info.score, expected_sign);
    }
    for pair in seen.windows(2).filter(|w| w[1].depth >= first_window_depth) {
        // The new score lies outside the window centred on the previous
        // one, so the iteration had to search again.
        assert!(
            (pair[1].score - pair[0].score).abs() > window,
            "no re-search at depth {}",
            pair[1].depth
        );
    }
}

// ============================================================================
// Terminal positions
// ============================================================================

#[test]
fn stalemated_root_returns_null_and_draw() {
    let mut p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let result = search_depth(&mut p, 4);
    assert_eq!(result.best_move, Move::NULL);
    assert_eq!(result.score, 0);

    let mut state = SearchState::new(1);
    assert_eq!(find_best_move(&mut p, &mut state, 4, &StopFlag::new()), None);
}

#[test]
fn checkmated_root_returns_null_and_mate_score() {
    let mut p = Position::new();
    for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        p.make_move_text(m).unwrap();
    }
    let result = search_depth(&mut p, 4);
    assert_eq!(result.best_move, Move::NULL);
    assert_eq!(result.score, -MATE_SCORE);
}

#[test]
fn fifty_move_rule_flattens_score() {
    // A queen up, but every move reaches the hundredth ply.
    let mut p = pos("4k3/8/8/8/8/8/8/Q3K3 w - - 99 80");
    let result = search_depth(&mut p, 2);
    assert_eq!(result.score, 0);
}

#[test]
fn mate_on_hundredth_ply_is_still_mate() {
    let mut p = pos("7k/8/6K1/8/8/8/8/Q7 w - - 99 80");
    let result = search_depth(&mut p, 3);
    assert_eq!(result.score, MATE_SCORE - 1);
    p.make_move(result.best_move);
    assert_eq!(p.game_status(), GameStatus::Checkmate);
}

#[test]
fn insufficient_material_below_root_is_draw() {
    // Taking the last pawn would leave a bare knight: a dead draw.
    let mut p = pos("4k3/8/8/3p4/8/4N3/8/4K3 w - - 0 1");
    let result = search_depth(&mut p, 3);
    assert_ne!(result.best_move.to_string(), "e3d5");
    assert!(result.score > 0, "score {}", result.score);
}

// ============================================================================
// Mate finding
// ============================================================================

#[test]
fn finds_back_rank_mate_in_one() {
    let mut p = pos("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1");
    let result = search_depth(&mut p, 4);
    assert_eq!(result.best_move.to_string(), "d1d8");
    assert_eq!(result.score, MATE_SCORE - 1);
    assert_eq!(mate_in_moves(result.score), Some(1));
    // Mate found inside the horizon ends the deepening early.
    assert_eq!(result.depth, 1);
}

#[test]
fn finds_rook_roller_mate_in_two() {
    let mut p = pos("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1");
    let result = search_depth(&mut p, 6);
    assert_eq!(result.score, MATE_SCORE - 3);
    assert_eq!(mate_in_moves(result.score), Some(2));
    assert_eq!(result.pv.len(), 3);
    for &m in &result.pv {
        assert!(p.is_legal(m));
        p.make_move(m);
    }
    assert_eq!(p.game_status(), GameStatus::Checkmate);
}

#[test]
fn forced_mate_against_side_to_move() {
    // Kg8 is the only move, then Ra8 mates.
    let mut p = pos("7k/R7/6K1/8/8/8/8/8 b - - 0 1");
    let result = search_depth(&mut p, 4);
    assert_eq!(result.best_move.to_string(), "h8g8");
    assert_eq!(result.score, -MATE_SCORE + 2);
    assert_eq!(mate_in_moves(result.score), Some(-1));
    assert_eq!(result.depth, 2);
}

#[test]
fn wins_hanging_queen() {
    let mut p = pos("4k3/8/8/3q4/8/8/3R4/3K4 w - - 0 1");
    let result = search_depth(&mut p, 3);
    assert_eq!(result.best_move.to_string(), "d2d5");
    assert!(result.score > 300);
}

#[test]
fn pv_is_a_legal_line() {
    let mut p = pos("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
    let result = search_depth(&mut p, 5);
    assert_eq!(result.best_move.to_string(), "h5f7");
    assert_eq!(result.pv.first(), Some(&result.best_move));

    let fen = p.to_fen();
    for &m in &result.pv {
        assert!(p.is_legal(m), "{m} illegal in pv");
        p.make_move(m);
    }
    for &m in result.pv.iter().rev() {
        p.unmake_move(m);
    }
    assert_eq!(p.to_fen(), fen);
}

// ============================================================================
// Iteration reporting
// ============================================================================

#[test]
fn info_callback_reports_each_iteration() {
    let seen: Arc<Mutex<Vec<SearchIterationInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let config = SearchConfig::depth(4).with_info_callback(Arc::new(move |info: &SearchIterationInfo| {
        sink.lock().unwrap().push(info.clone());
    }));

    let mut p = Position::new();
    let mut state = SearchState::new(1);
    let result = search(&mut p, &mut state, config, &StopFlag::new());

    let seen = seen.lock().unwrap();
    let depths: Vec<u32> = seen.iter().map(|i| i.depth).collect();
    assert_eq!(depths, vec![1, 2, 3, 4]);
    assert!(seen.windows(2).all(|w| w[0].nodes <= w[1].nodes));
    let last = seen.last().unwrap();
    assert_eq!(last.pv, result.pv);
    assert_eq!(last.score, result.score);
    assert!(last.to_string().starts_with("depth 4 score cp "));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn pre_stopped_search_returns_fallback_move() {
    let mut p = Position::new();
    let mut state = SearchState::new(1);
    let result = search(&mut p, &mut state, SearchConfig::depth(10), &StopFlag::stopped());

    assert!(result.stopped);
    assert_eq!(result.depth, 0);
    assert!(p.is_legal(result.best_move));
    assert_eq!(p.to_fen(), Position::new().to_fen());
}

#[test]
fn stop_flag_from_another_thread_keeps_last_iteration() {
    let stop = StopFlag::new();
    let remote = stop.clone();
    let handle = thread::spawn(move || {
        let mut p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let mut state = SearchState::new(4);
        let result = search(&mut p, &mut state, SearchConfig::depth(64), &remote);
        (p, result)
    });

    thread::sleep(Duration::from_millis(200));
    stop.stop();
    let (p, result) = handle.join().unwrap();

    assert!(result.stopped);
    assert!(result.depth >= 1);
    assert!(result.depth < 64);
    assert!(p.is_legal(result.best_move));
    assert!(p.is_consistent());
}

#[test]
fn time_limit_ends_search() {
    let mut p = Position::new();
    let mut state = SearchState::new(4);
    let start = Instant::now();
    let result = search(
        &mut p,
        &mut state,
        SearchConfig::depth(64).with_time_limit(100),
        &StopFlag::new(),
    );
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(result.stopped);
    assert!(p.is_legal(result.best_move));
}

// ============================================================================
// Transposition table robustness
// ============================================================================

#[test]
fn poisoned_table_never_yields_illegal_moves() {
    let mut p = pos("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
    let mut state = SearchState::new(1);
    let bogus = Move::normal("a3".parse().unwrap(), "h8".parse().unwrap());

    // Claim an exact deep result with a nonsense move for the root and every
    // child position.
    let key = p.hash();
    state.tt.store(key, 60, 0, 123, BoundType::Exact, bogus);
    for &m in p.legal_moves().iter() {
        p.make_move(m);
        state.tt.store(p.hash(), 60, 1, -50, BoundType::Exact, bogus);
        p.unmake_move(m);
    }

    let result = search(&mut p, &mut state, SearchConfig::depth(4), &StopFlag::new());
    assert!(p.is_legal(result.best_move));
    assert!(result.pv.iter().all(|&m| m != bogus));
}

#[test]
fn shared_state_across_positions_stays_legal() {
    // A tiny table forces constant index aliasing between positions.
    let mut state = SearchState::new(0);
    for fen in AGREEMENT_POSITIONS.iter().map(|(f, _)| *f) {
        let mut p = pos(fen);
        let result = search(&mut p, &mut state, SearchConfig::depth(4), &StopFlag::new());
        assert!(p.is_legal(result.best_move), "illegal move for '{fen}'");
        assert_eq!(p.hash(), p.compute_hash());
    }
}

// ============================================================================
// Book
// ============================================================================

#[test]
fn book_move_short_circuits_search() {
    let mut book = LineBook::new();
    book.add_line("d2d4 d7d5").unwrap();
    let mut state = SearchState::with_components(
        1,
        SearchParams::default(),
        Box::new(MaterialEvaluator),
        Box::new(book),
    );

    let mut p = Position::new();
    let result = search(&mut p, &mut state, SearchConfig::depth(6), &StopFlag::new());
    assert!(result.from_book);
    assert_eq!(result.best_move.to_string(), "d2d4");
    assert_eq!(result.nodes, 0);

    p.make_move_text("e2e4").unwrap();
    let result = search(&mut p, &mut state, SearchConfig::depth(2), &StopFlag::new());
    assert!(!result.from_book);
}

#[test]
fn custom_evaluator_is_used() {
    // An evaluator that loves a pawn on a3 makes a2a3 the best first move.
    let likes_a3 = |p: &Position| {
        let pawn_a3 = p.piece_at("a3".parse().unwrap()) == Some((Color::White, Piece::Pawn));
        let sign = if p.side_to_move() == Color::White { 1 } else { -1 };
        if pawn_a3 {
            500 * sign
        } else {
            0
        }
    };
    let mut state = SearchState::with_components(
        1,
        SearchParams::default(),
        Box::new(likes_a3),
        Box::new(crate::book::NoBook),
    );
    let mut p = Position::new();
    let result = search(&mut p, &mut state, SearchConfig::depth(2), &StopFlag::new());
    assert_eq!(result.best_move.to_string(), "a2a3");
}
