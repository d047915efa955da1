//! Make/unmake move tests.

use crate::board::{Color, Move, Piece, Position, Square};
use rand::prelude::*;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

/// Make `text`, check the position is self-consistent, unmake, and check
/// everything is back.
fn round_trip(fen: &str, text: &str) -> Position {
    let mut pos = Position::try_from_fen(fen).unwrap();
    let fen_before = pos.to_fen();
    let hash_before = pos.hash();

    let mv = pos.parse_move(text).unwrap();
    pos.make_move(mv);
    assert!(pos.is_consistent(), "inconsistent after {text}");
    assert_eq!(pos.hash(), pos.compute_hash(), "hash drift after {text}");
    let after = pos.clone();

    pos.unmake_move(mv);
    assert!(pos.is_consistent());
    assert_eq!(pos.to_fen(), fen_before);
    assert_eq!(pos.hash(), hash_before);
    after
}

#[test]
fn test_en_passant_make_unmake() {
    let after = round_trip(
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "e5f6",
    );
    assert_eq!(after.piece_at(sq("f5")), None);
    assert_eq!(after.piece_at(sq("f6")), Some((Color::White, Piece::Pawn)));
    assert_eq!(after.ep_square(), None);
}

#[test]
fn test_promotion_make_unmake() {
    let after = round_trip("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7b8q");
    assert_eq!(after.piece_at(sq("b8")), Some((Color::White, Piece::Queen)));
    assert!(after.pieces(Color::White, Piece::Pawn).is_empty());
    assert!(after.pieces(Color::Black, Piece::Knight).is_empty());
}

#[test]
fn test_castling_make_unmake() {
    let after = round_trip("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "e1g1");
    assert_eq!(after.piece_at(sq("g1")), Some((Color::White, Piece::King)));
    assert_eq!(after.piece_at(sq("f1")), Some((Color::White, Piece::Rook)));
    assert_eq!(after.piece_at(sq("h1")), None);
    assert!(!after.castling_rights().has(Color::White, true));
    assert!(!after.castling_rights().has(Color::White, false));
    assert!(after.castling_rights().has(Color::Black, false));

    let after = round_trip("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", "e8c8");
    assert_eq!(after.piece_at(sq("c8")), Some((Color::Black, Piece::King)));
    assert_eq!(after.piece_at(sq("d8")), Some((Color::Black, Piece::Rook)));
}

#[test]
fn test_rook_capture_clears_castling_right() {
    let after = round_trip("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "a1a8");
    assert!(!after.castling_rights().has(Color::White, false));
    assert!(!after.castling_rights().has(Color::Black, false));
    assert!(after.castling_rights().has(Color::Black, true));
}

#[test]
fn test_double_push_sets_en_passant_only_when_capturable() {
    let after = round_trip("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1", "e2e4");
    assert_eq!(after.ep_square(), Some(sq("e3")));

    let after = round_trip("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", "e2e4");
    assert_eq!(after.ep_square(), None);
}

#[test]
fn test_null_move_is_ignored() {
    let mut pos = Position::new();
    let fen = pos.to_fen();
    pos.make_move(Move::NULL);
    pos.unmake_move(Move::NULL);
    assert_eq!(pos.to_fen(), fen);
    assert_eq!(pos.game_ply(), 0);
}

#[test]
fn test_legal_moves_stable_after_make_unmake() {
    let mut pos = Position::try_from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    let initial_moves = pos.legal_moves();
    let mut initial_list: Vec<String> = initial_moves.iter().map(|m| m.to_string()).collect();
    initial_list.sort();

    for &mv in initial_moves.iter() {
        pos.make_move(mv);
        pos.unmake_move(mv);
    }

    let mut after_list: Vec<String> = pos.legal_moves().iter().map(|m| m.to_string()).collect();
    after_list.sort();

    assert_eq!(initial_list, after_list);
}

#[test]
fn test_random_playout_round_trip_state() {
    for seed in [0x5EED_u64, 0xC0FFEE, 7, 42] {
        let mut pos = Position::new();
        let initial_fen = pos.to_fen();
        let initial_hash = pos.hash();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut history: Vec<Move> = Vec::new();

        for _ in 0..200 {
            let moves = pos.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            pos.make_move(mv);
            history.push(mv);
            assert!(pos.is_consistent(), "seed {seed}: inconsistent after {mv}");
            assert_eq!(pos.hash(), pos.compute_hash(), "seed {seed}: hash drift after {mv}");
        }

        while let Some(mv) = history.pop() {
            pos.unmake_move(mv);
            assert_eq!(pos.hash(), pos.compute_hash());
        }

        assert_eq!(pos.hash(), initial_hash);
        assert_eq!(pos.to_fen(), initial_fen);
        assert!(pos.is_consistent());
    }
}
