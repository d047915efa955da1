//! Attack tables for leaper pieces (knights, kings, pawns).

use crate::board::types::{Bitboard, Color, Square};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

fn step_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    for sq in Square::all() {
        attacks[sq.index()] = deltas
            .iter()
            .filter_map(|&(df, dr)| sq.offset(df, dr))
            .fold(Bitboard::EMPTY, |acc, to| acc | Bitboard::from(to));
    }
    attacks
}

pub(super) fn knight_attacks() -> [Bitboard; 64] {
    step_table(&KNIGHT_DELTAS)
}

pub(super) fn king_attacks() -> [Bitboard; 64] {
    step_table(&KING_DELTAS)
}

/// Indexed `[color][square]`: the two diagonal squares in front of a pawn.
pub(super) fn pawn_attacks() -> [[Bitboard; 64]; 2] {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    for color in Color::BOTH {
        let dr = color.pawn_direction();
        attacks[color.index()] = step_table(&[(-1, dr), (1, dr)]);
    }
    attacks
}
