//! Castling rights type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

pub(crate) const CASTLE_WHITE_K: u8 = 1 << 0;
pub(crate) const CASTLE_WHITE_Q: u8 = 1 << 1;
pub(crate) const CASTLE_BLACK_K: u8 = 1 << 2;
pub(crate) const CASTLE_BLACK_Q: u8 = 1 << 3;

const ALL_CASTLING_RIGHTS: u8 = CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// Rights that survive a move touching each square. Moving a king or rook
/// off its home square, or capturing a rook there, clears the matching bits.
const RIGHTS_KEPT: [u8; 64] = {
    let mut table = [ALL_CASTLING_RIGHTS; 64];
    table[Square::A1.index()] &= !CASTLE_WHITE_Q;
    table[Square::H1.index()] &= !CASTLE_WHITE_K;
    table[Square::E1.index()] &= !(CASTLE_WHITE_K | CASTLE_WHITE_Q);
    table[Square::A8.index()] &= !CASTLE_BLACK_Q;
    table[Square::H8.index()] &= !CASTLE_BLACK_K;
    table[Square::E8.index()] &= !(CASTLE_BLACK_K | CASTLE_BLACK_Q);
    table
};

/// Four castling flags packed in the low bits of a byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(ALL_CASTLING_RIGHTS)
    }

    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, kingside: bool) -> bool {
        self.0 & Self::bit_for(color, kingside) != 0
    }

    #[inline]
    pub fn set(&mut self, color: Color, kingside: bool) {
        self.0 |= Self::bit_for(color, kingside);
    }

    #[inline]
    pub fn remove(&mut self, color: Color, kingside: bool) {
        self.0 &= !Self::bit_for(color, kingside);
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Rights remaining after a move from `from` to `to`.
    #[inline]
    #[must_use]
    pub const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & RIGHTS_KEPT[from.index()] & RIGHTS_KEPT[to.index()])
    }

    /// Raw 4-bit value, also the index into the Zobrist castling keys.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        CastlingRights(value & ALL_CASTLING_RIGHTS)
    }

    #[inline]
    const fn bit_for(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => CASTLE_WHITE_K,
            (Color::White, false) => CASTLE_WHITE_Q,
            (Color::Black, true) => CASTLE_BLACK_K,
            (Color::Black, false) => CASTLE_BLACK_Q,
        }
    }
}

/// Rook origin and destination for a castling move, keyed by the king's
/// destination square.
#[inline]
pub(crate) fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    let rank = king_to.rank();
    if king_to.file() == 6 {
        (Square::from_coords(7, rank), Square::from_coords(5, rank))
    } else {
        (Square::from_coords(0, rank), Square::from_coords(3, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_move_clears_both_rights() {
        let rights = CastlingRights::all().after_move(Square::E1, Square::F1);
        assert!(!rights.has(Color::White, true));
        assert!(!rights.has(Color::White, false));
        assert!(rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }

    #[test]
    fn test_rook_capture_on_home_square_clears_right() {
        let b2: Square = "b2".parse().unwrap();
        let rights = CastlingRights::all().after_move(b2, Square::H8);
        assert!(!rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }

    #[test]
    fn test_rook_squares_for_castling() {
        assert_eq!(castle_rook_squares(Square::G1), (Square::H1, Square::F1));
        assert_eq!(castle_rook_squares(Square::C8), (Square::A8, Square::D8));
    }
}
