//! Move types and move lists.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;

// Move flags (4 bits)
const FLAG_NONE: u16 = 0;
const FLAG_EN_PASSANT: u16 = 1;
const FLAG_CASTLE: u16 = 2;
const FLAG_PROMO_KNIGHT: u16 = 3;
const FLAG_PROMO_BISHOP: u16 = 4;
const FLAG_PROMO_ROOK: u16 = 5;
const FLAG_PROMO_QUEEN: u16 = 6;
const FLAG_DOUBLE_PUSH: u16 = 7;

/// Compact 16-bit move.
///
/// Encoding:
/// - bits 0-5:   from square (0-63)
/// - bits 6-11:  to square (0-63)
/// - bits 12-15: flag (none, en passant, castle, promotion piece, double push)
///
/// Whether a move captures is a property of the position, not of the move;
/// see `Position::is_capture`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u16);

impl Move {
    /// The all-zero "no move" value.
    pub const NULL: Move = Move(0);

    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Move::NULL
    }

    /// A plain move: quiet move or ordinary capture.
    #[inline]
    #[must_use]
    pub const fn normal(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_NONE)
    }

    #[inline]
    #[must_use]
    pub const fn double_push(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_DOUBLE_PUSH)
    }

    #[inline]
    #[must_use]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_EN_PASSANT)
    }

    /// Castling, encoded as the king's two-square move.
    #[inline]
    #[must_use]
    pub const fn castle(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_CASTLE)
    }

    /// Promotion; pawns and kings fall back to a queen.
    #[inline]
    #[must_use]
    pub const fn promotion(from: Square, to: Square, piece: Piece) -> Self {
        let flag = match piece {
            Piece::Knight => FLAG_PROMO_KNIGHT,
            Piece::Bishop => FLAG_PROMO_BISHOP,
            Piece::Rook => FLAG_PROMO_ROOK,
            _ => FLAG_PROMO_QUEEN,
        };
        Move::with_flag(from, to, flag)
    }

    #[inline]
    const fn with_flag(from: Square, to: Square, flag: u16) -> Self {
        Move(from.index() as u16 | ((to.index() as u16) << 6) | (flag << 12))
    }

    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index((self.0 & 0x3F) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index(((self.0 >> 6) & 0x3F) as usize)
    }

    #[inline]
    const fn flag(self) -> u16 {
        self.0 >> 12
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        self.flag() == FLAG_EN_PASSANT
    }

    #[inline]
    #[must_use]
    pub const fn is_castle(self) -> bool {
        self.flag() == FLAG_CASTLE
    }

    #[inline]
    #[must_use]
    pub const fn is_double_push(self) -> bool {
        self.flag() == FLAG_DOUBLE_PUSH
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        let f = self.flag();
        f >= FLAG_PROMO_KNIGHT && f <= FLAG_PROMO_QUEEN
    }

    #[inline]
    #[must_use]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self.flag() {
            FLAG_PROMO_KNIGHT => Some(Piece::Knight),
            FLAG_PROMO_BISHOP => Some(Piece::Bishop),
            FLAG_PROMO_ROOK => Some(Piece::Rook),
            FLAG_PROMO_QUEEN => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Raw 16-bit value (for hashing/storage)
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Move(value)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Move(null)");
        }
        write!(f, "Move({self}")?;
        if self.is_castle() {
            write!(f, " castle")?;
        }
        if self.is_en_passant() {
            write!(f, " ep")?;
        }
        if self.is_double_push() {
            write!(f, " double")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    /// Coordinate notation: `e2e4`, `e7e8q`, `0000` for the null move.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promo) = self.promotion_piece() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

pub(crate) const MAX_MOVES: usize = 256;

/// Maximum search depth in plies; sizes the PV table and killer slots.
pub const MAX_PLY: usize = 128;

/// List of moves with fixed-size backing array.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [Move::NULL; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, mv: Move) {
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    #[must_use]
    pub fn first(&self) -> Option<Move> {
        self.as_slice().first().copied()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.as_slice()[idx]
    }
}

/// A move paired with its ordering score.
#[derive(Clone, Copy, Debug)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-size list of scored moves to avoid heap allocation.
#[derive(Clone)]
pub struct ScoredMoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl ScoredMoveList {
    #[must_use]
    pub fn new() -> Self {
        ScoredMoveList {
            moves: [ScoredMove {
                mv: Move::NULL,
                score: 0,
            }; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        self.moves[self.len] = ScoredMove { mv, score };
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ScoredMove] {
        &self.moves[..self.len]
    }

    /// Selection step: swap the best-scored move at or after `start` into
    /// position `start` and return it. Avoids sorting moves that an early
    /// cutoff never reaches.
    #[inline]
    pub fn pick_best(&mut self, start: usize) -> Option<ScoredMove> {
        if start >= self.len {
            return None;
        }
        let mut best_idx = start;
        for i in (start + 1)..self.len {
            if self.moves[i].score > self.moves[best_idx].score {
                best_idx = i;
            }
        }
        self.moves.swap(start, best_idx);
        Some(self.moves[start])
    }
}

impl Default for ScoredMoveList {
    fn default() -> Self {
        ScoredMoveList::new()
    }
}
