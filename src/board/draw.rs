//! Draw rules and game-end classification.

use super::state::Position;
use super::types::{Bitboard, Piece};

/// Outcome of the position for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    FiftyMoveDraw,
    Repetition,
    InsufficientMaterial,
}

impl GameStatus {
    #[must_use]
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }

    #[must_use]
    pub fn is_draw(self) -> bool {
        !matches!(self, GameStatus::Ongoing | GameStatus::Checkmate)
    }
}

impl Position {
    /// Hundred plies without a capture or pawn move.
    #[inline]
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// How many times the current position has occurred, counting now.
    ///
    /// Only positions since the last irreversible move can repeat, and only
    /// those with the same side to move, so the walk steps back two plies at
    /// a time and stops at the halfmove clock.
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        let keys = &self.key_history;
        let window = usize::from(self.halfmove_clock).min(keys.len());
        let mut count = 1;
        let mut back = 2;
        while back <= window {
            if keys[keys.len() - back] == self.hash {
                count += 1;
            }
            back += 2;
        }
        count
    }

    #[inline]
    #[must_use]
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// bishops only, all on squares of one color.
    #[must_use]
    pub fn has_insufficient_material(&self) -> bool {
        let heavy = self.pieces_of_type(Piece::Pawn)
            | self.pieces_of_type(Piece::Rook)
            | self.pieces_of_type(Piece::Queen);
        if heavy.any() {
            return false;
        }
        let knights = self.pieces_of_type(Piece::Knight);
        let bishops = self.pieces_of_type(Piece::Bishop);
        if (knights | bishops).popcount() <= 1 {
            return true;
        }
        knights.is_empty()
            && ((bishops & Bitboard::LIGHT_SQUARES).is_empty()
                || (bishops & Bitboard::DARK_SQUARES).is_empty())
    }

    /// Draw by rule, ignoring stalemate (which needs move generation).
    ///
    /// A fifty-move position where the side to move is checkmated is not a
    /// draw; callers that already know there are no legal moves should use
    /// [`Position::game_status`].
    #[must_use]
    pub fn is_draw(&self) -> bool {
        if self.is_fifty_move_draw() && !(self.in_check() && !self.has_legal_moves()) {
            return true;
        }
        self.is_threefold_repetition() || self.has_insufficient_material()
    }

    /// Full classification. Checkmate takes priority over every draw rule.
    #[must_use]
    pub fn game_status(&self) -> GameStatus {
        if !self.has_legal_moves() {
            return if self.in_check() {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_fifty_move_draw() {
            GameStatus::FiftyMoveDraw
        } else if self.is_threefold_repetition() {
            GameStatus::Repetition
        } else if self.has_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Ongoing
        }
    }
}
