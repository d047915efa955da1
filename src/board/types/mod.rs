//! Core chess types.
//!
//! - `Piece` and `Color`
//! - `Square` - 6-bit square index
//! - `Bitboard` - 64-bit square set
//! - `Move`, `MoveList`, `ScoredMoveList` - 16-bit move encoding and lists
//! - `CastlingRights` - castling state

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveList, ScoredMove, ScoredMoveList, MAX_PLY};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use castling::castle_rook_squares;
pub(crate) use piece::PROMOTION_PIECES;
