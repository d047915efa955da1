//! Bitboard chess engine core.
//!
//! - [`board`]: position, legal move generation, SEE, draw rules and the
//!   alpha-beta search.
//! - [`tt`]: the transposition table.
//! - [`engine`]: a background search thread with start/cancel/callback
//!   control, for a protocol layer to drive.

pub mod board;
pub mod book;
pub mod engine;
pub mod evaluation;
pub mod sync;
pub mod timer;
pub mod tt;
mod zobrist;

pub use board::{Color, Move, Piece, Position, Square};
pub use engine::{Engine, EngineConfig, EngineError};
pub use tt::TranspositionTable;
