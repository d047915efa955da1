//! Chess board representation and game logic.
//!
//! A [`Position`] keeps a square array, bitboards and piece lists in sync
//! and is changed only through make/unmake. Legal move generation uses
//! magic bitboards with pin and check analysis.
//!
//! # Example
//! ```
//! use bitboard_chess::board::Position;
//!
//! let pos = Position::new();
//! let moves = pos.legal_moves();
//! println!("Starting position has {} legal moves", moves.len());
//! ```

mod attack_tables;
mod draw;
mod error;
mod fen;
mod make_unmake;
mod movegen;
mod perft;
pub mod search;
mod see;
mod state;
mod tables;
mod types;

#[cfg(test)]
mod tests;

pub use draw::GameStatus;
pub use error::{FenError, MoveParseError, SquareError};
pub use fen::START_FEN;
pub use movegen::GenMode;
pub use state::Position;
pub use tables::Tables;
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, Move, MoveList, Piece, ScoredMove,
    ScoredMoveList, Square, MAX_PLY,
};

pub use search::{
    find_best_move, search, SearchConfig, SearchInfoCallback, SearchIterationInfo, SearchParams,
    SearchResult, SearchState, DEFAULT_TT_MB,
};
