//! Opening book interface.
//!
//! The search asks the book first and only searches when it has nothing to
//! say. Book moves are re-checked for legality before they are played.

use std::collections::HashMap;

use crate::board::{Move, MoveParseError, Position};

/// Source of prepared moves.
pub trait OpeningBook: Send {
    fn try_book_move(&self, pos: &Position) -> Option<Move>;
}

/// The empty book.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn try_book_move(&self, _pos: &Position) -> Option<Move> {
        None
    }
}

/// Book built from move sequences, keyed by position hash. The first line
/// that reaches a position decides the reply.
#[derive(Clone, Debug, Default)]
pub struct LineBook {
    entries: HashMap<u64, Move>,
}

impl LineBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line of coordinate moves ("e2e4 e7e5 g1f3") played from the
    /// starting position.
    pub fn add_line(&mut self, line: &str) -> Result<(), MoveParseError> {
        let mut pos = Position::new();
        for text in line.split_whitespace() {
            let m = pos.parse_move(text)?;
            self.entries.entry(pos.hash()).or_insert(m);
            pos.make_move(m);
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OpeningBook for LineBook {
    fn try_book_move(&self, pos: &Position) -> Option<Move> {
        self.entries.get(&pos.hash()).copied()
    }
}
