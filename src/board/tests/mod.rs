//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Move generator node counts on reference positions
//! - `draw.rs` - Draw detection (50-move, repetition, insufficient material)
//! - `make_unmake.rs` - Make/unmake move correctness
//! - `proptest.rs` - Property-based tests
//! - `search.rs` - Search results against exhaustive minimax and known tactics

mod make_unmake;
mod search;
