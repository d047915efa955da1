//! Search constants.
//!
//! Score scale, mate encoding and move-ordering buckets used by the
//! alpha-beta search.

use crate::board::types::MAX_PLY;

// ============================================================================
// SCORES
// ============================================================================

/// Larger than any reachable score; the initial full window.
pub const INFINITY: i32 = 32_000;

/// Score of delivering mate at the root. Mate in `n` plies scores
/// `MATE_SCORE - n`.
pub const MATE_SCORE: i32 = 31_000;

/// Scores with absolute value >= this are mate scores.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

/// Score for the side to move being checkmated at `ply`.
#[inline]
#[must_use]
pub const fn mated_in(ply: usize) -> i32 {
    -MATE_SCORE + ply as i32
}

/// Full moves to mate (negative when the side to move is being mated), or
/// `None` for ordinary scores.
#[must_use]
pub fn mate_in_moves(score: i32) -> Option<i32> {
    if score >= MATE_THRESHOLD {
        Some((MATE_SCORE - score + 1) / 2)
    } else if score <= -MATE_THRESHOLD {
        Some(-(MATE_SCORE + score + 1) / 2)
    } else {
        None
    }
}

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores = tried earlier.

/// Hash move, or the previous iteration's best move at the root.
pub const HASH_MOVE_SCORE: i32 = 10_000_000;

/// Queen promotions, capturing or not.
pub const QUEEN_PROMOTION_SCORE: i32 = 9_000_000;

/// Captures that do not lose material.
pub const GOOD_CAPTURE_SCORE: i32 = 8_000_000;

pub const KILLER1_SCORE: i32 = 7_000_000;
pub const KILLER2_SCORE: i32 = 6_900_000;

/// Captures that lose material by static exchange.
pub const BAD_CAPTURE_SCORE: i32 = -1_000_000;

/// Knight, bishop and rook promotions.
pub const UNDER_PROMOTION_SCORE: i32 = -2_000_000;

/// History entries are halved table-wide once one passes this.
pub const HISTORY_MAX: i32 = 1 << 20;

// ========================================================================
// REDUCTIONS
// ========================================================================

/// LMR reduction table dimensions (depth x move index).
pub const LMR_TABLE_MAX_DEPTH: usize = 64;
pub const LMR_TABLE_MAX_IDX: usize = 256;

/// The clock is read every this many nodes (mask).
pub const STOP_CHECK_MASK: u64 = 1023;
