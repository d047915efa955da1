//! Triangular principal-variation table.

use crate::board::types::{Move, MAX_PLY};

/// Row `p` holds the best line found from ply `p`, at most `MAX_PLY - p`
/// moves. Rows are packed back to back in one buffer.
pub(crate) struct PvTable {
    moves: Vec<Move>,
    len: [usize; MAX_PLY],
}

#[inline]
const fn row_start(ply: usize) -> usize {
    // Sum of MAX_PLY - i for i in 0..ply.
    ply * MAX_PLY - ply * (ply.saturating_sub(1)) / 2
}

impl PvTable {
    pub(crate) fn new() -> Self {
        PvTable {
            moves: vec![Move::NULL; row_start(MAX_PLY)],
            len: [0; MAX_PLY],
        }
    }

    #[inline]
    pub(crate) fn clear_row(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// `m` followed by the line already recorded one ply deeper.
    pub(crate) fn update(&mut self, ply: usize, m: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let start = row_start(ply);
        self.moves[start] = m;

        let child_len = if ply + 1 < MAX_PLY {
            self.len[ply + 1].min(MAX_PLY - ply - 1)
        } else {
            0
        };
        if child_len > 0 {
            let child = row_start(ply + 1);
            self.moves
                .copy_within(child..child + child_len, start + 1);
        }
        self.len[ply] = child_len + 1;
    }

    #[must_use]
    pub(crate) fn line(&self, ply: usize) -> &[Move] {
        if ply >= MAX_PLY {
            return &[];
        }
        let start = row_start(ply);
        &self.moves[start..start + self.len[ply]]
    }

    pub(crate) fn reset(&mut self) {
        self.len = [0; MAX_PLY];
    }
}
