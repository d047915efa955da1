#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable search parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchParams {
    /// Aspiration windows are used from this iteration on.
    pub aspiration_min_depth: u32,
    /// Initial half-width of the aspiration window in centipawns.
    pub aspiration_window: i32,
    pub lmr_min_depth: i32,
    /// Moves before this index are never reduced.
    pub lmr_min_move: usize,
    /// Skip captures that lose material in quiescence.
    pub qsearch_see_pruning: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            aspiration_min_depth: 4,
            aspiration_window: 25,
            lmr_min_depth: 3,
            lmr_min_move: 3,
            qsearch_see_pruning: true,
        }
    }
}
