#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::search::{SearchParams, DEFAULT_TT_MB};

/// Engine construction options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Transposition table size in MB.
    pub tt_mb: usize,
    pub params: SearchParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tt_mb: DEFAULT_TT_MB,
            params: SearchParams::default(),
        }
    }
}
