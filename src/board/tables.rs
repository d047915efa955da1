//! The immutable table context shared by every position.
//!
//! Attack tables, magic numbers and Zobrist keys are built exactly once and
//! only read afterwards. Positions hold a `&'static Tables` so move
//! generation, SEE and search reach the tables through the position they
//! operate on.

use once_cell::sync::Lazy;

use super::attack_tables::AttackTables;
use crate::zobrist::{ZobristKeys, ZOBRIST_SEED};

/// Seed for the magic-number search.
const MAGIC_SEED: u64 = 0x5EED_4A61_C0DE;

static GLOBAL: Lazy<Tables> = Lazy::new(|| Tables::new(MAGIC_SEED, ZOBRIST_SEED));

/// Precomputed attack tables and hash keys.
pub struct Tables {
    pub(crate) attacks: AttackTables,
    pub(crate) zobrist: ZobristKeys,
}

impl Tables {
    /// Build a fresh set of tables. Building is comparatively slow (magic
    /// search); most callers want [`Tables::global`].
    #[must_use]
    pub fn new(magic_seed: u64, zobrist_seed: u64) -> Self {
        log::debug!("building attack tables and zobrist keys");
        Tables {
            attacks: AttackTables::new(magic_seed),
            zobrist: ZobristKeys::new(zobrist_seed),
        }
    }

    /// The process-wide tables, built on first use.
    #[must_use]
    pub fn global() -> &'static Tables {
        &GLOBAL
    }
}
