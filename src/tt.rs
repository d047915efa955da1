//! Transposition table for caching search results.
//!
//! A fixed number of single-entry slots indexed by `key % capacity`. The
//! table never grows; colliding positions simply overwrite each other
//! according to the replacement policy in [`TranspositionTable::store`].
//!
//! Mate scores are stored relative to the node that produced them and
//! converted back to root-relative scores on the way out, so a mate found
//! through one path keeps the right distance when reached through another.

use std::mem;

use crate::board::search::MATE_THRESHOLD;
use crate::board::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

impl BoundType {
    fn to_u8(self) -> u8 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v & 0x3 {
            0 => BoundType::Exact,
            1 => BoundType::LowerBound,
            _ => BoundType::UpperBound,
        }
    }
}

/// Unpacked entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    /// Score as stored: mate scores are relative to the storing node.
    pub score: i16,
    pub bound_type: BoundType,
    /// `Move::NULL` when no move was recorded.
    pub best_move: Move,
}

/// Packed data word:
/// - bits 0-15:  move (u16, 0 = no move)
/// - bits 16-31: score (i16 as u16)
/// - bits 32-39: depth (u8)
/// - bits 40-41: bound
/// - bit 48:     occupied
const OCCUPIED: u64 = 1 << 48;

fn pack_entry(depth: u8, score: i16, bound_type: BoundType, best_move: Move) -> u64 {
    u64::from(best_move.as_u16())
        | (u64::from(score as u16) << 16)
        | (u64::from(depth) << 32)
        | (u64::from(bound_type.to_u8()) << 40)
        | OCCUPIED
}

fn unpack_entry(key: u64, data: u64) -> TTEntry {
    TTEntry {
        key,
        best_move: Move::from_u16((data & 0xFFFF) as u16),
        score: ((data >> 16) & 0xFFFF) as u16 as i16,
        depth: ((data >> 32) & 0xFF) as u8,
        bound_type: BoundType::from_u8(((data >> 40) & 0x3) as u8),
    }
}

#[derive(Clone, Copy, Default)]
struct TTSlot {
    key: u64,
    data: u64,
}

impl TTSlot {
    #[inline]
    fn is_empty(self) -> bool {
        self.data & OCCUPIED == 0
    }
}

/// Convert a root-relative score into a node-relative one for storage.
#[inline]
fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`].
#[inline]
fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

pub struct TranspositionTable {
    slots: Vec<TTSlot>,
}

impl TranspositionTable {
    /// Create a table using roughly `size_mb` megabytes. Always at least one slot.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let capacity = (size_mb * 1024 * 1024 / mem::size_of::<TTSlot>()).max(1);
        TranspositionTable {
            slots: vec![TTSlot::default(); capacity],
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.slots.len() as u64) as usize
    }

    /// The raw entry stored for `key`, if any. Scores are not ply-adjusted;
    /// use this for the move hint and [`TranspositionTable::lookup`] for scores.
    #[must_use]
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        let slot = self.slots[self.index(key)];
        if slot.is_empty() || slot.key != key {
            return None;
        }
        Some(unpack_entry(slot.key, slot.data))
    }

    /// A score usable at this node, or `None` when the entry is missing, too
    /// shallow, or its bound does not settle the `(alpha, beta)` window.
    #[must_use]
    pub fn lookup(&self, key: u64, depth: i32, ply: usize, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.probe(key)?;
        if i32::from(entry.depth) < depth {
            return None;
        }
        let score = score_from_tt(i32::from(entry.score), ply);
        match entry.bound_type {
            BoundType::Exact => Some(score),
            BoundType::LowerBound if score >= beta => Some(score),
            BoundType::UpperBound if score <= alpha => Some(score),
            _ => None,
        }
    }

    /// Store a search result.
    ///
    /// The slot is replaced when it is empty, when the new depth is at least
    /// the stored depth, or when the new bound is exact. Re-storing the same
    /// position without a move keeps the move already recorded.
    pub fn store(
        &mut self,
        key: u64,
        depth: i32,
        ply: usize,
        score: i32,
        bound_type: BoundType,
        best_move: Move,
    ) {
        let idx = self.index(key);
        let slot = self.slots[idx];
        let depth = depth.clamp(0, i32::from(u8::MAX)) as u8;

        if !slot.is_empty() {
            let old = unpack_entry(slot.key, slot.data);
            if depth < old.depth && bound_type != BoundType::Exact {
                return;
            }
        }

        let best_move = if best_move.is_null() && !slot.is_empty() && slot.key == key {
            unpack_entry(slot.key, slot.data).best_move
        } else {
            best_move
        };

        let score = score_to_tt(score, ply).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        self.slots[idx] = TTSlot {
            key,
            data: pack_entry(depth, score, bound_type, best_move),
        };
    }

    /// Fullness in per mille, sampled over the first thousand slots.
    #[must_use]
    pub fn hashfull(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample].iter().filter(|s| !s.is_empty()).count();
        (used * 1000 / sample) as u32
    }

    pub fn clear(&mut self) {
        self.slots.fill(TTSlot::default());
    }
}
