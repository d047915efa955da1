//! Magic bitboard tables for sliding pieces.
//!
//! For each square the relevant blocker mask is multiplied by a magic number
//! and shifted, giving a perfect hash from blocker configuration to a slot in
//! a shared attack array. Magics are searched at startup with a seeded RNG,
//! so every build of the tables is identical.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ray_attacks, relevant_mask, Direction};
use crate::board::types::{Bitboard, Square};

/// Per-square hashing parameters.
#[derive(Clone, Copy, Debug, Default)]
struct Magic {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        let hash = (occupied & self.mask).0.wrapping_mul(self.magic) >> self.shift;
        self.offset + hash as usize
    }
}

/// Magic lookup for one slider kind (rook or bishop).
pub(crate) struct MagicTable {
    magics: [Magic; 64],
    attacks: Vec<Bitboard>,
}

impl MagicTable {
    fn build(rays: &[[Bitboard; 64]; 8], dirs: &[Direction], rng: &mut StdRng) -> Self {
        let mut magics = [Magic::default(); 64];
        let mut attacks = Vec::new();

        for sq in Square::all() {
            let mask = relevant_mask(rays, dirs, sq);
            let bits = mask.popcount();
            let occupancies = blocker_subsets(mask);
            let reference: Vec<Bitboard> = occupancies
                .iter()
                .map(|&occ| ray_attacks(rays, dirs, sq, occ))
                .collect();

            let (magic, table) = find_magic(mask, bits, &occupancies, &reference, rng);
            magics[sq.index()] = Magic {
                mask,
                magic,
                shift: 64 - bits,
                offset: attacks.len(),
            };
            attacks.extend(table);
        }

        MagicTable { magics, attacks }
    }

    #[inline]
    pub(crate) fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.attacks[self.magics[sq.index()].index(occupied)]
    }
}

/// Build the rook and bishop tables from one seeded RNG.
pub(super) fn build_slider_tables(rays: &[[Bitboard; 64]; 8], seed: u64) -> (MagicTable, MagicTable) {
    let mut rng = StdRng::seed_from_u64(seed);
    let rook = MagicTable::build(rays, &Direction::ORTHOGONAL, &mut rng);
    let bishop = MagicTable::build(rays, &Direction::DIAGONAL, &mut rng);
    log::trace!(
        "magic tables built: {} rook slots, {} bishop slots",
        rook.attacks.len(),
        bishop.attacks.len()
    );
    (rook, bishop)
}

/// Every subset of `mask`, enumerated with the carry-rippler trick.
fn blocker_subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mut subsets = Vec::with_capacity(1 << mask.popcount());
    let mut subset = 0u64;
    loop {
        subsets.push(Bitboard(subset));
        subset = subset.wrapping_sub(mask.0) & mask.0;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Try sparse random candidates until one maps every blocker subset to a
/// slot without a destructive collision. Returns the magic and its filled
/// attack slots.
fn find_magic(
    mask: Bitboard,
    bits: u32,
    occupancies: &[Bitboard],
    reference: &[Bitboard],
    rng: &mut StdRng,
) -> (u64, Vec<Bitboard>) {
    let size = 1usize << bits;
    let mut table = vec![Bitboard::EMPTY; size];
    // Slot i is filled for the current attempt when epochs[i] == epoch.
    let mut epochs = vec![0u32; size];
    let mut epoch = 0u32;

    loop {
        let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (mask.0.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        epoch += 1;
        let mut collision = false;
        for (occ, &attack) in occupancies.iter().zip(reference) {
            let idx = (occ.0.wrapping_mul(magic) >> (64 - bits)) as usize;
            if epochs[idx] != epoch {
                epochs[idx] = epoch;
                table[idx] = attack;
            } else if table[idx] != attack {
                collision = true;
                break;
            }
        }

        if !collision {
            return (magic, table);
        }
    }
}
