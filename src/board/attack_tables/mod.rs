//! Attack tables for move generation.
//!
//! Leaper attacks, ray masks, between-squares and distance tables are plain
//! per-square lookups. Sliding attacks (bishop, rook, queen) go through magic
//! bitboard tables built in [`magic`].

#![allow(clippy::needless_range_loop)] // Index loops are clearer for board coordinates

mod leapers;
mod magic;

use crate::board::types::{Bitboard, Color, Square};

use magic::MagicTable;

/// The eight ray directions from a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub(crate) const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub(crate) const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub(crate) const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// (file, rank) step.
    const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    #[inline]
    pub(crate) const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest
        )
    }

    /// Directions whose steps increase the square index.
    #[inline]
    const fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }

    /// The square of `squares` closest to the ray origin.
    #[inline]
    pub(crate) fn nearest(self, squares: Bitboard) -> Option<Square> {
        if self.is_positive() {
            squares.lsb()
        } else {
            squares.msb()
        }
    }

    /// The square of `squares` farthest from the ray origin.
    #[inline]
    fn farthest(self, squares: Bitboard) -> Option<Square> {
        if self.is_positive() {
            squares.msb()
        } else {
            squares.lsb()
        }
    }
}

/// All precomputed attack data. Immutable once built.
pub(crate) struct AttackTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    rays: [[Bitboard; 64]; 8],
    between: Vec<Bitboard>,
    distance: [[u8; 64]; 64],
    rook: MagicTable,
    bishop: MagicTable,
}

impl AttackTables {
    /// Build every table. `magic_seed` drives the magic-number search.
    pub(crate) fn new(magic_seed: u64) -> Self {
        let rays = build_rays();
        let between = build_between(&rays);

        let mut distance = [[0u8; 64]; 64];
        for a in 0..64 {
            for b in 0..64 {
                let (sa, sb) = (Square::from_index(a), Square::from_index(b));
                let df = (sa.file() as i8 - sb.file() as i8).unsigned_abs();
                let dr = (sa.rank() as i8 - sb.rank() as i8).unsigned_abs();
                distance[a][b] = df.max(dr);
            }
        }

        let (rook, bishop) = magic::build_slider_tables(&rays, magic_seed);

        AttackTables {
            knight: leapers::knight_attacks(),
            king: leapers::king_attacks(),
            pawn: leapers::pawn_attacks(),
            rays,
            between,
            distance,
            rook,
            bishop,
        }
    }

    #[inline]
    pub(crate) fn knight(&self, sq: Square) -> Bitboard {
        self.knight[sq.index()]
    }

    #[inline]
    pub(crate) fn king(&self, sq: Square) -> Bitboard {
        self.king[sq.index()]
    }

    /// Squares attacked by a pawn of `color` standing on `sq`.
    #[inline]
    pub(crate) fn pawn(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.index()]
    }

    /// Every square from `sq` (exclusive) to the board edge in `dir`.
    #[inline]
    pub(crate) fn ray(&self, dir: Direction, sq: Square) -> Bitboard {
        self.rays[dir.index()][sq.index()]
    }

    /// Squares strictly between two aligned squares; empty otherwise.
    #[inline]
    pub(crate) fn between(&self, a: Square, b: Square) -> Bitboard {
        self.between[a.index() * 64 + b.index()]
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub(crate) fn distance(&self, a: Square, b: Square) -> u8 {
        self.distance[a.index()][b.index()]
    }

    #[inline]
    pub(crate) fn rook(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook.attacks(sq, occupied)
    }

    #[inline]
    pub(crate) fn bishop(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop.attacks(sq, occupied)
    }

    #[inline]
    pub(crate) fn queen(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook(sq, occupied) | self.bishop(sq, occupied)
    }
}

fn build_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    for dir in Direction::ALL {
        let (df, dr) = dir.delta();
        for sq in Square::all() {
            let mut ray = Bitboard::EMPTY;
            let mut cur = sq;
            while let Some(next) = cur.offset(df, dr) {
                ray |= Bitboard::from_square(next);
                cur = next;
            }
            rays[dir.index()][sq.index()] = ray;
        }
    }
    rays
}

fn build_between(rays: &[[Bitboard; 64]; 8]) -> Vec<Bitboard> {
    let mut between = vec![Bitboard::EMPTY; 64 * 64];
    for dir in Direction::ALL {
        for from in Square::all() {
            let ray = rays[dir.index()][from.index()];
            for to in ray {
                // Squares on the ray from `from` that lie before `to`.
                between[from.index() * 64 + to.index()] = ray & !rays[dir.index()][to.index()] & !Bitboard::from(to);
            }
        }
    }
    between
}

/// Reference slider attacks by walking each ray to its first blocker.
pub(crate) fn ray_attacks(
    rays: &[[Bitboard; 64]; 8],
    dirs: &[Direction],
    sq: Square,
    occupied: Bitboard,
) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &dir in dirs {
        let ray = rays[dir.index()][sq.index()];
        match dir.nearest(ray & occupied) {
            Some(blocker) => attacks |= ray & !rays[dir.index()][blocker.index()],
            None => attacks |= ray,
        }
    }
    attacks
}

/// Blocker squares that matter for a slider on `sq`: each ray minus its edge square.
pub(crate) fn relevant_mask(rays: &[[Bitboard; 64]; 8], dirs: &[Direction], sq: Square) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for &dir in dirs {
        let ray = rays[dir.index()][sq.index()];
        if let Some(edge) = dir.farthest(ray) {
            mask |= ray & !Bitboard::from(edge);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Tables;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_slider_attack_counts_on_empty_board() {
        let t = &Tables::global().attacks;
        assert_eq!(t.bishop(sq("d4"), Bitboard::EMPTY).popcount(), 13);
        assert_eq!(t.rook(sq("d4"), Bitboard::EMPTY).popcount(), 14);
        assert_eq!(t.queen(sq("d4"), Bitboard::EMPTY).popcount(), 27);
        assert_eq!(t.bishop(Square::A1, Bitboard::EMPTY).popcount(), 7);
        assert_eq!(t.rook(Square::A1, Bitboard::EMPTY).popcount(), 14);
    }

    #[test]
    fn test_magic_lookup_matches_ray_walk() {
        let t = &Tables::global().attacks;
        let occupancies = [
            Bitboard(0x0000_1824_0042_8100),
            Bitboard(0x00FF_0000_0000_FF00),
            Bitboard(0x8142_2418_1824_4281),
            Bitboard(0x0010_0000_2800_0400),
        ];
        for s in Square::all() {
            for &occ in &occupancies {
                assert_eq!(
                    t.rook(s, occ),
                    ray_attacks(&t.rays, &Direction::ORTHOGONAL, s, occ),
                    "rook on {s}"
                );
                assert_eq!(
                    t.bishop(s, occ),
                    ray_attacks(&t.rays, &Direction::DIAGONAL, s, occ),
                    "bishop on {s}"
                );
            }
        }
    }

    #[test]
    fn test_blocked_rook_stops_at_first_piece() {
        let t = &Tables::global().attacks;
        let occ = Bitboard::from(sq("d6")) | Bitboard::from(sq("f4"));
        let attacks = t.rook(sq("d4"), occ);
        assert!(attacks.contains(sq("d6")));
        assert!(!attacks.contains(sq("d7")));
        assert!(attacks.contains(sq("f4")));
        assert!(!attacks.contains(sq("g4")));
        assert!(attacks.contains(sq("a4")));
    }

    #[test]
    fn test_between_and_distance() {
        let t = &Tables::global().attacks;
        let between = t.between(Square::A1, Square::H8);
        assert_eq!(between.popcount(), 6);
        assert!(between.contains(sq("d4")));
        assert!(t.between(Square::A1, sq("b3")).is_empty());
        assert!(t.between(Square::E1, Square::F1).is_empty());
        assert_eq!(t.between(Square::H1, Square::E1), Bitboard::from(Square::F1) | Bitboard::from(Square::G1));
        assert_eq!(t.distance(Square::A1, Square::H8), 7);
        assert_eq!(t.distance(sq("e4"), sq("f6")), 2);
    }

    #[test]
    fn test_leaper_tables() {
        let t = &Tables::global().attacks;
        assert_eq!(t.knight(Square::A1).popcount(), 2);
        assert_eq!(t.knight(sq("e4")).popcount(), 8);
        assert_eq!(t.king(Square::H8).popcount(), 3);
        assert_eq!(t.pawn(Color::White, sq("e4")), Bitboard::from(sq("d5")) | Bitboard::from(sq("f5")));
        assert_eq!(t.pawn(Color::Black, Square::A8.offset(0, -1).unwrap()), Bitboard::from(sq("b6")));
    }
}
