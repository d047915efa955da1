//! Zobrist hashing keys.
//!
//! Provides incrementally-updatable 64-bit position hashes for the
//! transposition table and repetition detection.

use rand::prelude::*;

use crate::board::{CastlingRights, Color, Piece, Square};

/// Fixed seed so hashes are reproducible across runs.
pub(crate) const ZOBRIST_SEED: u64 = 1_234_567_890;

pub(crate) struct ZobristKeys {
    // pieces[color][piece_type][square_index]
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    // One key per castling-rights bitmask value (0-15)
    castling: [u64; 16],
    // Only the file of the en passant square matters
    en_passant: [u64; 8],
}

impl ZobristKeys {
    pub(crate) fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pieces = [[[0; 64]; 6]; 2];
        for key in pieces.iter_mut().flatten().flatten() {
            *key = rng.gen();
        }

        let black_to_move = rng.gen();

        // No rights hashes to zero so an empty position keys on placement alone.
        let mut castling = [0; 16];
        for key in castling.iter_mut().skip(1) {
            *key = rng.gen();
        }

        let mut en_passant = [0; 8];
        for key in &mut en_passant {
            *key = rng.gen();
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub(crate) fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.index()]
    }

    #[inline]
    pub(crate) fn side(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub(crate) fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.as_u8() as usize]
    }

    #[inline]
    pub(crate) fn en_passant(&self, file: u8) -> u64 {
        self.en_passant[file as usize & 7]
    }
}
