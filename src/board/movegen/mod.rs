//! Legal move generation.
//!
//! Moves are generated strictly legal: checks and pins are analysed once per
//! call (see [`legality`]) and every candidate destination is filtered
//! through the check mask and the piece's pin ray.

mod kings;
mod legality;
mod pawns;

pub(crate) use legality::CheckInfo;

use super::state::Position;
use super::types::{Bitboard, Move, MoveList, Piece};

/// Which moves to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMode {
    /// Every legal move.
    All,
    /// Captures (including en passant) and promotions.
    Captures,
}

impl Position {
    /// All legal moves for the side to move.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        self.generate_moves(GenMode::All)
    }

    /// Legal captures and promotions, for quiescence search.
    #[must_use]
    pub fn capture_moves(&self) -> MoveList {
        self.generate_moves(GenMode::Captures)
    }

    #[must_use]
    pub fn generate_moves(&self, mode: GenMode) -> MoveList {
        let mut moves = MoveList::new();
        let us = self.side_to_move();
        let Some(info) = self.check_info(us) else {
            return moves;
        };

        let targets = match mode {
            GenMode::All => !self.occupied_by(us),
            GenMode::Captures => self.occupied_by(us.opponent()),
        };

        self.generate_king_moves(&info, targets, mode, &mut moves);
        if info.double_check() {
            return moves;
        }

        self.generate_pawn_moves(&info, mode, &mut moves);
        self.generate_piece_moves(&info, targets & info.check_mask, &mut moves);
        moves
    }

    /// Whether the side to move has at least one legal move.
    #[must_use]
    pub fn has_legal_moves(&self) -> bool {
        !self.legal_moves().is_empty()
    }

    /// Whether `m` is legal here. Used to vet moves from outside sources
    /// such as the transposition table or an opening book.
    #[must_use]
    pub fn is_legal(&self, m: Move) -> bool {
        !m.is_null() && self.legal_moves().contains(m)
    }

    /// Knights and sliders.
    fn generate_piece_moves(&self, info: &CheckInfo, targets: Bitboard, moves: &mut MoveList) {
        let us = self.side_to_move();
        let t = &self.tables().attacks;
        let occupied = self.occupied();

        for &from in self.piece_list(us, Piece::Knight) {
            // A pinned knight can never stay on its pin ray.
            if info.pinned.contains(from) {
                continue;
            }
            push_moves(moves, from, t.knight(from) & targets);
        }
        for &from in self.piece_list(us, Piece::Bishop) {
            push_moves(moves, from, t.bishop(from, occupied) & targets & info.pin_mask(from));
        }
        for &from in self.piece_list(us, Piece::Rook) {
            push_moves(moves, from, t.rook(from, occupied) & targets & info.pin_mask(from));
        }
        for &from in self.piece_list(us, Piece::Queen) {
            push_moves(moves, from, t.queen(from, occupied) & targets & info.pin_mask(from));
        }
    }
}

#[inline]
fn push_moves(moves: &mut MoveList, from: super::types::Square, destinations: Bitboard) {
    for to in destinations {
        moves.push(Move::normal(from, to));
    }
}
