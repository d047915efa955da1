//! Incremental make/unmake.

use super::state::{Position, StateWord};
use super::types::{castle_rook_squares, Bitboard, Color, Move, Piece, Square};

impl Position {
    /// Apply a move produced by the move generator for this position.
    ///
    /// The null move is a contract violation: it is logged and ignored.
    pub fn make_move(&mut self, m: Move) {
        if m.is_null() {
            log::warn!("make_move called with the null move; ignored");
            return;
        }
        let us = self.side_to_move;
        let them = us.opponent();
        let from = m.from();
        let to = m.to();
        let Some((_, moving)) = self.squares[from.index()] else {
            log::warn!("make_move {m}: no piece on {from}; ignored");
            return;
        };
        let captured = self.captured_piece(m);
        let tables = self.tables;
        let z = &tables.zobrist;

        self.history.push(StateWord::pack(
            self.castling,
            captured,
            self.ep_file,
            self.halfmove_clock,
        ));
        self.key_history.push(self.hash);

        let mut hash = self.hash;
        if let Some(file) = self.ep_file {
            hash ^= z.en_passant(file);
        }
        hash ^= z.castling(self.castling);

        if moving == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        if let Some(victim) = captured {
            let victim_sq = if m.is_en_passant() {
                Square::from_coords(to.file(), from.rank())
            } else {
                to
            };
            self.remove_piece(victim_sq);
            hash ^= z.piece(them, victim, victim_sq);
        }

        if m.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.relocate_piece(rook_from, rook_to);
            hash ^= z.piece(us, Piece::Rook, rook_from) ^ z.piece(us, Piece::Rook, rook_to);
        }

        self.castling = self.castling.after_move(from, to);

        self.relocate_piece(from, to);
        hash ^= z.piece(us, moving, from) ^ z.piece(us, moving, to);

        if let Some(promo) = m.promotion_piece() {
            self.remove_piece(to);
            self.put_piece(to, us, promo);
            hash ^= z.piece(us, Piece::Pawn, to) ^ z.piece(us, promo, to);
        }

        // Only record an en passant file when an enemy pawn can use it.
        self.ep_file = None;
        if m.is_double_push() {
            let skipped = Square::from_coords(from.file(), (from.rank() + to.rank()) / 2);
            let capturers = tables.attacks.pawn(us, skipped) & self.pieces(them, Piece::Pawn);
            if capturers.any() {
                self.ep_file = Some(from.file());
            }
        }

        if let Some(file) = self.ep_file {
            hash ^= z.en_passant(file);
        }
        hash ^= z.castling(self.castling);
        hash ^= z.side();
        self.hash = hash;

        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = them;
        self.check_memo.set(None);
    }

    /// Take back `m`, which must be the last move made.
    pub fn unmake_move(&mut self, m: Move) {
        if m.is_null() {
            log::warn!("unmake_move called with the null move; ignored");
            return;
        }
        let (Some(state), Some(previous_hash)) = (self.history.pop(), self.key_history.pop()) else {
            log::warn!("unmake_move {m} with no move to take back; ignored");
            return;
        };

        let us = self.side_to_move.opponent();
        let them = self.side_to_move;
        let from = m.from();
        let to = m.to();

        if m.is_promotion() {
            self.remove_piece(to);
            self.put_piece(to, us, Piece::Pawn);
        }

        self.relocate_piece(to, from);

        if m.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.relocate_piece(rook_to, rook_from);
        }

        if let Some(victim) = state.captured() {
            let victim_sq = if m.is_en_passant() {
                Square::from_coords(to.file(), from.rank())
            } else {
                to
            };
            self.put_piece(victim_sq, them, victim);
        }

        self.castling = state.castling();
        self.ep_file = state.ep_file();
        self.halfmove_clock = state.halfmove_clock();
        self.hash = previous_hash;
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_sub(1);
        }
        self.side_to_move = us;
        self.check_memo.set(None);
    }

    /// Whether a pawn of the side to move could capture onto `sq`
    /// (used to normalise en passant squares read from FEN).
    pub(crate) fn ep_capture_possible(&self, sq: Square) -> bool {
        let us = self.side_to_move;
        let capturers: Bitboard =
            self.tables.attacks.pawn(us.opponent(), sq) & self.pieces(us, Piece::Pawn);
        capturers.any()
    }
}
