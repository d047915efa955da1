//! King steps and castling.

use super::{CheckInfo, GenMode};
use crate::board::state::Position;
use crate::board::types::{Bitboard, Move, MoveList, Piece, Square};

impl Position {
    pub(super) fn generate_king_moves(
        &self,
        info: &CheckInfo,
        targets: Bitboard,
        mode: GenMode,
        moves: &mut MoveList,
    ) {
        let t = &self.tables().attacks;
        let king = info.king;

        for to in t.king(king) & targets & !info.enemy_attacks {
            moves.push(Move::normal(king, to));
        }

        if mode == GenMode::All && !info.in_check() {
            self.generate_castling(info, moves);
        }
    }

    fn generate_castling(&self, info: &CheckInfo, moves: &mut MoveList) {
        let us = self.side_to_move();
        let rights = self.castling_rights();
        let rank = us.back_rank();
        let home = Square::from_coords(4, rank);
        if info.king != home {
            return;
        }
        let occupied = self.occupied();
        let sq = |file: u8| Square::from_coords(file, rank);

        // (kingside, rook file, squares that must be empty, squares the king crosses)
        let sides: [(bool, u8, &[u8], [u8; 2]); 2] =
            [(true, 7, &[5, 6], [5, 6]), (false, 0, &[1, 2, 3], [3, 2])];

        for (kingside, rook_file, empty, path) in sides {
            if !rights.has(us, kingside) {
                continue;
            }
            if self.piece_at(sq(rook_file)) != Some((us, Piece::Rook)) {
                continue;
            }
            if empty.iter().any(|&f| occupied.contains(sq(f))) {
                continue;
            }
            if path.iter().any(|&f| info.enemy_attacks.contains(sq(f))) {
                continue;
            }
            moves.push(Move::castle(home, sq(path[1])));
        }
    }
}
