//! Check and pin analysis for legal move generation.

use crate::board::attack_tables::Direction;
use crate::board::state::Position;
use crate::board::types::{Bitboard, Color, Piece, Square};

/// Everything the generator needs to filter moves for legality.
pub(crate) struct CheckInfo {
    pub(crate) king: Square,
    /// Pieces giving check.
    pub(crate) checkers: Bitboard,
    /// Squares a non-king move must land on: the checker plus the squares
    /// between it and the king. All squares when not in check.
    pub(crate) check_mask: Bitboard,
    pub(crate) pinned: Bitboard,
    /// For each pinned piece, the line it may still move along (pinner included).
    pin_rays: [Bitboard; 64],
    /// Squares the enemy attacks with our king lifted off the board.
    pub(crate) enemy_attacks: Bitboard,
}

impl CheckInfo {
    #[inline]
    pub(crate) fn in_check(&self) -> bool {
        self.checkers.any()
    }

    #[inline]
    pub(crate) fn double_check(&self) -> bool {
        self.checkers.more_than_one()
    }

    /// Squares a piece on `from` may move to given its pin status.
    #[inline]
    pub(crate) fn pin_mask(&self, from: Square) -> Bitboard {
        if self.pinned.contains(from) {
            self.pin_rays[from.index()]
        } else {
            Bitboard::ALL
        }
    }
}

impl Position {
    /// Analyse checks and pins against the king of `us`. `None` when that
    /// side has no king.
    pub(crate) fn check_info(&self, us: Color) -> Option<CheckInfo> {
        let king = self.king_square(us)?;
        let them = us.opponent();
        let t = &self.tables().attacks;
        let occupied = self.occupied();
        let own = self.occupied_by(us);

        let queens = self.pieces(them, Piece::Queen);
        let diagonal = self.pieces(them, Piece::Bishop) | queens;
        let orthogonal = self.pieces(them, Piece::Rook) | queens;

        let mut checkers = Bitboard::EMPTY;
        let mut check_mask = Bitboard::EMPTY;
        let mut pinned = Bitboard::EMPTY;
        let mut pin_rays = [Bitboard::EMPTY; 64];

        for dir in Direction::ALL {
            let ray = t.ray(dir, king);
            let blockers = ray & occupied;
            let Some(first) = dir.nearest(blockers) else {
                continue;
            };
            let sliders = if dir.is_diagonal() { diagonal } else { orthogonal };

            if sliders.contains(first) {
                checkers |= Bitboard::from(first);
                check_mask |= t.between(king, first) | Bitboard::from(first);
                continue;
            }
            if !own.contains(first) {
                continue;
            }
            let Some(second) = dir.nearest(blockers & !Bitboard::from(first)) else {
                continue;
            };
            if sliders.contains(second) {
                pinned |= Bitboard::from(first);
                pin_rays[first.index()] = t.between(king, second) | Bitboard::from(second);
            }
        }

        let leapers = (t.knight(king) & self.pieces(them, Piece::Knight))
            | (t.pawn(us, king) & self.pieces(them, Piece::Pawn));
        checkers |= leapers;
        check_mask |= leapers;

        if checkers.is_empty() {
            check_mask = Bitboard::ALL;
        }

        let enemy_attacks = self.attack_map(them, occupied & !Bitboard::from(king));

        Some(CheckInfo {
            king,
            checkers,
            check_mask,
            pinned,
            pin_rays,
            enemy_attacks,
        })
    }

    /// Union of every square attacked by `color` with the given occupancy.
    pub(crate) fn attack_map(&self, color: Color, occupied: Bitboard) -> Bitboard {
        let t = &self.tables().attacks;
        let pawns = self.pieces(color, Piece::Pawn);
        let mut attacks = match color {
            Color::White => pawns.shift_north().shift_east() | pawns.shift_north().shift_west(),
            Color::Black => pawns.shift_south().shift_east() | pawns.shift_south().shift_west(),
        };
        for &sq in self.piece_list(color, Piece::Knight) {
            attacks |= t.knight(sq);
        }
        for &sq in self.piece_list(color, Piece::Bishop) {
            attacks |= t.bishop(sq, occupied);
        }
        for &sq in self.piece_list(color, Piece::Rook) {
            attacks |= t.rook(sq, occupied);
        }
        for &sq in self.piece_list(color, Piece::Queen) {
            attacks |= t.queen(sq, occupied);
        }
        for &sq in self.piece_list(color, Piece::King) {
            attacks |= t.king(sq);
        }
        attacks
    }
}
