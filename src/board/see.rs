//! Static Exchange Evaluation (SEE).
//!
//! Decides whether the capture sequence started by a move on its destination
//! square nets at least a given amount of material, without making any moves.

use super::state::Position;
use super::types::{Bitboard, Move, Piece, Square};

/// Least valuable first.
const EXCHANGE_ORDER: [Piece; 6] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
    Piece::King,
];

impl Position {
    /// Whether the exchange started by `m` wins at least `threshold`
    /// centipawns for the side to move.
    ///
    /// Both sides are assumed to recapture with their least valuable
    /// attacker and may stop whenever continuing would lose material.
    /// Pins are ignored.
    #[must_use]
    pub fn see_ge(&self, m: Move, threshold: i32) -> bool {
        if m.is_castle() {
            return 0 >= threshold;
        }
        let from = m.from();
        let to = m.to();
        let Some(moving) = self.moved_piece(m) else {
            return false;
        };

        let mut gain = self.captured_piece(m).map_or(0, Piece::value);
        let at_risk = match m.promotion_piece() {
            Some(promo) => {
                gain += promo.value() - Piece::Pawn.value();
                promo.value()
            }
            None => moving.value(),
        };

        // `swap` is what the side to move must still win for the exchange
        // to reach the threshold, seen from whoever moves next.
        let mut swap = gain - threshold;
        if swap < 0 {
            return false;
        }
        swap = at_risk - swap;
        if swap <= 0 {
            return true;
        }

        let t = &self.tables().attacks;
        let mut occupied = self.occupied() ^ Bitboard::from(from) ^ Bitboard::from(to);
        if m.is_en_passant() {
            occupied ^= Bitboard::from(Square::from_coords(to.file(), from.rank()));
        }

        let diagonal = self.pieces_of_type(Piece::Bishop) | self.pieces_of_type(Piece::Queen);
        let orthogonal = self.pieces_of_type(Piece::Rook) | self.pieces_of_type(Piece::Queen);

        let mut stm = self.side_to_move();
        let mut attackers = self.attackers_to(to, occupied);
        let mut res = true;

        loop {
            stm = stm.opponent();
            attackers &= occupied;

            let ours = attackers & self.occupied_by(stm);
            if ours.is_empty() {
                break;
            }
            res = !res;

            let Some((piece, sq)) = EXCHANGE_ORDER.iter().find_map(|&p| {
                (ours & self.pieces(stm, p)).lsb().map(|sq| (p, sq))
            }) else {
                break;
            };

            if piece == Piece::King {
                // The king may only take last.
                return if (attackers & !self.occupied_by(stm)).any() {
                    !res
                } else {
                    res
                };
            }

            swap = piece.value() - swap;
            if swap < i32::from(res) {
                break;
            }

            occupied ^= Bitboard::from(sq);
            if matches!(piece, Piece::Pawn | Piece::Bishop | Piece::Queen) {
                attackers |= t.bishop(to, occupied) & diagonal;
            }
            if matches!(piece, Piece::Rook | Piece::Queen) {
                attackers |= t.rook(to, occupied) & orthogonal;
            }
        }

        res
    }
}
