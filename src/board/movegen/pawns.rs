//! Pawn move generation: pushes, captures, promotions and en passant.

use super::{CheckInfo, GenMode};
use crate::board::state::Position;
use crate::board::types::{Bitboard, Move, MoveList, Piece, Square, PROMOTION_PIECES};

impl Position {
    pub(super) fn generate_pawn_moves(&self, info: &CheckInfo, mode: GenMode, moves: &mut MoveList) {
        let us = self.side_to_move();
        let t = &self.tables().attacks;
        let occupied = self.occupied();
        let enemies = self.occupied_by(us.opponent());
        let forward = us.pawn_direction();
        let promotion_rank = us.pawn_promotion_rank();

        for &from in self.piece_list(us, Piece::Pawn) {
            let allowed = info.check_mask & info.pin_mask(from);

            if let Some(one) = from.offset(0, forward) {
                if !occupied.contains(one) {
                    if one.rank() == promotion_rank {
                        if allowed.contains(one) {
                            push_promotions(moves, from, one);
                        }
                    } else if mode == GenMode::All {
                        if allowed.contains(one) {
                            moves.push(Move::normal(from, one));
                        }
                        if from.rank() == us.pawn_start_rank() {
                            if let Some(two) = one.offset(0, forward) {
                                if !occupied.contains(two) && allowed.contains(two) {
                                    moves.push(Move::double_push(from, two));
                                }
                            }
                        }
                    }
                }
            }

            for to in t.pawn(us, from) & enemies & allowed {
                if to.rank() == promotion_rank {
                    push_promotions(moves, from, to);
                } else {
                    moves.push(Move::normal(from, to));
                }
            }

            if let Some(ep) = self.ep_square() {
                if t.pawn(us, from).contains(ep) && self.en_passant_is_legal(info, from, ep) {
                    moves.push(Move::en_passant(from, ep));
                }
            }
        }
    }

    /// En passant removes two pawns from the board at once, which the usual
    /// pin analysis does not cover. Rebuild the occupancy after the capture
    /// and look for slider attacks on the king directly.
    fn en_passant_is_legal(&self, info: &CheckInfo, from: Square, ep: Square) -> bool {
        let us = self.side_to_move();
        let them = us.opponent();
        let captured = Square::from_coords(ep.file(), from.rank());

        // In check: the capture must remove the checker or block the line.
        if !info.check_mask.contains(ep) && !info.check_mask.contains(captured) {
            return false;
        }
        if !info.pin_mask(from).contains(ep) {
            return false;
        }

        let t = &self.tables().attacks;
        let occupied = (self.occupied() & !Bitboard::from(from) & !Bitboard::from(captured))
            | Bitboard::from(ep);
        let queens = self.pieces(them, Piece::Queen);
        let orthogonal = self.pieces(them, Piece::Rook) | queens;
        let diagonal = self.pieces(them, Piece::Bishop) | queens;

        (t.rook(info.king, occupied) & orthogonal).is_empty()
            && (t.bishop(info.king, occupied) & diagonal).is_empty()
    }
}

#[inline]
fn push_promotions(moves: &mut MoveList, from: Square, to: Square) {
    for piece in PROMOTION_PIECES {
        moves.push(Move::promotion(from, to, piece));
    }
}

#[cfg(test)]
mod tests {
    use crate::board::state::Position;

    fn moves_of(fen: &str) -> Vec<String> {
        Position::try_from_fen(fen)
            .unwrap()
            .legal_moves()
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[test]
    fn test_en_passant_horizontal_discovered_check() {
        // bxc6 would clear the fifth rank between the king on a5 and the rook on h5.
        let moves = moves_of("8/8/8/KPp4r/8/8/8/7k w - c6 0 1");
        assert!(!moves.contains(&"b5c6".to_string()));
        assert!(moves.contains(&"b5b6".to_string()));
    }

    #[test]
    fn test_en_passant_captures_checking_pawn() {
        // The d5 pawn just gave check by moving d7-d5; exd6 removes the checker.
        let moves = moves_of("8/8/8/3pP3/4K3/8/8/7k w - d6 0 1");
        assert!(moves.contains(&"e5d6".to_string()));
    }

    #[test]
    fn test_promotions_expand_to_four_pieces() {
        let moves = moves_of("1n5k/P7/8/8/8/8/8/K7 w - - 0 1");
        for text in ["a7a8q", "a7a8r", "a7a8b", "a7a8n", "a7b8q", "a7b8n"] {
            assert!(moves.contains(&text.to_string()), "missing {text}");
        }
    }

    #[test]
    fn test_blocked_pawn_has_no_push() {
        let moves = moves_of("7k/8/8/8/8/4p3/4P3/K7 w - - 0 1");
        assert!(!moves.iter().any(|m| m.starts_with("e2")));
    }

    #[test]
    fn test_double_push_needs_both_squares_empty() {
        let moves = moves_of("7k/8/8/8/4p3/8/4P3/K7 w - - 0 1");
        assert!(moves.contains(&"e2e3".to_string()));
        assert!(!moves.contains(&"e2e4".to_string()));
    }
}
