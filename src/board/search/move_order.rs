//! Move ordering.
//!
//! Every generated move gets a score; the search then repeatedly picks the
//! best remaining one. Buckets from high to low: hash move, queen
//! promotions, non-losing captures, killers, quiet moves by history, losing
//! captures, under-promotions.

use super::constants::{
    BAD_CAPTURE_SCORE, GOOD_CAPTURE_SCORE, HASH_MOVE_SCORE, KILLER1_SCORE, KILLER2_SCORE,
    QUEEN_PROMOTION_SCORE, UNDER_PROMOTION_SCORE,
};
use super::HistoryTable;
use crate::board::state::Position;
use crate::board::types::{Move, MoveList, Piece, ScoredMoveList};

/// Most valuable victim, least valuable attacker: `[victim][attacker]`.
const MVV_LVA: [[i32; 6]; 6] = {
    let mut table = [[0; 6]; 6];
    let mut victim = 0;
    while victim < 6 {
        let mut attacker = 0;
        while attacker < 6 {
            table[victim][attacker] = (victim as i32 + 1) * 10 - attacker as i32;
            attacker += 1;
        }
        victim += 1;
    }
    table
};

#[inline]
pub(crate) fn mvv_lva(victim: Piece, attacker: Piece) -> i32 {
    MVV_LVA[victim.index()][attacker.index()]
}

/// Score one move for ordering.
pub(crate) fn score_move(
    pos: &Position,
    m: Move,
    hash_move: Move,
    killers: [Move; 2],
    history: &HistoryTable,
) -> i32 {
    if m == hash_move {
        return HASH_MOVE_SCORE;
    }

    let attacker = pos.moved_piece(m).unwrap_or(Piece::Pawn);
    let victim = pos.captured_piece(m);
    let tiebreak = victim.map_or(0, |v| mvv_lva(v, attacker));

    if let Some(promo) = m.promotion_piece() {
        return if promo == Piece::Queen {
            QUEEN_PROMOTION_SCORE + tiebreak
        } else {
            UNDER_PROMOTION_SCORE + tiebreak
        };
    }

    if let Some(victim) = victim {
        let good = victim.value() >= attacker.value() || pos.see_ge(m, 0);
        return if good {
            GOOD_CAPTURE_SCORE + tiebreak
        } else {
            BAD_CAPTURE_SCORE + tiebreak
        };
    }

    if m == killers[0] {
        KILLER1_SCORE
    } else if m == killers[1] {
        KILLER2_SCORE
    } else {
        history.score(pos.side_to_move(), m)
    }
}

pub(crate) fn score_moves(
    pos: &Position,
    moves: &MoveList,
    hash_move: Move,
    killers: [Move; 2],
    history: &HistoryTable,
) -> ScoredMoveList {
    let mut scored = ScoredMoveList::new();
    for &m in moves {
        scored.push(m, score_move(pos, m, hash_move, killers, history));
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Color;

    fn ordered(pos: &Position, hash_move: Move, killers: [Move; 2], history: &HistoryTable) -> Vec<Move> {
        let moves = pos.legal_moves();
        let mut scored = score_moves(pos, &moves, hash_move, killers, history);
        let mut out = Vec::new();
        let mut i = 0;
        while let Some(s) = scored.pick_best(i) {
            out.push(s.mv);
            i += 1;
        }
        out
    }

    #[test]
    fn test_mvv_lva_prefers_big_victims_and_small_attackers() {
        assert!(mvv_lva(Piece::Queen, Piece::Pawn) > mvv_lva(Piece::Queen, Piece::Rook));
        assert!(mvv_lva(Piece::Queen, Piece::King) > mvv_lva(Piece::Rook, Piece::Pawn));
    }

    #[test]
    fn test_hash_move_first_then_captures_then_killers() {
        // White can take the queen on d5 with the pawn or the rook.
        let pos = Position::try_from_fen("4k3/8/8/3q4/4P3/8/8/3RK3 w - - 0 1").unwrap();
        let history = HistoryTable::new();
        let quiet = pos.parse_move("e1f2").unwrap();
        let killer = pos.parse_move("d1c1").unwrap();

        let order = ordered(&pos, quiet, [killer, Move::NULL], &history);
        assert_eq!(order[0], quiet);
        assert_eq!(order[1].to_string(), "e4d5");
        assert_eq!(order[2].to_string(), "d1d5");
        assert_eq!(order[3], killer);
    }

    #[test]
    fn test_losing_capture_after_quiets() {
        // Qxd5 loses the queen to the c6 pawn.
        let pos = Position::try_from_fen("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1").unwrap();
        let history = HistoryTable::new();
        let order = ordered(&pos, Move::NULL, [Move::NULL; 2], &history);
        assert_eq!(order.last().unwrap().to_string(), "d1d5");
    }

    #[test]
    fn test_under_promotions_last_queen_promotion_first() {
        let pos = Position::try_from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let history = HistoryTable::new();
        let order = ordered(&pos, Move::NULL, [Move::NULL; 2], &history);
        assert_eq!(order[0].to_string(), "a7a8q");
        let tail: Vec<String> = order[order.len() - 3..].iter().map(|m| m.to_string()).collect();
        for promo in ["a7a8r", "a7a8b", "a7a8n"] {
            assert!(tail.contains(&promo.to_string()));
        }
    }

    #[test]
    fn test_history_orders_quiet_moves() {
        let pos = Position::new();
        let mut history = HistoryTable::new();
        let m = pos.parse_move("b1c3").unwrap();
        history.update(Color::White, m, 4);
        let order = ordered(&pos, Move::NULL, [Move::NULL; 2], &history);
        assert_eq!(order[0], m);
    }
}
