use super::SearchContext;
use crate::board::search::move_order::mvv_lva;
use crate::board::types::{Piece, ScoredMoveList, MAX_PLY};

impl SearchContext<'_> {
    /// Captures and promotions only, from a stand-pat baseline.
    pub(super) fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.pv.clear_row(ply);
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        let stand_pat = self.evaluate();
        if ply >= MAX_PLY - 1 || stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let captures = self.pos.capture_moves();
        let mut scored = ScoredMoveList::new();
        for &m in &captures {
            let attacker = self.pos.moved_piece(m).unwrap_or(Piece::Pawn);
            let mut score = self
                .pos
                .captured_piece(m)
                .map_or(0, |victim| mvv_lva(victim, attacker));
            if m.promotion_piece() == Some(Piece::Queen) {
                score += 100;
            }
            scored.push(m, score);
        }

        let see_pruning = self.state.params.qsearch_see_pruning;
        let mut best_score = stand_pat;
        let mut index = 0;
        while let Some(next) = scored.pick_best(index) {
            index += 1;
            let m = next.mv;
            if see_pruning && !m.is_promotion() && !self.pos.see_ge(m, 0) {
                continue;
            }

            self.pos.make_move(m);
            let score = -self.quiescence(-beta, -alpha, ply + 1);
            self.pos.unmake_move(m);

            if self.aborted {
                return 0;
            }
            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    self.pv.update(ply, m);
                    if score >= beta {
                        break;
                    }
                }
            }
        }

        best_score
    }
}
