use super::SearchContext;
use crate::board::search::constants::{mated_in, INFINITY, MATE_SCORE};
use crate::board::search::{mate_in_moves, SearchInfoCallback, SearchIterationInfo, SearchResult};
use crate::board::types::Move;

impl SearchContext<'_> {
    /// Iterative deepening with aspiration windows.
    ///
    /// Only fully completed iterations update the result; an aborted
    /// iteration is thrown away.
    pub(in crate::board::search) fn iterative_deepening(
        &mut self,
        max_depth: u32,
        info_callback: Option<&SearchInfoCallback>,
    ) -> SearchResult {
        let root_moves = self.pos.legal_moves();
        let Some(fallback) = root_moves.first() else {
            let score = if self.pos.in_check() { mated_in(0) } else { 0 };
            return SearchResult {
                score,
                nodes: 1,
                ..SearchResult::default()
            };
        };

        let mut result = SearchResult {
            best_move: fallback,
            pv: vec![fallback],
            ..SearchResult::default()
        };
        self.root_best = Move::NULL;
        self.pv.reset();

        let mut score = 0;
        for depth in 1..=max_depth.max(1) {
            if self.should_stop() {
                break;
            }

            let iter_score = self.aspiration(depth, score);
            if self.aborted {
                break;
            }
            score = iter_score;

            let line = self.pv.line(0);
            if let Some(&best) = line.first() {
                result.best_move = best;
                result.pv = line.to_vec();
            }
            self.root_best = result.best_move;
            result.score = score;
            result.depth = depth;
            result.nodes = self.nodes;

            let time_ms = self.start_time.elapsed().as_millis() as u64;
            let info = SearchIterationInfo {
                depth,
                score,
                mate_in: mate_in_moves(score),
                nodes: self.nodes,
                nps: if time_ms > 0 {
                    self.nodes.saturating_mul(1000) / time_ms
                } else {
                    0
                },
                time_ms,
                pv: result.pv.clone(),
            };
            log::debug!("{info}");
            if let Some(cb) = info_callback {
                cb(&info);
            }

            // A mate inside the searched horizon cannot get shorter.
            if MATE_SCORE - score.abs() <= depth as i32 {
                break;
            }
        }

        result.nodes = self.nodes;
        result.stopped = self.aborted;
        result
    }

    /// One iteration. From `aspiration_min_depth` on, the window starts
    /// around the previous score and widens until the result lands inside.
    fn aspiration(&mut self, depth: u32, prev_score: i32) -> i32 {
        let depth = depth as i32;
        if depth < self.state.params.aspiration_min_depth as i32 {
            return self.alphabeta(depth, -INFINITY, INFINITY, 0);
        }

        let mut delta = self.state.params.aspiration_window.max(1);
        let mut alpha = (prev_score - delta).max(-INFINITY);
        let mut beta = (prev_score + delta).min(INFINITY);
        let mut fail_high_reduction = 0;

        loop {
            let search_depth = (depth - fail_high_reduction).max(1);
            let score = self.alphabeta(search_depth, alpha, beta, 0);
            if self.aborted {
                return score;
            }

            if score <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (score - delta).max(-INFINITY);
                fail_high_reduction = 0;
                log::debug!("depth {depth} failed low at {score}, window [{alpha}, {beta}]");
            } else if score >= beta {
                beta = (score + delta).min(INFINITY);
                fail_high_reduction += 1;
                log::debug!("depth {depth} failed high at {score}, window [{alpha}, {beta}]");
            } else if fail_high_reduction > 0 {
                // A reduced search only settles the window; the score must
                // come from the full depth.
                fail_high_reduction = 0;
                continue;
            } else {
                return score;
            }
            delta += delta / 2;
        }
    }
}
