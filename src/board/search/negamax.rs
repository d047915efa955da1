//! Core search implementation.
//!
//! This module implements:
//! - Negamax alpha-beta with principal variation search (PVS)
//! - Transposition table cutoffs outside PV nodes
//! - Check extension
//! - Late move reductions (LMR)
//! - Draw and mate detection before move generation
//!
//! Iterative deepening lives in [`iterative`], quiescence in [`quiescence`].

mod iterative;
mod quiescence;

use std::sync::OnceLock;
use std::time::Instant;

use super::constants::{
    mated_in, INFINITY, LMR_TABLE_MAX_DEPTH, LMR_TABLE_MAX_IDX, STOP_CHECK_MASK,
};
use super::move_order::score_moves;
use super::pv::PvTable;
use super::SearchState;
use crate::board::state::Position;
use crate::board::types::{Move, MAX_PLY};
use crate::sync::StopFlag;
use crate::tt::BoundType;

/// Search context for a single search
pub(super) struct SearchContext<'a> {
    pos: &'a mut Position,
    state: &'a mut SearchState,
    stop: &'a StopFlag,
    start_time: Instant,
    time_limit_ms: u64,
    nodes: u64,
    /// Set once the stop flag or clock fired; every score computed after
    /// that is meaningless.
    aborted: bool,
    pv: PvTable,
    /// Previous iteration's best move, searched first at the root.
    root_best: Move,
}

/// Precomputed LMR table: `floor(0.5 + ln(depth) * ln(index) / 2.5)`.
#[allow(clippy::cast_precision_loss)]
fn lmr_table() -> &'static [[i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH] {
    static TABLE: OnceLock<[[i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t = [[0i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH];
        for (depth, row) in t.iter_mut().enumerate().skip(1) {
            for (idx, cell) in row.iter_mut().enumerate().skip(1) {
                let val = (0.5 + (depth as f64).ln() * (idx as f64).ln() / 2.5).floor();
                *cell = val.max(0.0) as i32;
            }
        }
        t
    })
}

impl<'a> SearchContext<'a> {
    pub(super) fn new(
        pos: &'a mut Position,
        state: &'a mut SearchState,
        stop: &'a StopFlag,
        time_limit_ms: u64,
    ) -> Self {
        SearchContext {
            pos,
            state,
            stop,
            start_time: Instant::now(),
            time_limit_ms,
            nodes: 0,
            aborted: false,
            pv: PvTable::new(),
            root_best: Move::NULL,
        }
    }

    /// Poll the stop flag on every call and the clock every 1024 nodes.
    /// Latches `aborted`.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.stop.is_stopped() {
            self.aborted = true;
        } else if self.time_limit_ms > 0
            && self.nodes & STOP_CHECK_MASK == 0
            && self.start_time.elapsed().as_millis() as u64 >= self.time_limit_ms
        {
            self.aborted = true;
        }
        self.aborted
    }

    /// Evaluate position from side-to-move's perspective
    #[inline]
    fn evaluate(&self) -> i32 {
        self.state.evaluator.evaluate(self.pos)
    }

    /// Draw and mate verdicts that need no search. Checked before move
    /// generation at every node below the root.
    fn terminal_score(&self, ply: usize) -> Option<i32> {
        if self.pos.is_fifty_move_draw() {
            // Mate on the hundredth ply still counts as mate.
            if self.pos.in_check() && !self.pos.has_legal_moves() {
                return Some(mated_in(ply));
            }
            return Some(0);
        }
        if self.pos.is_threefold_repetition() || self.pos.has_insufficient_material() {
            return Some(0);
        }
        None
    }

    /// Reduction for the `index`-th move (0-based) at `depth`.
    fn reduction(depth: i32, index: usize, is_pv: bool, gives_check: bool) -> i32 {
        let table = lmr_table();
        let d = (depth.max(0) as usize).min(LMR_TABLE_MAX_DEPTH - 1);
        let i = index.min(LMR_TABLE_MAX_IDX - 1);
        let mut r = table[d][i];
        if is_pv || gives_check {
            r -= 1;
        }
        r.clamp(0, depth - 1)
    }

    /// Alpha-beta search of the current position to `depth` plies.
    ///
    /// Returns 0 without storing anything once the search is aborted; the
    /// caller must discard the value.
    pub(super) fn alphabeta(&mut self, mut depth: i32, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.pv.clear_row(ply);
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        let is_root = ply == 0;
        let is_pv = beta - alpha > 1;

        if !is_root {
            if let Some(score) = self.terminal_score(ply) {
                return score;
            }
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate();
        }

        let in_check = self.pos.in_check();
        if in_check {
            depth += 1;
        }
        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }

        let key = self.pos.hash();
        let hash_move = if is_root {
            self.root_best
        } else {
            if !is_pv {
                if let Some(score) = self.state.tt.lookup(key, depth, ply, alpha, beta) {
                    return score;
                }
            }
            self.state.tt.probe(key).map_or(Move::NULL, |e| e.best_move)
        };

        let moves = self.pos.legal_moves();
        if moves.is_empty() {
            return if in_check { mated_in(ply) } else { 0 };
        }

        let us = self.pos.side_to_move();
        let killers = self.state.killers.get(ply);
        let mut scored = score_moves(self.pos, &moves, hash_move, killers, &self.state.history);

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = Move::NULL;
        let mut index = 0;

        while let Some(next) = scored.pick_best(index) {
            let m = next.mv;
            let quiet = !self.pos.is_tactical(m);

            self.pos.make_move(m);
            let gives_check = self.pos.in_check();
            let new_depth = depth - 1;

            let score = if index == 0 {
                -self.alphabeta(new_depth, -beta, -alpha, ply + 1)
            } else {
                let params = &self.state.params;
                let reduce = !is_root
                    && !in_check
                    && quiet
                    && depth >= params.lmr_min_depth
                    && index >= params.lmr_min_move;
                let r = if reduce {
                    Self::reduction(depth, index, is_pv, gives_check)
                } else {
                    0
                };

                let mut s = -self.alphabeta(new_depth - r, -alpha - 1, -alpha, ply + 1);
                if r > 0 && s > alpha {
                    s = -self.alphabeta(new_depth, -alpha - 1, -alpha, ply + 1);
                }
                if s > alpha && s < beta {
                    s = -self.alphabeta(new_depth, -beta, -alpha, ply + 1);
                }
                s
            };

            self.pos.unmake_move(m);
            index += 1;

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if score > alpha {
                    alpha = score;
                    self.pv.update(ply, m);
                    if score >= beta {
                        if quiet {
                            self.state.killers.update(ply, m);
                            self.state.history.update(us, m, depth);
                        }
                        break;
                    }
                }
            }
        }

        let bound = if best_score >= beta {
            BoundType::LowerBound
        } else if best_score > original_alpha {
            BoundType::Exact
        } else {
            BoundType::UpperBound
        };
        // A fail-low node has no trustworthy best move.
        let stored_move = if bound == BoundType::UpperBound {
            Move::NULL
        } else {
            best_move
        };
        self.state
            .tt
            .store(key, depth, ply, best_score, bound, stored_move);

        best_score
    }
}
