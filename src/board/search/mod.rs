//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening with aspiration windows
//! - Negamax alpha-beta with PVS and late move reductions
//! - Check extension
//! - Quiescence search with stand-pat and SEE pruning
//! - Move ordering (hash move, SEE/MVV-LVA, killers, history)
//! - Transposition table for move ordering and cutoffs
//! - Cooperative cancellation through a [`StopFlag`]

mod constants;
mod move_order;
mod negamax;
mod params;
mod pv;

use std::fmt;
use std::sync::Arc;

use crate::book::{NoBook, OpeningBook};
use crate::evaluation::{Evaluator, MaterialEvaluator};
use crate::sync::StopFlag;
use crate::tt::TranspositionTable;

use super::state::Position;
use super::types::{Color, Move, MAX_PLY};

pub use constants::{mate_in_moves, mated_in, INFINITY, MATE_SCORE, MATE_THRESHOLD};
pub use params::SearchParams;

pub(crate) use constants::HISTORY_MAX;

/// Default transposition table size in MB
pub const DEFAULT_TT_MB: usize = 16;

/// Two quiet moves per ply that recently caused a beta cutoff.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NULL; 2])
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY];
    }
}

/// Quiet-move cutoff counts by `[side][from][to]`.
pub struct HistoryTable {
    entries: Box<[[[i32; 64]; 64]; 2]>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable {
            entries: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[must_use]
    pub fn score(&self, side: Color, mv: Move) -> i32 {
        self.entries[side.index()][mv.from().index()][mv.to().index()]
    }

    /// Reward a quiet move that caused a beta cutoff with `depth²`.
    pub fn update(&mut self, side: Color, mv: Move, depth: i32) {
        let entry = &mut self.entries[side.index()][mv.from().index()][mv.to().index()];
        *entry = entry.saturating_add(depth * depth);
        if *entry > HISTORY_MAX {
            self.age();
        }
    }

    /// Halve every entry.
    pub fn age(&mut self) {
        for side in self.entries.iter_mut() {
            for row in side.iter_mut() {
                for entry in row.iter_mut() {
                    *entry /= 2;
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.entries = Box::new([[[0; 64]; 64]; 2]);
    }
}

/// Search state persisted across searches: the transposition table, the
/// ordering heuristics and the pluggable evaluation and book.
pub struct SearchState {
    pub(crate) tt: TranspositionTable,
    pub(crate) killers: KillerTable,
    pub(crate) history: HistoryTable,
    pub(crate) params: SearchParams,
    pub(crate) evaluator: Box<dyn Evaluator>,
    pub(crate) book: Box<dyn OpeningBook>,
}

impl SearchState {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        SearchState::with_components(
            tt_mb,
            SearchParams::default(),
            Box::new(MaterialEvaluator),
            Box::new(NoBook),
        )
    }

    #[must_use]
    pub fn with_components(
        tt_mb: usize,
        params: SearchParams,
        evaluator: Box<dyn Evaluator>,
        book: Box<dyn OpeningBook>,
    ) -> Self {
        SearchState {
            tt: TranspositionTable::new(tt_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            params,
            evaluator,
            book,
        }
    }

    /// Reset the per-search heuristics. The transposition table is kept.
    pub fn new_search(&mut self) {
        self.killers.reset();
        self.history.reset();
    }

    /// Forget everything learned, including the transposition table.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.new_search();
    }

    #[must_use]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    #[must_use]
    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new(DEFAULT_TT_MB)
    }
}

/// Configuration for a search operation.
#[derive(Clone)]
pub struct SearchConfig {
    pub max_depth: u32,
    /// Time limit in milliseconds (0 = unlimited)
    pub time_limit_ms: u64,
    /// Optional callback for iteration info
    pub info_callback: Option<SearchInfoCallback>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: 64,
            time_limit_ms: 0,
            info_callback: None,
        }
    }
}

impl SearchConfig {
    /// Create a depth-limited search config
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchConfig {
            max_depth,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    /// Attach a callback for iteration info reporting.
    #[must_use]
    pub fn with_info_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.info_callback = Some(callback);
        self
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `Move::NULL` only when the position has no legal moves.
    pub best_move: Move,
    /// Score of the last completed iteration, side-to-move perspective.
    pub score: i32,
    /// Depth of the last completed iteration (0 if none completed).
    pub depth: u32,
    pub pv: Vec<Move>,
    pub nodes: u64,
    pub from_book: bool,
    /// The search was cut short by the stop flag or the clock.
    pub stopped: bool,
}

impl Default for SearchResult {
    fn default() -> Self {
        SearchResult {
            best_move: Move::NULL,
            score: 0,
            depth: 0,
            pv: Vec::new(),
            nodes: 0,
            from_book: false,
            stopped: false,
        }
    }
}

/// Information about a completed search iteration.
#[derive(Debug, Clone)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub score: i32,
    pub mate_in: Option<i32>,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub pv: Vec<Move>,
}

impl fmt::Display for SearchIterationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {} score ", self.depth)?;
        match self.mate_in {
            Some(moves) => write!(f, "mate {moves}")?,
            None => write!(f, "cp {}", self.score)?,
        }
        write!(
            f,
            " nodes {} nps {} time {} pv",
            self.nodes, self.nps, self.time_ms
        )?;
        for m in &self.pv {
            write!(f, " {m}")?;
        }
        Ok(())
    }
}

/// Callback type for iteration info.
pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Search `pos` and return the best move found.
///
/// The opening book is consulted first. Otherwise the search deepens until
/// `config.max_depth`, the time limit, the stop flag, or a forced mate
/// within the searched depth ends it. `pos` is restored before returning.
#[allow(clippy::needless_pass_by_value)]
pub fn search(
    pos: &mut Position,
    state: &mut SearchState,
    config: SearchConfig,
    stop: &StopFlag,
) -> SearchResult {
    if let Some(m) = state.book.try_book_move(pos) {
        if pos.is_legal(m) {
            log::info!("book move {m}");
            return SearchResult {
                best_move: m,
                pv: vec![m],
                from_book: true,
                ..SearchResult::default()
            };
        }
        log::warn!("book suggested illegal move {m}; searching instead");
    }

    state.new_search();
    log::info!(
        "search start: depth {} time {} ms",
        config.max_depth,
        config.time_limit_ms
    );

    let mut ctx = negamax::SearchContext::new(pos, state, stop, config.time_limit_ms);
    let result = ctx.iterative_deepening(config.max_depth, config.info_callback.as_ref());

    log::info!(
        "search done: best {} score {} depth {} nodes {}{}",
        result.best_move,
        result.score,
        result.depth,
        result.nodes,
        if result.stopped { " (stopped)" } else { "" }
    );
    result
}

/// Fixed-depth search; `None` when there is no legal move.
pub fn find_best_move(
    pos: &mut Position,
    state: &mut SearchState,
    max_depth: u32,
    stop: &StopFlag,
) -> Option<Move> {
    let result = search(pos, state, SearchConfig::depth(max_depth), stop);
    (!result.best_move.is_null()).then_some(result.best_move)
}
