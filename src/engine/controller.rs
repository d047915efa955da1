//! Engine controller implementation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::{EngineConfig, EngineError};
use crate::board::search::{search, SearchConfig, SearchInfoCallback, SearchResult, SearchState};
use crate::board::{GameStatus, Move, Position};
use crate::book::{NoBook, OpeningBook};
use crate::evaluation::{Evaluator, MaterialEvaluator};
use crate::sync::StopFlag;
use crate::timer::DeadlineTimer;

/// Search thread stack size (32 MB)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Called once on the search thread with the finished search's result.
pub type CompletionCallback = Box<dyn FnOnce(SearchResult) + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Searching,
}

/// State shared between the caller side and the search thread.
struct Shared {
    status: Mutex<EngineStatus>,
    idle: Condvar,
    last_result: Mutex<Option<SearchResult>>,
}

impl Shared {
    fn finish(&self) {
        *self.status.lock() = EngineStatus::Idle;
        self.idle.notify_all();
    }
}

/// Returns the engine to Idle even if the completion callback panics.
struct IdleOnDrop<'a>(&'a Shared);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

struct SearchRequest {
    position: Position,
    config: SearchConfig,
    time_limit: Option<Duration>,
    stop: StopFlag,
    on_complete: CompletionCallback,
}

fn run_search_thread(
    requests: Receiver<SearchRequest>,
    search_state: Arc<Mutex<SearchState>>,
    shared: Arc<Shared>,
) {
    while let Ok(request) = requests.recv() {
        let SearchRequest {
            mut position,
            mut config,
            time_limit,
            stop,
            on_complete,
        } = request;
        let _idle = IdleOnDrop(&shared);

        let timer = match time_limit {
            Some(limit) => match DeadlineTimer::start(limit, stop.clone()) {
                Ok(timer) => Some(timer),
                Err(err) => {
                    log::warn!("deadline timer unavailable ({err}), polling the clock instead");
                    config.time_limit_ms = (limit.as_millis() as u64).max(1);
                    None
                }
            },
            None => None,
        };

        let result = {
            let mut state = search_state.lock();
            search(&mut position, &mut state, config, &stop)
        };
        drop(timer);

        *shared.last_result.lock() = Some(result.clone());
        // A panicking callback must not take the search thread down with it.
        if panic::catch_unwind(AssertUnwindSafe(|| on_complete(result))).is_err() {
            log::error!("search completion callback panicked");
        }
    }
    log::debug!("search thread exiting");
}

/// Engine front end.
///
/// Owns the game position and a long-lived search thread. A search works on
/// a copy of the position taken when it starts; while it runs, requests that
/// would change the position or start another search are rejected with
/// [`EngineError::SearchInProgress`].
pub struct Engine {
    position: Position,
    search_state: Arc<Mutex<SearchState>>,
    shared: Arc<Shared>,
    requests: Option<Sender<SearchRequest>>,
    worker: Option<JoinHandle<()>>,
    /// Stop flag of the most recent search.
    stop: StopFlag,
    info_callback: Option<SearchInfoCallback>,
}

impl Engine {
    /// Engine with the material evaluator and no opening book.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_components(config, Box::new(MaterialEvaluator), Box::new(NoBook))
    }

    pub fn with_components(
        config: EngineConfig,
        evaluator: Box<dyn Evaluator>,
        book: Box<dyn OpeningBook>,
    ) -> Result<Self, EngineError> {
        let search_state = Arc::new(Mutex::new(SearchState::with_components(
            config.tt_mb,
            config.params,
            evaluator,
            book,
        )));
        let shared = Arc::new(Shared {
            status: Mutex::new(EngineStatus::Idle),
            idle: Condvar::new(),
            last_result: Mutex::new(None),
        });

        let (tx, rx) = mpsc::channel();
        let worker_state = Arc::clone(&search_state);
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || run_search_thread(rx, worker_state, worker_shared))?;

        Ok(Engine {
            position: Position::new(),
            search_state,
            shared,
            requests: Some(tx),
            worker: Some(worker),
            stop: StopFlag::new(),
            info_callback: None,
        })
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        *self.shared.status.lock()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.status() == EngineStatus::Searching
    }

    #[must_use]
    pub fn game_status(&self) -> GameStatus {
        self.position.game_status()
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        if self.is_searching() {
            log::warn!("request rejected: search in progress");
            return Err(EngineError::SearchInProgress);
        }
        Ok(())
    }

    /// Replace the game position. On a malformed record the old position is
    /// kept.
    pub fn load_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.position = Position::try_from_fen(fen)?;
        Ok(())
    }

    /// Apply a move in coordinate notation ("e2e4", "e7e8q"). A move that
    /// matches no legal move leaves the position unchanged.
    pub fn make_user_move(&mut self, text: &str) -> Result<Move, EngineError> {
        self.ensure_idle()?;
        Ok(self.position.make_move_text(text)?)
    }

    /// Progress callback attached to every subsequent search.
    pub fn set_info_callback(&mut self, callback: Option<SearchInfoCallback>) {
        self.info_callback = callback;
    }

    /// Search the current position up to `max_depth` plies in the
    /// background. `on_complete` runs on the search thread.
    pub fn start_search<F>(&mut self, max_depth: u32, on_complete: F) -> Result<(), EngineError>
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.submit(max_depth, None, Box::new(on_complete))
    }

    /// Like [`Engine::start_search`], cancelled after `millis`
    /// milliseconds. A zero budget cancels at once and reports the fallback
    /// move.
    pub fn start_timed_search<F>(
        &mut self,
        max_depth: u32,
        millis: u64,
        on_complete: F,
    ) -> Result<(), EngineError>
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.submit(
            max_depth,
            Some(Duration::from_millis(millis)),
            Box::new(on_complete),
        )
    }

    fn submit(
        &mut self,
        max_depth: u32,
        time_limit: Option<Duration>,
        on_complete: CompletionCallback,
    ) -> Result<(), EngineError> {
        let mut status = self.shared.status.lock();
        if *status == EngineStatus::Searching {
            log::warn!("search request rejected: search in progress");
            return Err(EngineError::SearchInProgress);
        }
        let Some(requests) = &self.requests else {
            return Err(EngineError::WorkerUnavailable);
        };

        let stop = StopFlag::new();
        let mut config = SearchConfig::depth(max_depth);
        if let Some(cb) = &self.info_callback {
            config = config.with_info_callback(Arc::clone(cb));
        }
        let request = SearchRequest {
            position: self.position.clone(),
            config,
            time_limit,
            stop: stop.clone(),
            on_complete,
        };
        requests
            .send(request)
            .map_err(|_| EngineError::WorkerUnavailable)?;

        *status = EngineStatus::Searching;
        self.stop = stop;
        Ok(())
    }

    /// Ask the running search to stop. Returns immediately; the completion
    /// callback still runs with the last completed iteration's result.
    pub fn cancel_search(&self) {
        if self.is_searching() {
            self.stop.stop();
        }
    }

    /// Stop the running search and block until its completion callback has
    /// returned. Must not be called from inside that callback.
    pub fn cancel_and_wait(&self) {
        let mut status = self.shared.status.lock();
        if *status == EngineStatus::Searching {
            self.stop.stop();
        }
        while *status == EngineStatus::Searching {
            self.shared.idle.wait(&mut status);
        }
    }

    /// Block until the running search, if any, has finished on its own.
    pub fn wait(&self) {
        let mut status = self.shared.status.lock();
        while *status == EngineStatus::Searching {
            self.shared.idle.wait(&mut status);
        }
    }

    /// Best move of the last finished search, `Move::NULL` if there is none.
    #[must_use]
    pub fn best_move(&self) -> Move {
        self.shared
            .last_result
            .lock()
            .as_ref()
            .map_or(Move::NULL, |r| r.best_move)
    }

    #[must_use]
    pub fn last_result(&self) -> Option<SearchResult> {
        self.shared.last_result.lock().clone()
    }

    /// Back to the starting position with an empty transposition table.
    pub fn new_game(&mut self) {
        self.cancel_and_wait();
        self.position = Position::new();
        self.search_state.lock().clear();
        *self.shared.last_result.lock() = None;
    }

    /// Run `f` with the search state (transposition table, parameters).
    /// Blocks while a search is running.
    pub fn with_search_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SearchState) -> R,
    {
        f(&mut self.search_state.lock())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.cancel_and_wait();
        // Closing the channel ends the search thread's loop.
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
