//! Errors returned by the engine front end.

use std::fmt;
use std::io;

use crate::board::{FenError, MoveParseError};

#[derive(Debug)]
pub enum EngineError {
    /// A search is running; the request was rejected, not queued.
    SearchInProgress,
    /// The search thread could not be spawned or has gone away.
    WorkerUnavailable,
    /// Spawning a helper thread failed.
    Spawn(io::Error),
    Fen(FenError),
    Move(MoveParseError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::SearchInProgress => write!(f, "A search is already in progress"),
            EngineError::WorkerUnavailable => write!(f, "Search thread is not running"),
            EngineError::Spawn(err) => write!(f, "Failed to spawn search thread: {err}"),
            EngineError::Fen(err) => write!(f, "{err}"),
            EngineError::Move(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Spawn(err) => Some(err),
            EngineError::Fen(err) => Some(err),
            EngineError::Move(err) => Some(err),
            EngineError::SearchInProgress | EngineError::WorkerUnavailable => None,
        }
    }
}

impl From<FenError> for EngineError {
    fn from(err: FenError) -> Self {
        EngineError::Fen(err)
    }
}

impl From<MoveParseError> for EngineError {
    fn from(err: MoveParseError) -> Self {
        EngineError::Move(err)
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::Spawn(err)
    }
}
