//! Engine front end: owns the game position and one background search
//! thread, and exposes the load/move/search/cancel operations a protocol
//! layer drives.

mod config;
mod controller;
mod error;

pub use config::EngineConfig;
pub use controller::{CompletionCallback, Engine, EngineStatus};
pub use error::EngineError;
