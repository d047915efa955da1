//! Deadline timer for timed searches.
//!
//! The timer thread sets a [`StopFlag`] once the duration elapses. Dropping
//! the timer first disarms it: the thread wakes up and exits without
//! touching the flag.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::sync::StopFlag;

/// A timer that signals a stop flag when a deadline is reached.
pub struct DeadlineTimer {
    disarm: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    stop_flag: StopFlag,
}

impl DeadlineTimer {
    /// Start a timer that will set `stop_flag` after `duration`.
    ///
    /// A zero duration sets the flag immediately and spawns nothing.
    pub fn start(duration: Duration, stop_flag: StopFlag) -> io::Result<Self> {
        if duration.is_zero() {
            stop_flag.stop();
            return Ok(DeadlineTimer {
                disarm: None,
                handle: None,
                stop_flag,
            });
        }

        let (tx, rx) = mpsc::channel::<()>();
        let flag = stop_flag.clone();
        let handle = thread::Builder::new()
            .name("deadline".to_string())
            .spawn(move || {
                // Either an explicit disarm or the sender being dropped ends
                // the wait early.
                if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(duration) {
                    log::debug!("deadline of {} ms reached", duration.as_millis());
                    flag.stop();
                }
            })?;

        Ok(DeadlineTimer {
            disarm: Some(tx),
            handle: Some(handle),
            stop_flag,
        })
    }

    /// Disarm the timer and wait for its thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    /// Whether the flag this timer guards has been set.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.stop_flag.is_stopped()
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.disarm.take() {
            // The thread may already have exited after firing.
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
