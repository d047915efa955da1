//! Cancellation token shared between the caller, the search thread and
//! deadline timers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag.
///
/// Clones share one flag. Raising it never touches search data; the search
/// polls it at every node and unwinds on its own, so a raised flag only
/// means "finish soon", never "state is gone".
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    raised: Arc<AtomicBool>,
}

impl StopFlag {
    /// A lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag raised from the start; a search given it returns its fallback
    /// move without completing an iteration.
    #[must_use]
    pub fn stopped() -> Self {
        let flag = Self::new();
        flag.stop();
        flag
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Raise the flag. Idempotent.
    #[inline]
    pub fn stop(&self) {
        self.raised.store(true, Ordering::Release);
    }

    #[inline]
    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }
}
