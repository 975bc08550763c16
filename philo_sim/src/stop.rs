//! The one-way cancellation flag.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global stop signal observed by every thread of a run.
///
/// Transitions false → true exactly once and never back. The boolean is
/// only reachable through [`is_set`](Self::is_set) and [`set`](Self::set).
#[derive(Debug, Default)]
pub struct StopFlag {
    stopped: Mutex<bool>,
}

impl StopFlag {
    /// Creates a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the run has been stopped.
    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Stops the run. Returns `true` only for the call that flipped the flag.
    pub fn set(&self) -> bool {
        let mut stopped = self.lock();
        let first = !*stopped;
        *stopped = true;
        first
    }

    /// Holds the flag's lock; writers of the event stream keep it for the
    /// duration of one line so no line can slip in after the stop.
    pub(crate) fn lock(&self) -> MutexGuard<'_, bool> {
        self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
