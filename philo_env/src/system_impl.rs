//! Production implementation of PhiloContext using the standard library.

use crate::{EnvError, PhiloContext};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Production context backed by the OS clock and OS threads.
///
/// This is the "real" implementation used by the `philo` binary.
/// Time comes from a monotonic `Instant`, threads from `thread::Builder`.
pub struct SystemContext {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl SystemContext {
    /// Creates a new SystemContext.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped context for sharing across threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PhiloContext for SystemContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }

    fn spawn<F, T>(&self, name: &str, f: F) -> Result<JoinHandle<T>, EnvError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        thread::Builder::new()
            .name(name.to_string())
            .spawn(f)
            .map_err(|e| EnvError::spawn(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_context_time() {
        let ctx = SystemContext::new();
        let t1 = ctx.now();
        ctx.sleep(Duration::from_millis(10));
        let t2 = ctx.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[test]
    fn test_system_context_spawn_names_thread() {
        let ctx = SystemContext::new();
        let handle = ctx
            .spawn("philo-7", || thread::current().name().map(str::to_string))
            .unwrap();

        assert_eq!(handle.join().unwrap().as_deref(), Some("philo-7"));
    }

    #[test]
    fn test_system_context_spawn_returns_value() {
        let ctx = SystemContext::shared();
        let handle = ctx.spawn("worker", || 21 * 2).unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }
}
