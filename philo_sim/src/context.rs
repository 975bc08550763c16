//! Virtual context implementing PhiloContext for deterministic testing.

use philo_env::{EnvError, PhiloContext};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Simulation context backed by a virtual clock.
///
/// This implements `PhiloContext` using:
/// - A virtual clock that can be advanced manually
/// - Simulated sleep that advances virtual time instead of blocking
/// - Real OS threads, optionally limited by a spawn budget so tests can
///   make the N-th thread creation fail
pub struct VirtualContext {
    /// Current virtual time (nanoseconds since context creation)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Remaining successful spawns (`None` = unlimited)
    spawn_budget: Arc<Mutex<Option<usize>>>,
}

impl VirtualContext {
    /// Creates a new VirtualContext at virtual time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
            spawn_budget: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a context whose spawns start failing after `limit` successes.
    pub fn with_spawn_limit(limit: usize) -> Self {
        let ctx = Self::new();
        *ctx.spawn_budget.lock().unwrap_or_else(PoisonError::into_inner) = Some(limit);
        ctx
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time += duration.as_nanos() as u64;
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time: Duration) {
        let mut now = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *now = time.as_nanos() as u64;
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_spawn_slot(&self) -> bool {
        let mut budget = self.spawn_budget.lock().unwrap_or_else(PoisonError::into_inner);
        match budget.as_mut() {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        }
    }
}

impl Default for VirtualContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualContext {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            spawn_budget: Arc::clone(&self.spawn_budget),
        }
    }
}

impl PhiloContext for VirtualContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn sleep(&self, duration: Duration) {
        // Sleeping advances virtual time; yield so other threads observe it.
        self.advance_time(duration);
        thread::yield_now();
    }

    fn spawn<F, T>(&self, name: &str, f: F) -> Result<JoinHandle<T>, EnvError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if !self.take_spawn_slot() {
            return Err(EnvError::refused(name));
        }
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
    fn test_virtual_context_time() {
        let ctx = VirtualContext::new();
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.sleep(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));

        ctx.set_time(Duration::from_millis(20));
        assert_eq!(ctx.now(), Duration::from_millis(20));
    }

    #[test]
    fn test_virtual_context_clone_shares_time() {
        let ctx1 = VirtualContext::new();
        let ctx2 = ctx1.clone();

        ctx1.advance_time(Duration::from_secs(5));

        assert_eq!(ctx1.now(), ctx2.now());
    }

    #[test]
    fn test_spawn_limit_refuses_after_budget() {
        let ctx = VirtualContext::with_spawn_limit(2);

        let a = ctx.spawn("a", || ()).unwrap();
        let b = ctx.spawn("b", || ()).unwrap();
        let err = ctx.spawn("c", || ()).unwrap_err();

        assert_eq!(err.thread_name(), "c");
        a.join().unwrap();
        b.join().unwrap();
    }

    #[test]
    fn test_unlimited_spawns_by_default() {
        let ctx = VirtualContext::new();
        let handles: Vec<_> = (0..8)
            .map(|i| ctx.spawn(&format!("t{i}"), move || i).unwrap())
            .collect();
        let sum: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(sum, 28);
    }
}
