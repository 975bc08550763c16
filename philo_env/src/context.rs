//! Core environment context trait for the philo simulation.

use crate::error::EnvError;
use std::thread::JoinHandle;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the "real world" so that the simulation core can
/// run against the system clock in production and against a manually
/// advanced clock in tests.
///
/// # Implementations
///
/// - **Production**: `SystemContext` - wraps `Instant`, `thread::sleep`, `thread::Builder`
/// - **Testing**: `VirtualContext` (in `philo_sim`) - virtual clock + spawn budget
///
/// # Thread safety
///
/// A context is shared by every philosopher thread and the monitor, so all
/// methods take `&self` and implementations must be `Send + Sync`.
pub trait PhiloContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Every timestamp in the simulation (meal times, log offsets,
    /// starvation checks) is measured on this clock.
    fn now(&self) -> Duration;

    /// Suspends the calling thread for the given duration.
    ///
    /// In production: `std::thread::sleep`
    /// In testing: advances the virtual clock
    fn sleep(&self, duration: Duration);

    /// Spawns a named thread running `f`.
    ///
    /// Thread creation can fail (resource limits); the failure is returned
    /// instead of panicking so the caller can unwind whatever it already
    /// started.
    ///
    /// # Arguments
    /// * `name` - Thread name, also used in error messages
    /// * `f` - The thread body
    fn spawn<F, T>(&self, name: &str, f: F) -> Result<JoinHandle<T>, EnvError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}
