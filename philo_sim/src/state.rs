//! Shared simulation state and the interruptible wait.

use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::event::{Action, EventSink};
use crate::forks::ForkSet;
use crate::stop::StopFlag;
use philo_env::PhiloContext;
use std::sync::Arc;
use std::time::Duration;

/// Polling step of [`SharedState::wait_or_cancel`].
///
/// Bounds how long any thread can keep running after the stop flag is set.
pub const POLL_INTERVAL: Duration = Duration::from_micros(250);

/// State shared by every philosopher and the monitor.
///
/// Owns the forks, the stop flag and the event sink. `start` is captured
/// once at construction and never changes.
pub struct SharedState<C: PhiloContext> {
    config: SimulationConfig,
    context: Arc<C>,
    forks: ForkSet,
    stop: StopFlag,
    sink: EventSink,
    start: Duration,
}

impl<C: PhiloContext> SharedState<C> {
    /// Allocates the forks and fixes the start time.
    pub fn new(config: SimulationConfig, context: Arc<C>, sink: EventSink) -> Result<Self, SimError> {
        let forks = ForkSet::new(config.count)?;
        let start = context.now();
        Ok(Self {
            config,
            context,
            forks,
            stop: StopFlag::new(),
            sink,
            start,
        })
    }

    /// Run configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The environment context.
    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// The fork ring.
    pub fn forks(&self) -> &ForkSet {
        &self.forks
    }

    /// Context time at which the run started.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Current context time.
    pub fn now(&self) -> Duration {
        self.context.now()
    }

    /// Milliseconds since the run started.
    pub fn elapsed_ms(&self) -> u64 {
        self.now().saturating_sub(self.start).as_millis() as u64
    }

    /// Returns whether the run has been stopped.
    pub fn read_stopped(&self) -> bool {
        self.stop.is_set()
    }

    /// Stops the run. Returns `true` only for the call that flipped the flag.
    pub fn set_stopped(&self) -> bool {
        self.stop.set()
    }

    /// Emits one event line for philosopher `id`.
    ///
    /// Dropped once the run is stopped unless `force` is set. The flag lock
    /// is held while the line is written.
    pub fn emit(&self, id: usize, action: Action, force: bool) {
        let stopped = self.stop.lock();
        if *stopped && !force {
            return;
        }
        self.sink.write_event(self.elapsed_ms(), id, action);
        drop(stopped);
    }

    /// Waits for `duration` or until the run is stopped, whichever is first.
    pub fn wait_or_cancel(&self, duration: Duration) {
        let begin = self.context.now();
        while self.context.now().saturating_sub(begin) < duration {
            if self.read_stopped() {
                break;
            }
            self.context.sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VirtualContext;

    fn state(ctx: &Arc<VirtualContext>) -> (SharedState<VirtualContext>, crate::CapturedLog) {
        let config = SimulationConfig::from_args(["3", "800", "200", "200"]).unwrap();
        let (sink, log) = EventSink::capture();
        (SharedState::new(config, Arc::clone(ctx), sink).unwrap(), log)
    }

    #[test]
    fn test_start_is_fixed_at_construction() {
        let ctx = VirtualContext::shared();
        ctx.set_time(Duration::from_millis(40));
        let (state, _) = state(&ctx);

        ctx.advance_time(Duration::from_millis(15));
        assert_eq!(state.start(), Duration::from_millis(40));
        assert_eq!(state.elapsed_ms(), 15);
        assert_eq!(state.forks().len(), 3);
    }

    #[test]
    fn test_emit_timestamps_relative_to_start() {
        let ctx = VirtualContext::shared();
        ctx.set_time(Duration::from_secs(10));
        let (state, log) = state(&ctx);

        state.emit(2, Action::TookFork, false);
        ctx.advance_time(Duration::from_millis(7));
        state.emit(2, Action::Eating, false);

        assert_eq!(log.contents(), "0 2 has taken a fork\n7 2 is eating\n");
    }

    #[test]
    fn test_emit_suppressed_after_stop_unless_forced() {
        let ctx = VirtualContext::shared();
        let (state, log) = state(&ctx);

        state.emit(1, Action::Sleeping, false);
        assert!(state.set_stopped());
        state.emit(1, Action::Thinking, false);
        state.emit(3, Action::Died, true);

        assert_eq!(log.contents(), "0 1 is sleeping\n0 3 died\n");
    }

    #[test]
    fn test_wait_runs_full_duration() {
        let ctx = VirtualContext::shared();
        let (state, _) = state(&ctx);

        state.wait_or_cancel(Duration::from_millis(200));

        let waited = ctx.now();
        assert!(waited >= Duration::from_millis(200));
        assert!(waited < Duration::from_millis(200) + POLL_INTERVAL * 2);
    }

    #[test]
    fn test_wait_zero_returns_immediately() {
        let ctx = VirtualContext::shared();
        let (state, _) = state(&ctx);

        state.wait_or_cancel(Duration::ZERO);
        assert_eq!(ctx.now(), Duration::ZERO);
    }

    #[test]
    fn test_wait_returns_at_once_when_stopped() {
        let ctx = VirtualContext::shared();
        let (state, _) = state(&ctx);

        state.set_stopped();
        state.wait_or_cancel(Duration::from_secs(60));
        assert_eq!(ctx.now(), Duration::ZERO);
    }

    #[test]
    fn test_wait_is_interrupted_by_another_thread() {
        let ctx = Arc::new(philo_env::SystemContext::new());
        let config = SimulationConfig::from_args(["1", "800", "200", "200"]).unwrap();
        let state = Arc::new(SharedState::new(config, Arc::clone(&ctx), EventSink::capture().0).unwrap());

        let stopper = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                state.set_stopped();
            })
        };

        let begin = ctx.now();
        state.wait_or_cancel(Duration::from_secs(30));
        let waited = ctx.now() - begin;
        stopper.join().unwrap();

        assert!(waited < Duration::from_secs(5), "wait ignored the stop: {waited:?}");
    }
}
