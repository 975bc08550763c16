//! Monitor - the table's supervisor.
//!
//! The Monitor keeps the "God's eye view" of the run:
//! - Starvation: any philosopher whose last meal is `die_ms` old or more
//! - Quota: every philosopher has eaten `must_eat` times
//!
//! It is the only component that ends a run on its own.

use crate::event::Action;
use crate::philosopher::Philosopher;
use crate::state::SharedState;
use philo_env::PhiloContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Pause between two scans of the table.
pub const MONITOR_INTERVAL: Duration = Duration::from_millis(1);

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A philosopher starved.
    Died {
        /// Id of the starved philosopher
        id: usize,
        /// Milliseconds since start at detection
        at_ms: u64,
    },
    /// Every philosopher reached the meal quota.
    Satiated,
    /// The run was stopped by someone other than the monitor.
    Cancelled,
}

/// Watches every philosopher and decides when the run is over.
pub struct Monitor<C: PhiloContext> {
    state: Arc<SharedState<C>>,
    table: Arc<[Philosopher<C>]>,
}

impl<C: PhiloContext> Monitor<C> {
    /// Creates a monitor over `table`.
    pub fn new(state: Arc<SharedState<C>>, table: Arc<[Philosopher<C>]>) -> Self {
        Self { state, table }
    }

    /// Thread body: scans every `MONITOR_INTERVAL` until the run ends.
    pub fn run(&self) -> Outcome {
        loop {
            if self.state.read_stopped() {
                debug!("monitor: run stopped elsewhere");
                return Outcome::Cancelled;
            }
            if let Some(outcome) = self.check_once() {
                debug!("monitor: {:?}", outcome);
                return outcome;
            }
            self.state.context().sleep(MONITOR_INTERVAL);
        }
    }

    /// One pass over the table. Sets the stop flag when it returns
    /// `Died` or `Satiated`.
    pub fn check_once(&self) -> Option<Outcome> {
        if let Some(outcome) = self.scan_starved() {
            return Some(outcome);
        }
        if self.all_satiated() {
            self.state.set_stopped();
            return Some(Outcome::Satiated);
        }
        None
    }

    /// Checks philosophers in ascending id and reports the first one found
    /// starved. Gives up as soon as the run is stopped elsewhere.
    fn scan_starved(&self) -> Option<Outcome> {
        let die = self.state.config().die();

        for philosopher in self.table.iter() {
            if self.state.read_stopped() {
                return Some(Outcome::Cancelled);
            }

            let last_meal = philosopher.meal_record().last_meal;
            if self.state.now().saturating_sub(last_meal) >= die {
                self.state.set_stopped();
                let at_ms = self.state.elapsed_ms();
                self.state.emit(philosopher.id(), Action::Died, true);
                return Some(Outcome::Died {
                    id: philosopher.id(),
                    at_ms,
                });
            }
        }
        None
    }

    /// True if a quota is configured and every philosopher has met it.
    fn all_satiated(&self) -> bool {
        let Some(quota) = self.state.config().must_eat else {
            return false;
        };
        self.table
            .iter()
            .all(|p| p.meal_record().meals_eaten >= quota)
    }
}
