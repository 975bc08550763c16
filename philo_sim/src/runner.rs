//! Simulation runner - builds the table, starts every thread, joins them.

use crate::config::SimulationConfig;
use crate::error::{SimError, ThreadRole};
use crate::event::EventSink;
use crate::monitor::{Monitor, Outcome};
use crate::philosopher::Philosopher;
use crate::state::SharedState;

use philo_env::{PhiloContext, SystemContext};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Results from a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// How the run ended
    pub outcome: Outcome,

    /// Meals eaten per philosopher, in id order
    pub meals: Vec<u32>,

    /// Run length in milliseconds
    pub elapsed_ms: u64,
}

/// A fully built table, ready to run once.
///
/// Every fork and meal lock lives inside `Arc`s owned here and by the
/// threads; they are released exactly once when the last owner drops,
/// whichever way `run` exits.
pub struct Simulation<C: PhiloContext> {
    state: Arc<SharedState<C>>,
    table: Arc<[Philosopher<C>]>,
}

impl<C: PhiloContext> Simulation<C> {
    /// Allocates forks and philosophers and fixes the start time.
    pub fn new(config: SimulationConfig, context: Arc<C>, sink: EventSink) -> Result<Self, SimError> {
        let count = config.count;
        let state = Arc::new(SharedState::new(config, context, sink)?);

        let mut seats = Vec::new();
        seats
            .try_reserve_exact(count)
            .map_err(|e| SimError::allocation("philosophers", e))?;
        seats.extend((0..count).map(|i| Philosopher::new(i, Arc::clone(&state))));

        Ok(Self {
            state,
            table: seats.into(),
        })
    }

    /// Shared state of this run.
    pub fn state(&self) -> &Arc<SharedState<C>> {
        &self.state
    }

    /// Starts one thread per philosopher, then the monitor, and waits for
    /// the run to end.
    ///
    /// If a thread cannot be started the run is stopped, every thread
    /// already started is joined, and the error is returned.
    pub fn run(self) -> Result<RunReport, SimError> {
        let context = Arc::clone(self.state.context());

        let mut diners = Vec::new();
        diners
            .try_reserve_exact(self.table.len())
            .map_err(|e| SimError::allocation("threads", e))?;

        for index in 0..self.table.len() {
            let id = index + 1;
            let table = Arc::clone(&self.table);
            match context.spawn(&format!("philo-{id}"), move || table[index].run()) {
                Ok(handle) => diners.push(handle),
                Err(e) => {
                    debug!("philosopher {} failed to start: {}", id, e);
                    self.state.set_stopped();
                    join_diners(diners);
                    return Err(SimError::thread_start(ThreadRole::Philosopher(id), e));
                }
            }
        }
        debug!("started {} philosophers", diners.len());

        let monitor = Monitor::new(Arc::clone(&self.state), Arc::clone(&self.table));
        let watcher = match context.spawn("monitor", move || monitor.run()) {
            Ok(handle) => handle,
            Err(e) => {
                debug!("monitor failed to start: {}", e);
                self.state.set_stopped();
                join_diners(diners);
                return Err(SimError::thread_start(ThreadRole::Monitor, e));
            }
        };

        let outcome = watcher.join().unwrap_or_else(|_| {
            warn!("monitor thread panicked");
            self.state.set_stopped();
            Outcome::Cancelled
        });
        join_diners(diners);

        let report = RunReport {
            outcome,
            meals: self
                .table
                .iter()
                .map(|p| p.meal_record().meals_eaten)
                .collect(),
            elapsed_ms: self.state.elapsed_ms(),
        };
        debug!("run finished: {:?}", report);
        Ok(report)
    }
}

fn join_diners(diners: Vec<JoinHandle<()>>) {
    for (index, handle) in diners.into_iter().enumerate() {
        if handle.join().is_err() {
            warn!("philosopher {} thread panicked", index + 1);
        }
    }
}

/// Runs `config` on the system clock, writing events to stdout.
pub fn run_simulation(config: SimulationConfig) -> Result<RunReport, SimError> {
    Simulation::new(config, SystemContext::shared(), EventSink::stdout())?.run()
}
