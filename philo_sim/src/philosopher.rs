//! Philosopher - one thread cycling eat → sleep → think.
//!
//! ```text
//!   THINKING ──► ACQUIRING_FIRST ──► ACQUIRING_SECOND ──► EATING ──► SLEEPING
//!      ▲                                                                │
//!      └────────────────────────────────────────────────────────────────┘
//!            (any state) ── stop flag observed ──► STOPPED
//! ```
//!
//! Fork order alternates with id parity: even ids take their right fork
//! first, odd ids their left. This breaks the all-left-then-right circular
//! wait but is a heuristic, not a proof of deadlock freedom.

use crate::event::Action;
use crate::state::SharedState;
use philo_env::PhiloContext;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Initial delay for even ids, spreading the first rush on the forks.
pub const START_STAGGER: Duration = Duration::from_micros(500);

/// Meal bookkeeping read by the monitor. Always accessed under the
/// philosopher's meal lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealRecord {
    /// Completed meals
    pub meals_eaten: u32,

    /// Context time at which the last meal started
    pub last_meal: Duration,
}

/// A philosopher sitting at the table.
pub struct Philosopher<C: PhiloContext> {
    /// 1-based id
    id: usize,

    /// Fork index on the left (`index`)
    left: usize,

    /// Fork index on the right (`(index + 1) % count`)
    right: usize,

    /// Guarded `{meals_eaten, last_meal}` pair
    meals: Mutex<MealRecord>,

    state: Arc<SharedState<C>>,
}

impl<C: PhiloContext> Philosopher<C> {
    /// Seats the philosopher at 0-based `index`.
    ///
    /// `last_meal` starts at the run's start time so nobody looks starved
    /// at t=0.
    pub fn new(index: usize, state: Arc<SharedState<C>>) -> Self {
        let (left, right) = state.forks().pair_for(index);
        Self {
            id: index + 1,
            left,
            right,
            meals: Mutex::new(MealRecord {
                meals_eaten: 0,
                last_meal: state.start(),
            }),
            state,
        }
    }

    /// Returns the 1-based id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns a consistent copy of the meal record.
    pub fn meal_record(&self) -> MealRecord {
        *self.meals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `(first, second)` fork indices in acquisition order.
    pub fn fork_order(&self) -> (usize, usize) {
        if self.id % 2 == 0 {
            (self.right, self.left)
        } else {
            (self.left, self.right)
        }
    }

    /// Thread body: cycles until the run is stopped.
    ///
    /// Meeting the quota does not end the loop; only the monitor decides
    /// when the run is over.
    pub fn run(&self) {
        let state = &self.state;
        let config = state.config();

        if self.id % 2 == 0 {
            state.wait_or_cancel(START_STAGGER);
        }

        while !state.read_stopped() {
            self.eat_once();
            if state.read_stopped() {
                break;
            }

            state.emit(self.id, Action::Sleeping, false);
            state.wait_or_cancel(config.sleep());
            if state.read_stopped() {
                break;
            }

            state.emit(self.id, Action::Thinking, false);
            state.wait_or_cancel(config.think());
        }
    }

    /// Takes both forks, eats, and puts them back.
    ///
    /// Alone at the table there is only one fork: it is held for the whole
    /// starvation deadline and then released without eating.
    pub fn eat_once(&self) {
        let state = &self.state;
        let forks = state.forks();
        let (first, second) = self.fork_order();

        let _first = forks.acquire(first);
        state.emit(self.id, Action::TookFork, false);

        if forks.len() == 1 {
            state.wait_or_cancel(state.config().die());
            return;
        }

        let _second = forks.acquire(second);
        state.emit(self.id, Action::TookFork, false);

        self.record_meal();
        state.emit(self.id, Action::Eating, false);
        state.wait_or_cancel(state.config().eat());
    }

    /// Stamps the meal start and bumps the counter under the meal lock.
    pub(crate) fn record_meal(&self) {
        let mut meals = self.meals.lock().unwrap_or_else(PoisonError::into_inner);
        meals.last_meal = self.state.now();
        meals.meals_eaten += 1;
    }
}
