//! Dining Philosophers Simulation
//!
//! N philosopher threads share N forks laid out in a ring. Each one
//! repeatedly takes its two forks, eats, sleeps and thinks, while a
//! monitor thread watches for starvation or for every philosopher having
//! met an optional meal quota.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Simulation                           │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ SharedState: config · forks · stop flag · sink       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                        │                            │
//! │  ┌────▼────┐   fork i+1   ┌────▼────┐                       │
//! │  │ philo 1 │◄────────────►│ philo 2 │     ...               │
//! │  └─────────┘              └─────────┘                       │
//! │       ▲                        ▲                            │
//! │       │     meal records       │                            │
//! │  ┌────┴────────────────────────┴────┐                       │
//! │  │             Monitor              │                       │
//! │  │   (starvation + quota checks)    │                       │
//! │  └──────────────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use philo_sim::{run_simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_args(["5", "800", "200", "200", "7"]).unwrap();
//! let report = run_simulation(config).unwrap();
//! println!("{:?}", report.outcome);
//! ```

mod config;
mod context;
mod error;
mod event;
mod forks;
mod monitor;
mod philosopher;
mod runner;
mod state;
mod stop;

pub use config::SimulationConfig;
pub use context::VirtualContext;
pub use error::{ConfigError, SimError, ThreadRole};
pub use event::{Action, CapturedLog, EventSink, LogLine};
pub use forks::{ForkGuard, ForkSet};
pub use monitor::{Monitor, Outcome, MONITOR_INTERVAL};
pub use philosopher::{MealRecord, Philosopher, START_STAGGER};
pub use runner::{run_simulation, RunReport, Simulation};
pub use state::{SharedState, POLL_INTERVAL};
pub use stop::StopFlag;
