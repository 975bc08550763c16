//! Error types for the philo simulation.
//!
//! - [`ConfigError`]: malformed or out-of-range command-line values,
//!   reported before anything is allocated.
//! - [`SimError`]: every fatal condition of a run. All of them are
//!   handled at the runner boundary; philosopher and monitor code never
//!   sees an error.

use philo_env::EnvError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Rejected command-line input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Wrong number of positional values (expected 4 or 5).
    #[error("expected 4 or 5 arguments, got {got}")]
    ArgCount {
        /// Number of values supplied
        got: usize,
    },

    /// Value is not a plain base-10 number.
    #[error("{field}: '{value}' is not a positive integer")]
    NotANumber {
        /// Name of the offending field
        field: &'static str,
        /// Raw text supplied
        value: String,
    },

    /// Value is zero or does not fit a signed 32-bit integer.
    #[error("{field}: '{value}' is out of range (1..={max})", max = i32::MAX)]
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Raw text supplied
        value: String,
    },
}

/// Which thread failed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadRole {
    /// A philosopher thread (1-based id)
    Philosopher(usize),
    /// The monitor thread
    Monitor,
}

impl std::fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadRole::Philosopher(id) => write!(f, "philosopher {id}"),
            ThreadRole::Monitor => write!(f, "monitor"),
        }
    }
}

/// Fatal simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid command-line input.
    #[error("bad args: {0}")]
    Config(#[from] ConfigError),

    /// Memory for forks or philosophers could not be reserved.
    #[error("allocation failed for {what}: {source}")]
    Allocation {
        /// What was being allocated
        what: &'static str,
        /// Underlying reservation failure
        #[source]
        source: TryReserveError,
    },

    /// A philosopher or the monitor thread could not be started.
    #[error("{role} thread failed: {source}")]
    ThreadStart {
        /// Thread that failed
        role: ThreadRole,
        /// Underlying environment error
        #[source]
        source: EnvError,
    },
}

impl SimError {
    /// Creates an allocation error.
    pub fn allocation(what: &'static str, source: TryReserveError) -> Self {
        Self::Allocation { what, source }
    }

    /// Creates a thread-start error.
    pub fn thread_start(role: ThreadRole, source: EnvError) -> Self {
        Self::ThreadStart { role, source }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SimError::Config(_) => "config_invalid",
            SimError::Allocation { .. } => "allocation_failed",
            SimError::ThreadStart { role: ThreadRole::Monitor, .. } => "monitor_start_failed",
            SimError::ThreadStart { .. } => "philosopher_start_failed",
        }
    }
}
