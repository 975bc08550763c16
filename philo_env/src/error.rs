//! Error types for the philo environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The operating system refused to create the thread.
    #[error("failed to spawn thread {name}: {source}")]
    Spawn {
        /// Name the thread would have carried
        name: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The context refused to create the thread (spawn budget exhausted).
    #[error("spawn refused for thread {0}")]
    SpawnRefused(String),
}

impl EnvError {
    /// Creates a spawn error from an OS failure.
    pub fn spawn(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            name: name.into(),
            source,
        }
    }

    /// Creates a refused-spawn error.
    pub fn refused(name: impl std::fmt::Display) -> Self {
        Self::SpawnRefused(name.to_string())
    }

    /// Returns the name of the thread that failed to start.
    pub fn thread_name(&self) -> &str {
        match self {
            Self::Spawn { name, .. } => name,
            Self::SpawnRefused(name) => name,
        }
    }
}
