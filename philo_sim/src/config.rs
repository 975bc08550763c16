//! Simulation configuration and command-line value validation.

use crate::error::ConfigError;
use std::time::Duration;

/// Configuration for a simulation run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of philosophers (and forks)
    pub count: usize,

    /// Maximum time between the start of two meals before starving (ms)
    pub die_ms: u64,

    /// Time spent eating while holding both forks (ms)
    pub eat_ms: u64,

    /// Time spent sleeping after a meal (ms)
    pub sleep_ms: u64,

    /// Meal quota; `None` means the run only ends on a death
    pub must_eat: Option<u32>,
}

/// Positional field names, in command-line order.
const FIELDS: [&str; 5] = ["count", "die_ms", "eat_ms", "sleep_ms", "must_eat"];

impl SimulationConfig {
    /// Builds a config from the positional command-line values.
    ///
    /// Accepts exactly 4 or 5 values. Each must be a plain run of ASCII
    /// digits whose value lies in `1..=i32::MAX`.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        if args.len() != 4 && args.len() != 5 {
            return Err(ConfigError::ArgCount { got: args.len() });
        }

        let mut values = [0u32; 5];
        for (i, raw) in args.iter().enumerate() {
            values[i] = parse_positive(FIELDS[i], raw.as_ref())?;
        }

        Ok(Self {
            count: values[0] as usize,
            die_ms: u64::from(values[1]),
            eat_ms: u64::from(values[2]),
            sleep_ms: u64::from(values[3]),
            must_eat: (args.len() == 5).then_some(values[4]),
        })
    }

    /// Starvation deadline.
    pub fn die(&self) -> Duration {
        Duration::from_millis(self.die_ms)
    }

    /// Eating duration.
    pub fn eat(&self) -> Duration {
        Duration::from_millis(self.eat_ms)
    }

    /// Sleeping duration.
    pub fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }

    /// Thinking duration: half of the slack left in the starvation budget
    /// after eating and sleeping, or zero when there is none.
    pub fn think(&self) -> Duration {
        let slack = self
            .die_ms
            .saturating_sub(self.eat_ms)
            .saturating_sub(self.sleep_ms);
        Duration::from_millis(slack / 2)
    }
}

/// Parses a strictly positive base-10 integer within the signed 32-bit range.
fn parse_positive(field: &'static str, raw: &str) -> Result<u32, ConfigError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::NotANumber {
            field,
            value: raw.to_string(),
        });
    }

    let out_of_range = || ConfigError::OutOfRange {
        field,
        value: raw.to_string(),
    };

    // Only overflow can fail here: the text is all digits.
    let value: u64 = raw.parse().map_err(|_| out_of_range())?;
    if value == 0 || value > i32::MAX as u64 {
        return Err(out_of_range());
    }
    Ok(value as u32)
}
