//! Dining philosophers simulator CLI
//!
//! `philo <count> <die_ms> <eat_ms> <sleep_ms> [<must_eat>]`
//!
//! Events go to stdout, one `<timestamp> <id> <message>` line each.
//! Fatal errors print a single `Error: ...` line to stderr and exit 1.

use clap::error::ErrorKind;
use clap::Parser;
use philo_sim::{run_simulation, RunReport, SimError, SimulationConfig};
use std::fmt::Display;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Dining philosophers simulator
#[derive(Parser, Debug)]
#[command(name = "philo", version)]
#[command(about = "Simulate philosophers sharing forks until one starves or all are fed", long_about = None)]
struct Args {
    /// count die_ms eat_ms sleep_ms [must_eat]
    #[arg(value_name = "VALUES", num_args = 0..)]
    values: Vec<String>,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return fail(format_args!("bad args: {}", usage_message(&e))),
    };

    init_logging(args.verbose);

    match execute(&args) {
        Ok(report) => {
            debug!(
                "outcome={:?} meals={:?} elapsed={}ms",
                report.outcome, report.meals, report.elapsed_ms
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("run failed ({})", e.as_label());
            fail(&e)
        }
    }
}

/// Validates the positional values, then runs on the system clock.
fn execute(args: &Args) -> Result<RunReport, SimError> {
    SimulationConfig::from_args(&args.values)
        .map_err(SimError::from)
        .and_then(run_simulation)
}

/// First line of clap's message, without its `error: ` prefix.
fn usage_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

/// Diagnostics go to stderr so stdout carries only the event stream.
/// `PHILO_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PHILO_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn diagnostic(message: impl Display) -> String {
    format!("Error: {}", message)
}

fn fail(message: impl Display) -> ExitCode {
    eprintln!("{}", diagnostic(message));
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_zero_count_fails_with_one_line() {
        let args = parse(&["philo", "0", "800", "200", "200"]);

        let err = execute(&args).unwrap_err();

        assert_eq!(err.as_label(), "config_invalid");
        let line = diagnostic(&err);
        assert_eq!(line, "Error: bad args: count: '0' is out of range (1..=2147483647)");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_wrong_arg_count_fails_before_running() {
        let args = parse(&["philo", "4", "800", "200"]);

        let err = execute(&args).unwrap_err();
        assert_eq!(
            diagnostic(&err),
            "Error: bad args: expected 4 or 5 arguments, got 3"
        );
    }

    #[test]
    fn test_usage_error_names_offending_flag() {
        let err = Args::try_parse_from(["philo", "--bogus", "4", "800", "200", "200"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let message = usage_message(&err);
        assert!(message.contains("--bogus"), "{message}");
        assert!(!message.contains('\n'));
        assert!(!message.starts_with("error:"));
    }

    #[test]
    fn test_verbose_flag_and_values() {
        let args = parse(&["philo", "-v", "5", "800", "200", "200", "7"]);
        assert!(args.verbose);
        assert_eq!(args.values, ["5", "800", "200", "200", "7"]);
    }
}
