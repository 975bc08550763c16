//! Event sink: the `<timestamp> <id> <message>` stream a run produces.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// A philosopher state change worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Acquired one fork
    TookFork,
    /// Started a meal
    Eating,
    /// Started sleeping
    Sleeping,
    /// Started thinking
    Thinking,
    /// Starved
    Died,
}

impl Action {
    /// Returns the log message for this action.
    pub fn message(&self) -> &'static str {
        match self {
            Action::TookFork => "has taken a fork",
            Action::Eating => "is eating",
            Action::Sleeping => "is sleeping",
            Action::Thinking => "is thinking",
            Action::Died => "died",
        }
    }

    /// Parses a log message back into an action.
    pub fn from_message(message: &str) -> Option<Self> {
        [
            Action::TookFork,
            Action::Eating,
            Action::Sleeping,
            Action::Thinking,
            Action::Died,
        ]
        .into_iter()
        .find(|action| action.message() == message)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Serialised line writer shared by every thread of a run.
///
/// One `write_event` call produces exactly one complete line; concurrent
/// callers never interleave. The stop-flag filtering lives in
/// [`SharedState::emit`](crate::SharedState::emit), not here.
pub struct EventSink {
    out: Mutex<Box<dyn Write + Send>>,
    /// Set after the first write failure so it is reported once
    failed: AtomicBool,
}

impl EventSink {
    /// Creates a sink writing to `writer`.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            failed: AtomicBool::new(false),
        }
    }

    /// Creates a sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Creates a sink writing to memory, plus a handle to read it back.
    pub fn capture() -> (Self, CapturedLog) {
        let log = CapturedLog::default();
        (Self::new(log.clone()), log)
    }

    /// Writes one `<timestamp_ms> <id> <message>` line.
    pub fn write_event(&self, timestamp_ms: u64, id: usize, action: Action) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let result = writeln!(out, "{} {} {}", timestamp_ms, id, action).and_then(|_| out.flush());
        if let Err(e) = result {
            if !self.failed.swap(true, Ordering::Relaxed) {
                warn!("event sink write failed: {}", e);
            }
        }
    }
}

/// In-memory log target returned by [`EventSink::capture`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLog {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLog {
    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Returns the parsed lines written so far.
    pub fn lines(&self) -> Vec<LogLine> {
        self.contents().lines().filter_map(LogLine::parse).collect()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One parsed line of the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine {
    /// Milliseconds since simulation start
    pub timestamp_ms: u64,
    /// Philosopher id (1-based)
    pub id: usize,
    /// What happened
    pub action: Action,
}

impl LogLine {
    /// Parses `<timestamp_ms> <id> <message>`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, ' ');
        let timestamp_ms = parts.next()?.parse().ok()?;
        let id = parts.next()?.parse().ok()?;
        let action = Action::from_message(parts.next()?)?;
        Some(Self {
            timestamp_ms,
            id,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let (sink, log) = EventSink::capture();
        sink.write_event(0, 1, Action::TookFork);
        sink.write_event(12, 3, Action::Died);

        assert_eq!(log.contents(), "0 1 has taken a fork\n12 3 died\n");
    }

    #[test]
    fn test_parse_round_trip() {
        let line = LogLine::parse("205 4 is sleeping").unwrap();
        assert_eq!(
            line,
            LogLine {
                timestamp_ms: 205,
                id: 4,
                action: Action::Sleeping
            }
        );
        assert!(LogLine::parse("205 4 is dancing").is_none());
        assert!(LogLine::parse("x 4 died").is_none());
    }

    #[test]
    fn test_concurrent_writers_never_interleave() {
        let (sink, log) = EventSink::capture();
        let sink = Arc::new(sink);

        let handles: Vec<_> = (1..=8)
            .map(|id| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for ts in 0..200 {
                        sink.write_event(ts, id, Action::Thinking);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let raw = log.contents();
        assert_eq!(raw.lines().count(), 8 * 200);
        assert_eq!(log.lines().len(), 8 * 200);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let sink = EventSink::new(BrokenPipe);
        sink.write_event(0, 1, Action::Eating);
        sink.write_event(1, 1, Action::Eating);
        assert!(sink.failed.load(Ordering::Relaxed));
    }
}
