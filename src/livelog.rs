//! Logging context for the triage loop.
//!
//! One [`LiveLog`] is constructed at startup and handed by reference to
//! every component that narrates. Three destinations:
//! 1. the console (plain message, no timestamp),
//! 2. a bounded in-memory ring buffer serving the status endpoint,
//! 3. two independent append-only file sinks ("historical" and "live"),
//!    each line prefixed `[YYYY-MM-DD HH:MM:SS]`.
//!
//! Only the ring buffer needs synchronization (the status endpoint reads it
//! from another task). Sink writes are best-effort: directories are created
//! on demand and any I/O failure is swallowed. Losing the historical record
//! is accepted; losing correctness is not.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

/// Number of recent messages kept for the status endpoint.
pub const LOG_BUFFER_SIZE: usize = 100;

pub struct LiveLog {
    buffer: Mutex<VecDeque<String>>,
    sinks: Option<(PathBuf, PathBuf)>,
}

impl LiveLog {
    /// Logging context with both file sinks attached.
    pub fn new(historical: PathBuf, live: PathBuf) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(LOG_BUFFER_SIZE)),
            sinks: Some((historical, live)),
        }
    }

    /// Console and buffer only; used by auxiliary commands and tests.
    pub fn console_only() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(LOG_BUFFER_SIZE)),
            sinks: None,
        }
    }

    /// Narrate: echo to the console and record everywhere else.
    pub fn add(&self, message: &str) {
        println!("{message}");
        self.record(message);
    }

    /// Record without console echo (status-endpoint banner lines).
    pub fn record(&self, message: &str) {
        {
            let mut buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
            if buffer.len() == LOG_BUFFER_SIZE {
                buffer.pop_front();
            }
            buffer.push_back(message.to_string());
        }

        if let Some((historical, live)) = &self.sinks {
            let stamped = format!(
                "{} {message}",
                Local::now().format("[%Y-%m-%d %H:%M:%S]")
            );
            append_line(historical, &stamped);
            append_line(live, &stamped);
        }
    }

    /// Snapshot of the buffer for the status endpoint, newline-joined.
    pub fn get_all(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        buffer.iter().cloned().collect::<Vec<_>>().join("\n")
    }
}

fn append_line(path: &Path, line: &str) {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(dir);
    }
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_to_both_sinks_with_timestamp() {
        let dir = tempdir().unwrap();
        let historical = dir.path().join("logs/history.log");
        let live = dir.path().join("logs/live.log");
        let log = LiveLog::new(historical.clone(), live.clone());

        log.record("cycle started");
        log.record("cycle finished");

        for path in [historical, live] {
            let contents = std::fs::read_to_string(path).unwrap();
            let lines: Vec<&str> = contents.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with('['));
            assert!(lines[0].ends_with("cycle started"));
        }
    }

    #[test]
    fn buffer_is_bounded() {
        let log = LiveLog::console_only();
        for i in 0..(LOG_BUFFER_SIZE + 10) {
            log.record(&format!("line {i}"));
        }
        let all = log.get_all();
        let lines: Vec<&str> = all.lines().collect();
        assert_eq!(lines.len(), LOG_BUFFER_SIZE);
        assert_eq!(lines[0], "line 10");
        assert_eq!(lines[LOG_BUFFER_SIZE - 1], format!("line {}", LOG_BUFFER_SIZE + 9));
    }

    #[test]
    fn sink_failure_is_swallowed() {
        // A path under a file (not a directory) cannot be created.
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let log = LiveLog::new(blocker.join("a.log"), blocker.join("b.log"));

        log.record("still fine");
        assert_eq!(log.get_all(), "still fine");
    }

    #[test]
    fn get_all_joins_in_order() {
        let log = LiveLog::console_only();
        log.record("first");
        log.record("second");
        assert_eq!(log.get_all(), "first\nsecond");
    }
}
