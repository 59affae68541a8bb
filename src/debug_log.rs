//! Render debug event log and timing scopes.
//!
//! When a log path is set (`--render-debug-log` or `MERMAID_PAD_DEBUG_LOG`),
//! every [`log_event`] call appends a timestamped line to that file. Timing
//! scopes write their duration as an event when dropped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Instant;

static LOGGER: LazyLock<Mutex<EventLog>> = LazyLock::new(|| Mutex::new(EventLog::new()));

struct EventLog {
    start: Instant,
    writer: Option<BufWriter<File>>,
}

impl EventLog {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            writer: None,
        }
    }
}

fn logger() -> MutexGuard<'static, EventLog> {
    // A panic while holding the lock leaves the log usable.
    LOGGER
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Times a section of work; logs `<name>.ms` when dropped.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        log_event(
            self.name,
            format!("ms={:.3}", self.start.elapsed().as_secs_f64() * 1000.0),
        );
    }
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Start logging to `path`, or stop logging when `None`.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or written.
pub fn set_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = logger();
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writeln!(writer, "mermaid-pad render debug log start")?;
            writer.flush()?;
            log.start = Instant::now();
            log.writer = Some(writer);
        }
        None => log.writer = None,
    }
    Ok(())
}

pub fn is_enabled() -> bool {
    logger().writer.is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut log = logger();
    let elapsed_ms = log.start.elapsed().as_secs_f64() * 1000.0;
    if let Some(writer) = log.writer.as_mut() {
        let _ = writeln!(writer, "[{elapsed_ms:>10.3} ms] {name}: {}", detail.as_ref());
        let _ = writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_path_enables_logging_and_writes_events() {
        let temp_file = NamedTempFile::new().unwrap();
        set_path(Some(temp_file.path())).unwrap();
        assert!(is_enabled());
        log_event("test.event", "hello world");
        drop(scope("test.scope"));
        set_path(None).unwrap();
        assert!(!is_enabled());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("mermaid-pad render debug log start"));
        assert!(content.contains("test.event: hello world"));
        assert!(content.contains("test.scope: ms="));
    }
}
