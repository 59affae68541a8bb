//! Copy and export actions.
//!
//! Copy writes the diagram source to the system clipboard and raises a
//! short-lived acknowledgment; export writes the rendered SVG to disk.

use std::io::{Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use base64::Engine;

/// How long the header shows "Copied!" after a copy.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

/// File name used for exported diagrams.
pub const EXPORT_FILE_NAME: &str = "diagram.svg";
/// MIME type of exported diagrams.
pub const EXPORT_MIME_TYPE: &str = "image/svg+xml";

/// Write-only text clipboard.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform clipboard cannot be reached.
    fn set_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// The terminal's clipboard: `pbcopy` on macOS, OSC 52 otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> std::io::Result<()> {
        #[cfg(target_os = "macos")]
        {
            if copy_to_pbcopy(text).is_ok() {
                return Ok(());
            }
        }
        let mut out = stdout();
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()
    }
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    pipe_to_command("pbcopy", text)
}

/// Write `text` to the stdin of `program` and wait for it to exit.
#[cfg(any(target_os = "macos", test))]
fn pipe_to_command(program: &str, text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new(program).stdin(Stdio::piped()).spawn()?;
    // stdin is dropped before waiting so pbcopy sees EOF; the child is
    // reaped even when the write fails.
    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{program} failed")))
    }
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// The transient "Copied!" flag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyAck {
    since: Option<Instant>,
}

impl CopyAck {
    pub const fn mark(&mut self, now: Instant) {
        self.since = Some(now);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.since
            .is_some_and(|since| now.saturating_duration_since(since) < COPY_ACK_DURATION)
    }

    /// Clear the flag once it has expired. Returns true when it changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.since.is_some() && !self.is_active(now) {
            self.since = None;
            return true;
        }
        false
    }
}

/// Copy `text` to `clipboard` and raise the acknowledgment.
///
/// The acknowledgment is raised even when the clipboard write fails; the
/// error is returned for reporting only.
///
/// # Errors
///
/// Returns the clipboard error, if any.
pub fn copy_source(
    clipboard: &mut dyn Clipboard,
    text: &str,
    ack: &mut CopyAck,
    now: Instant,
) -> std::io::Result<()> {
    ack.mark(now);
    clipboard.set_text(text)
}

/// Write `svg` to `dir/diagram.svg`, replacing any earlier export.
///
/// The file handle is closed before this returns.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn export_svg(svg: &str, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
    let path = dir.join(EXPORT_FILE_NAME);
    {
        let mut file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(svg.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    tracing::info!(
        path = %path.display(),
        mime = EXPORT_MIME_TYPE,
        bytes = svg.len(),
        "exported diagram"
    );
    Ok(path)
}

/// In-memory clipboard for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

#[cfg(test)]
impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> std::io::Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> std::io::Result<()> {
            Err(std::io::Error::other("no clipboard"))
        }
    }

    #[test]
    fn test_osc52_sequence_encodes_text() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_copy_places_exact_source_on_clipboard() {
        let mut clipboard = MemoryClipboard::default();
        let mut ack = CopyAck::default();
        let source = "graph TD\n  A[Start] --> B\n";
        copy_source(&mut clipboard, source, &mut ack, Instant::now()).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some(source));
    }

    #[test]
    fn test_copy_ack_is_active_then_expires() {
        let mut clipboard = MemoryClipboard::default();
        let mut ack = CopyAck::default();
        let t0 = Instant::now();
        copy_source(&mut clipboard, "x", &mut ack, t0).unwrap();

        assert!(ack.is_active(t0));
        assert!(ack.is_active(t0 + Duration::from_millis(1999)));
        assert!(!ack.is_active(t0 + COPY_ACK_DURATION));
        assert!(ack.expire(t0 + COPY_ACK_DURATION));
        assert!(!ack.expire(t0 + COPY_ACK_DURATION));
    }

    #[test]
    fn test_copy_ack_raised_even_when_clipboard_fails() {
        let mut ack = CopyAck::default();
        let now = Instant::now();
        assert!(copy_source(&mut BrokenClipboard, "x", &mut ack, now).is_err());
        assert!(ack.is_active(now));
    }

    #[test]
    fn test_recopy_restarts_ack_window() {
        let mut ack = CopyAck::default();
        let t0 = Instant::now();
        ack.mark(t0);
        ack.mark(t0 + Duration::from_millis(1500));
        assert!(ack.is_active(t0 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_export_writes_diagram_svg() {
        let dir = tempdir().unwrap();
        let path = export_svg("<svg></svg>", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg></svg>");
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let dir = tempdir().unwrap();
        export_svg("<svg>one</svg>", dir.path()).unwrap();
        let path = export_svg("<svg>two</svg>", dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg>two</svg>");
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("svg");
        let path = export_svg("<svg/>", &nested).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_to_command_reports_failures() {
        // `true` never reads stdin, so a large write hits a closed pipe.
        let err = pipe_to_command("true", &"x".repeat(1 << 20)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);

        let err = pipe_to_command("false", "").unwrap_err();
        assert!(err.to_string().contains("false failed"));
    }
}
