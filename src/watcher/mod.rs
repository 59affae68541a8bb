//! Reload the diagram source when its file changes on disk.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Debounce used by the event loop.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches one source file and hands back its new contents once writes
/// have settled.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    path: PathBuf,
    file_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl SourceWatcher {
    /// Watch `path`.
    ///
    /// The parent directory is watched rather than the file, since editors
    /// often save by renaming a temp file over the original.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // OS events carry canonical paths.
        let path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let file_name = path.file_name().map(std::ffi::OsStr::to_os_string);
        let dir = parent_dir(&path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %path.display(), "watching source file");

        Ok(Self {
            _watcher: watcher,
            rx,
            dir,
            path,
            file_name,
            debounce,
            pending_since: None,
        })
    }

    /// Whether a change has been seen and the debounce window has passed.
    pub fn poll_ready(&mut self, now: Instant) -> bool {
        let mut relevant = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "file watcher error"),
            }
        }
        if relevant > 0 {
            crate::debug_log::log_event(
                "watcher.change",
                format!("events={relevant} path={}", self.path.display()),
            );
            self.pending_since = Some(now);
        }

        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Read the file if a debounced change is ready.
    ///
    /// A file that vanished or is mid-write and unreadable yields `None`;
    /// the next event tries again.
    pub fn take_reload(&mut self, now: Instant) -> Option<String> {
        if !self.poll_ready(now) {
            return None;
        }
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "reload failed");
                None
            }
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|p| {
            p == &self.dir
                || p == &self.path
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| p.file_name().is_some_and(|f| f == name))
        })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
