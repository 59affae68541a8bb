//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, PreviewImage, PreviewKey, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::render::{DiagramRenderer, MermanRenderer, SecurityLevel, Theme};

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    watch_enabled: bool,
    theme: Theme,
    security_level: SecurityLevel,
    export_dir: PathBuf,
    images_enabled: bool,
    force_half_cell: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
    renderer: Arc<dyn DiagramRenderer>,
}

impl App {
    /// Create a new application, editing `file_path` or the default example.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            theme: Theme::default(),
            security_level: SecurityLevel::default(),
            export_dir: PathBuf::from("."),
            images_enabled: true,
            force_half_cell: false,
            config_global_path: None,
            config_local_path: None,
            renderer: Arc::new(MermanRenderer::new()),
        }
    }

    /// Enable or disable reloading the source file when it changes on disk.
    #[must_use]
    pub fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub const fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = level;
        self
    }

    /// Directory the exported SVG is written to.
    #[must_use]
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Enable or disable drawing the diagram as an image.
    #[must_use]
    pub const fn with_images_enabled(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Skip protocol detection and use half-block cells.
    #[must_use]
    pub const fn with_force_half_cell(mut self, enabled: bool) -> Self {
        self.force_half_cell = enabled;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Replace the diagram renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn DiagramRenderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
