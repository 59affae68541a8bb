//! Diagram rendering.
//!
//! Turns diagram source text into SVG markup through a [`DiagramRenderer`]
//! and keeps track of which result is current:
//! - [`pipeline`]: background render worker and sequence-numbered results
//! - [`raster`]: SVG to bitmap conversion for terminal display
//!
//! The production renderer is [`MermanRenderer`].

mod merman_backend;
pub mod pipeline;
pub mod raster;

pub use merman_backend::MermanRenderer;
pub use pipeline::{
    Applied, RenderFailure, RenderOutcome, RenderPipeline, RenderRequest, RenderState,
};

use serde_json::json;

/// Element id passed to every render call.
pub const DIAGRAM_ELEMENT_ID: &str = "mermaid-diagram";

/// Display theme.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Theme name understood by the renderer.
    pub const fn renderer_name(self) -> &'static str {
        match self {
            Self::Light => "default",
            Self::Dark => "dark",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// How much embedded markup the renderer allows in labels.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    Strict,
    #[default]
    Loose,
    Antiscript,
    Sandbox,
}

impl SecurityLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Antiscript => "antiscript",
            Self::Sandbox => "sandbox",
        }
    }
}

/// Renderer configuration applied before each render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderConfig {
    pub theme: Theme,
    pub security_level: SecurityLevel,
    pub start_on_load: bool,
}

impl RenderConfig {
    pub const fn new(theme: Theme, security_level: SecurityLevel) -> Self {
        Self {
            theme,
            security_level,
            start_on_load: true,
        }
    }

    /// The renderer's site configuration object.
    pub fn to_site_config(&self) -> serde_json::Value {
        json!({
            "startOnLoad": self.start_on_load,
            "theme": self.theme.renderer_name(),
            "securityLevel": self.security_level.as_str(),
        })
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(Theme::default(), SecurityLevel::default())
    }
}

/// A failed render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The source does not parse.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The source contains no recognizable diagram.
    #[error("no diagram found in source")]
    NoDiagram,
    /// Parsing succeeded but layout or SVG generation failed.
    #[error("render error: {0}")]
    Layout(String),
    /// The renderer panicked on this source.
    #[error("renderer crashed: {0}")]
    Panicked(String),
    /// The render worker is gone.
    #[error("render worker unavailable")]
    WorkerUnavailable,
}

/// Converts diagram source into SVG markup.
///
/// Implementations must be pure functions of their inputs; the pipeline may
/// call them from a worker thread and discard results that arrive late.
pub trait DiagramRenderer: Send + Sync {
    /// Render `source` with `config`, using `element_id` as the root SVG id.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the source is invalid or cannot be laid out.
    fn render(
        &self,
        element_id: &str,
        source: &str,
        config: &RenderConfig,
    ) -> Result<String, RenderError>;
}
