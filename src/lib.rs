// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderState)
    clippy::module_name_repetitions
)]

//! # mermaid-pad
//!
//! A terminal editor for Mermaid diagrams with a live preview.
//!
//! mermaid-pad keeps a text editor and a rendered diagram side by side:
//! - Every edit re-renders the diagram on a worker thread
//! - The preview can be dragged to pan and zoomed from 50% to 200%
//! - Copy, SVG export and light/dark themes from the header
//! - Image output via Kitty, Sixel, iTerm2 or half-block cells
//!
//! ## Architecture
//!
//! mermaid-pad uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`source`]: Editable diagram source and example presets
//! - [`render`]: Diagram rendering, sequencing and rasterization
//! - [`ui`]: Terminal UI components and the preview viewport
//! - [`actions`]: Clipboard copy and SVG export
//! - [`image`]: Terminal image protocol selection
//! - [`watcher`]: File watching
//! - [`config`]: Saved default flags

pub mod actions;
pub mod app;
pub mod config;
pub mod debug_log;
pub mod image;
pub mod render;
pub mod source;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::render::{DiagramRenderer, RenderConfig, SecurityLevel, Theme};
    pub use crate::source::SourceBuffer;
    pub use crate::ui::viewport::ViewportState;
}
