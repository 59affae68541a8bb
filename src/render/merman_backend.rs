use merman::MermaidConfig;
use merman::render::{HeadlessError, HeadlessRenderer};

use super::{DiagramRenderer, RenderConfig, RenderError};

/// Renders Mermaid source with the headless `merman` engine.
///
/// A fresh engine is configured for every call so theme and security level
/// changes always take effect; the setup is idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermanRenderer;

impl MermanRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl DiagramRenderer for MermanRenderer {
    fn render(
        &self,
        element_id: &str,
        source: &str,
        config: &RenderConfig,
    ) -> Result<String, RenderError> {
        let renderer = HeadlessRenderer::new()
            .with_site_config(MermaidConfig::from_value(config.to_site_config()));
        // Overlay plain text for <foreignObject> labels; resvg ignores HTML.
        match renderer.render_svg_readable_sync_with_diagram_id(source, element_id) {
            Ok(Some(svg)) => Ok(svg),
            Ok(None) => Err(RenderError::NoDiagram),
            Err(HeadlessError::Parse(err)) => Err(RenderError::Syntax(err.to_string())),
            Err(HeadlessError::Render(err)) => Err(RenderError::Layout(err.to_string())),
        }
    }
}
