use std::sync::Arc;
use std::time::Duration;

use mermaid_pad::render::raster::SvgImage;
use mermaid_pad::render::{
    Applied, DIAGRAM_ELEMENT_ID, DiagramRenderer, MermanRenderer, RenderConfig, RenderPipeline,
    RenderRequest, RenderState, SecurityLevel, Theme,
};
use mermaid_pad::source::{DEFAULT_SOURCE, Preset};

const WAIT: Duration = Duration::from_secs(30);

#[test]
fn test_default_source_renders_labels() {
    let svg = MermanRenderer::new()
        .render(DIAGRAM_ELEMENT_ID, DEFAULT_SOURCE, &RenderConfig::default())
        .expect("default diagram should render");
    assert!(svg.contains("<svg"));
    assert!(svg.contains(DIAGRAM_ELEMENT_ID));
    assert!(svg.contains("Start"));
    assert!(svg.contains("Debug"));
}

#[test]
fn test_every_preset_renders_and_rasterizes() {
    let renderer = MermanRenderer::new();
    for preset in Preset::ALL {
        let svg = renderer
            .render(DIAGRAM_ELEMENT_ID, preset.source(), &RenderConfig::default())
            .unwrap_or_else(|err| panic!("{} failed: {err}", preset.label()));
        let image = SvgImage::parse(&svg).expect("rendered svg parses");
        let size = image.size();
        assert!(size.width > 0.0 && size.height > 0.0);
        image.rasterize(0.5).expect("rasterizes");
    }
}

#[test]
fn test_dark_theme_changes_output() {
    let renderer = MermanRenderer::new();
    let light = renderer
        .render(DIAGRAM_ELEMENT_ID, DEFAULT_SOURCE, &RenderConfig::default())
        .unwrap();
    let dark = renderer
        .render(
            DIAGRAM_ELEMENT_ID,
            DEFAULT_SOURCE,
            &RenderConfig::new(Theme::Dark, SecurityLevel::Loose),
        )
        .unwrap();
    assert_ne!(light, dark);
}

#[test]
fn test_invalid_source_fails() {
    let result = MermanRenderer::new().render(
        DIAGRAM_ELEMENT_ID,
        "this is not a diagram",
        &RenderConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_pipeline_keeps_last_good_svg_after_failure() {
    let pipeline = RenderPipeline::spawn(Arc::new(MermanRenderer::new())).unwrap();
    let mut state = RenderState::new();

    let seq = state.issue();
    pipeline.submit(RenderRequest {
        seq,
        source: DEFAULT_SOURCE.to_string(),
        config: RenderConfig::default(),
    })
    .unwrap();
    let outcome = pipeline.recv_timeout(WAIT).expect("first render");
    assert_eq!(state.apply(outcome), Applied::Rendered);
    let good = state.svg().unwrap().to_string();

    let seq = state.issue();
    pipeline.submit(RenderRequest {
        seq,
        source: "this is not a diagram".to_string(),
        config: RenderConfig::default(),
    })
    .unwrap();
    let outcome = pipeline.recv_timeout(WAIT).expect("second render");
    assert_eq!(state.apply(outcome), Applied::Failed);

    assert_eq!(state.svg(), Some(good.as_str()));
    assert_eq!(state.failures().len(), 1);
    assert!(state.last_error().is_some());
}
