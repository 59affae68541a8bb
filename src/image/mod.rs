//! Terminal graphics setup for the preview pane.
//!
//! The picker chooses Kitty, Sixel, iTerm2 or half-block output from the
//! terminal's answer to a capability query.

use std::time::Duration;

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;

const PICKER_QUERY_TIMEOUT: Duration = Duration::from_millis(250);

/// Create a picker for the preview, or `None` if the terminal did not
/// answer the capability query.
///
/// Must run before the terminal enters raw mode.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        crate::debug_log::log_event("image.create_picker", "forced protocol=Halfblocks");
        return Some(Picker::halfblocks());
    }

    // The stdio query can leave a reader thread on the Windows console.
    #[cfg(not(unix))]
    {
        crate::debug_log::log_event("image.create_picker", "windows protocol=Halfblocks");
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        let picker = match Picker::from_query_stdio_with_options(query_options()) {
            Ok(picker) => picker,
            Err(err) => {
                tracing::warn!(error = %err, "terminal graphics query failed");
                return None;
            }
        };
        crate::debug_log::log_event(
            "image.create_picker",
            format!(
                "term={} colorterm={} protocol={:?} font={:?}",
                std::env::var("TERM").unwrap_or_else(|_| "<unset>".to_string()),
                std::env::var("COLORTERM").unwrap_or_else(|_| "<unset>".to_string()),
                picker.protocol_type(),
                picker.font_size(),
            ),
        );
        Some(picker)
    }
}

/// Whether the terminal renders 24-bit colour.
///
/// `MERMAID_PAD_TRUECOLOR=1|0` overrides detection.
pub fn supports_truecolor_terminal() -> bool {
    if let Ok(force) = std::env::var("MERMAID_PAD_TRUECOLOR") {
        return matches!(
            force.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if std::env::var("TERM_PROGRAM").is_ok_and(|v| v == "Apple_Terminal") {
        return false;
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

/// Snap RGB channels to the xterm 6x6x6 colour cube, keeping alpha.
///
/// Half-block output on 256-colour terminals looks cleaner from an image
/// that is already quantized.
pub fn quantize_to_ansi256(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    let src = image.to_rgba8();
    let mut out = RgbaImage::new(width, height);
    for (x, y, px) in src.enumerate_pixels() {
        let [r, g, b] = cube_rgb(px[0], px[1], px[2]);
        out.put_pixel(x, y, Rgba([r, g, b, px[3]]));
    }
    DynamicImage::ImageRgba8(out)
}

#[cfg(unix)]
fn query_options() -> QueryStdioOptions {
    let mut options = QueryStdioOptions::default();
    options.timeout = PICKER_QUERY_TIMEOUT;
    options
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let has = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
    };
    has(colorterm, &["truecolor", "24bit"]) || has(term, &["direct", "truecolor"])
}

fn cube_rgb(r: u8, g: u8, b: u8) -> [u8; 3] {
    let level = |v: u8| {
        let idx = (u16::from(v) * 5 / 255) as u8;
        if idx == 0 { 0 } else { 55 + idx * 40 }
    };
    [level(r), level(g), level(b)]
}
