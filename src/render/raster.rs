//! SVG rasterization for the preview pane.
//!
//! Renderer output is parsed with `usvg`, drawn with `resvg` at the zoom the
//! viewport asks for, and then composited onto a canvas the size of the
//! preview so that pan and zoom are applied before the terminal protocol
//! ever sees the image.

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use anyhow::{Result, anyhow};
use image::{DynamicImage, Rgba, RgbaImage};
use regex::Regex;
use resvg::usvg::{self, fontdb};

use crate::ui::viewport::Extent;

static FONTS: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

static ROOT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").expect("valid root tag pattern"));
static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"viewBox="\s*[-\d.]+[\s,]+[-\d.]+[\s,]+([\d.]+)[\s,]+([\d.]+)\s*""#)
        .expect("valid viewBox pattern")
});

/// A parsed SVG ready to be drawn at any scale.
pub struct SvgImage {
    tree: usvg::Tree,
}

impl SvgImage {
    /// Parse renderer output.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is not valid SVG.
    pub fn parse(svg: &str) -> Result<Self> {
        let svg = quote_font_families(&pin_root_size(svg));
        let opts = usvg::Options {
            fontdb: Arc::clone(&FONTS),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)?;
        Ok(Self { tree })
    }

    /// Intrinsic size in SVG user units.
    pub fn size(&self) -> Extent {
        let size = self.tree.size();
        Extent::new(f64::from(size.width()), f64::from(size.height()))
    }

    /// Draw the SVG scaled by `scale`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scaled size is empty or too large to allocate.
    pub fn rasterize(&self, scale: f64) -> Result<DynamicImage> {
        let size = self.size();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let width = (size.width * scale).ceil().max(1.0) as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let height = (size.height * scale).ceil().max(1.0) as u32;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("failed to create pixmap {width}x{height}"))?;
        #[allow(clippy::cast_possible_truncation)]
        let scale = scale as f32;
        resvg::render(
            &self.tree,
            resvg::tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let image = RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| anyhow!("failed to create image from pixmap data"))?;
        Ok(DynamicImage::ImageRgba8(image))
    }
}

/// Scale that fits `content` inside 90% of `area` at 100% zoom.
pub fn fit_scale(content: Extent, area: Extent) -> f64 {
    if content.width <= 0.0 || content.height <= 0.0 {
        return 1.0;
    }
    let sx = area.width * 0.9 / content.width;
    let sy = area.height * 0.9 / content.height;
    sx.min(sy).max(f64::EPSILON)
}

/// Paint `diagram` onto a `canvas_width` x `canvas_height` background with
/// its top-left corner at (`left`, `top`). Parts outside the canvas are
/// clipped.
pub fn compose(
    diagram: &DynamicImage,
    canvas_width: u32,
    canvas_height: u32,
    left: i64,
    top: i64,
    background: Rgba<u8>,
) -> DynamicImage {
    let mut canvas = RgbaImage::from_pixel(canvas_width.max(1), canvas_height.max(1), background);
    image::imageops::overlay(&mut canvas, &diagram.to_rgba8(), left, top);
    DynamicImage::ImageRgba8(canvas)
}

/// Give a `width="100%"` root element the pixel size from its viewBox so
/// the tree gets a concrete size.
fn pin_root_size(svg: &str) -> Cow<'_, str> {
    let Some(root) = ROOT_TAG.find(svg) else {
        return Cow::Borrowed(svg);
    };
    let tag = root.as_str();
    if !tag.contains("width=\"100%\"") {
        return Cow::Borrowed(svg);
    }
    let Some(caps) = VIEW_BOX.captures(tag) else {
        return Cow::Borrowed(svg);
    };
    let mut fixed = tag.replacen("width=\"100%\"", &format!("width=\"{}\"", &caps[1]), 1);
    if !tag.contains(" height=\"") {
        fixed = fixed.replacen("<svg", &format!("<svg height=\"{}\"", &caps[2]), 1);
    }
    Cow::Owned(format!("{}{}{}", &svg[..root.start()], fixed, &svg[root.end()..]))
}

/// Replace double quotes nested inside `font-family="..."` values with
/// single quotes; `usvg` rejects the unescaped form.
fn quote_font_families(svg: &str) -> String {
    const MARKER: &str = "font-family=\"";
    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;

    while let Some(pos) = rest.find(MARKER) {
        out.push_str(&rest[..pos + MARKER.len()]);
        rest = &rest[pos + MARKER.len()..];

        // The value ends at a quote followed by whitespace, `>`, `/` or EOF.
        let mut end = rest.len();
        let mut search_from = 0;
        while let Some(rel) = rest[search_from..].find('"') {
            let idx = search_from + rel;
            let next = rest[idx + 1..].chars().next();
            if next.is_none_or(|c| c == '>' || c == '/' || c.is_whitespace()) {
                end = idx;
                break;
            }
            search_from = idx + 1;
        }
        out.push_str(&rest[..end].replace('"', "'"));
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 40 20"><rect width="40" height="20" fill="red"/></svg>"#;

    #[test]
    fn test_quote_font_families_replaces_inner_quotes() {
        let input = r#"<text font-family="Inter, "Segoe UI", sans-serif" font-size="14">"#;
        assert_eq!(
            quote_font_families(input),
            r#"<text font-family="Inter, 'Segoe UI', sans-serif" font-size="14">"#
        );
    }

    #[test]
    fn test_quote_font_families_no_op_when_clean() {
        let input = r#"<text font-family="Inter, sans-serif" font-size="14">"#;
        assert_eq!(quote_font_families(input), input);
    }

    #[test]
    fn test_pin_root_size_uses_view_box() {
        let input = r#"<svg id="m" width="100%" viewBox="0 0 120.5 80" style="max-width: 120.5px;"><g/></svg>"#;
        let fixed = pin_root_size(input);
        assert!(fixed.contains(r#"width="120.5""#));
        assert!(fixed.contains(r#"height="80""#));
        assert!(fixed.ends_with("<g/></svg>"));
    }

    #[test]
    fn test_pin_root_size_leaves_fixed_sizes_alone() {
        assert!(matches!(pin_root_size(SQUARE), Cow::Borrowed(_)));
    }

    #[test]
    fn test_parse_reports_intrinsic_size() {
        let svg = SvgImage::parse(SQUARE).unwrap();
        assert_eq!(svg.size(), Extent::new(40.0, 20.0));
    }

    #[test]
    fn test_rasterize_applies_scale() {
        let svg = SvgImage::parse(SQUARE).unwrap();
        let img = svg.rasterize(2.0).unwrap();
        assert_eq!((img.width(), img.height()), (80, 40));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SvgImage::parse("not svg").is_err());
    }

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        let scale = fit_scale(Extent::new(100.0, 50.0), Extent::new(200.0, 200.0));
        assert!((scale - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_compose_clips_and_fills_background() {
        let diagram = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        let bg = Rgba([10, 10, 10, 255]);
        let canvas = compose(&diagram, 6, 6, -2, 4, bg).to_rgba8();
        assert_eq!(canvas.dimensions(), (6, 6));
        assert_eq!(*canvas.get_pixel(0, 0), bg);
        assert_eq!(*canvas.get_pixel(0, 4), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(2, 4), bg);
    }
}
