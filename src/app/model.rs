use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui_image::picker::{Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;

use crate::actions::CopyAck;
use crate::render::raster::{SvgImage, compose, fit_scale};
use crate::render::{RenderConfig, RenderRequest, RenderState, SecurityLevel, Theme};
use crate::source::{DEFAULT_SOURCE, Preset, SourceBuffer};
use crate::ui::layout::ScreenLayout;
use crate::ui::viewport::{Extent, Point, ViewTransform, ViewportState};

const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Everything that decides what the preview image looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewKey {
    pub svg_seq: u64,
    pub zoom_percent: u16,
    pub pan: Point,
    pub width: u16,
    pub height: u16,
    pub theme: Theme,
}

/// The composited preview, ready for the terminal protocol.
pub struct PreviewImage {
    pub key: PreviewKey,
    pub protocol: StatefulProtocol,
}

/// The complete application state.
pub struct Model {
    /// Diagram source being edited
    pub source: SourceBuffer,
    /// First visible source line in the editor pane
    pub editor_scroll: usize,
    /// Preview pan/zoom/drag
    pub viewport: ViewportState,
    pub theme: Theme,
    pub security_level: SecurityLevel,
    /// Render sequencing and the current SVG
    pub render: RenderState,
    /// Set by `update` when the source or theme changed
    pub(super) render_requested: bool,
    pub copy_ack: CopyAck,
    toast: Option<Toast>,
    pub help_visible: bool,
    pub help_scroll: usize,
    pub should_quit: bool,
    /// Example tab shown as selected
    pub active_preset: Option<Preset>,
    /// File the source was loaded from
    pub file_path: Option<PathBuf>,
    pub watch_enabled: bool,
    /// Directory `diagram.svg` is written to
    pub export_dir: PathBuf,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Image picker for terminal rendering
    pub picker: Option<Picker>,
    /// Whether the diagram is drawn as an image
    pub images_enabled: bool,
    pub preview: Option<PreviewImage>,
    parsed_svg: Option<(u64, SvgImage)>,
    /// Last time the preview image failed to build, keyed by SVG
    preview_error: Option<(u64, String)>,
    pub terminal_size: (u16, u16),
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("theme", &self.theme)
            .field("viewport", &self.viewport)
            .field("render_seq", &self.render.latest_issued())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model for `source`. The first render is requested at once.
    pub fn new(source: SourceBuffer, terminal_size: (u16, u16)) -> Self {
        Self {
            source,
            editor_scroll: 0,
            viewport: ViewportState::new(),
            theme: Theme::default(),
            security_level: SecurityLevel::default(),
            render: RenderState::new(),
            render_requested: true,
            copy_ack: CopyAck::default(),
            toast: None,
            help_visible: false,
            help_scroll: 0,
            should_quit: false,
            active_preset: None,
            file_path: None,
            watch_enabled: false,
            export_dir: PathBuf::from("."),
            config_global_path: None,
            config_local_path: None,
            picker: None,
            images_enabled: true,
            preview: None,
            parsed_svg: None,
            preview_error: None,
            terminal_size,
        }
    }

    /// Set the image picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn layout(&self) -> ScreenLayout {
        ScreenLayout::new(Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1))
    }

    pub const fn render_config(&self) -> RenderConfig {
        RenderConfig::new(self.theme, self.security_level)
    }

    /// Issue a render request if one is due.
    ///
    /// Every call that returns `Some` takes a fresh sequence number, so
    /// only the newest request can update the preview.
    pub fn take_render_request(&mut self) -> Option<RenderRequest> {
        if !self.render_requested {
            return None;
        }
        self.render_requested = false;
        Some(RenderRequest {
            seq: self.render.issue(),
            source: self.source.text(),
            config: self.render_config(),
        })
    }

    pub const fn render_requested(&self) -> bool {
        self.render_requested
    }

    /// Whether the diagram should be drawn as an image.
    pub const fn shows_images(&self) -> bool {
        self.images_enabled && self.picker.is_some()
    }

    /// Error from the last attempt to build the preview image, if it is
    /// for the current SVG.
    pub fn preview_error(&self) -> Option<&str> {
        self.preview_error
            .as_ref()
            .filter(|(seq, _)| *seq == self.render.svg_seq())
            .map(|(_, msg)| msg.as_str())
    }

    /// Rebuild the preview image for `canvas` if anything it depends on
    /// changed since the last frame.
    pub fn prepare_preview(&mut self, canvas: Rect) {
        if !self.images_enabled || canvas.width == 0 || canvas.height == 0 {
            self.preview = None;
            return;
        }
        let Some(picker) = &self.picker else { return };
        let Some(svg) = self.render.svg() else {
            self.preview = None;
            return;
        };
        let key = PreviewKey {
            svg_seq: self.render.svg_seq(),
            zoom_percent: self.viewport.zoom_percent(),
            pan: self.viewport.pan(),
            width: canvas.width,
            height: canvas.height,
            theme: self.theme,
        };
        if self.preview.as_ref().is_some_and(|p| p.key == key) {
            return;
        }
        if self.preview_error.as_ref().is_some_and(|(seq, _)| *seq == key.svg_seq)
            && self.parsed_svg.is_none()
        {
            return;
        }
        let _scope = crate::debug_log::scope("preview.prepare");

        if self.parsed_svg.as_ref().is_none_or(|(seq, _)| *seq != key.svg_seq) {
            match SvgImage::parse(svg) {
                Ok(parsed) => {
                    self.parsed_svg = Some((key.svg_seq, parsed));
                    self.preview_error = None;
                }
                Err(err) => {
                    tracing::warn!(seq = key.svg_seq, error = %err, "rendered SVG did not parse");
                    self.parsed_svg = None;
                    self.preview = None;
                    self.preview_error = Some((key.svg_seq, err.to_string()));
                    return;
                }
            }
        }
        let Some((_, parsed)) = &self.parsed_svg else { return };

        let (font_w, font_h) = picker.font_size();
        let cell = Extent::new(f64::from(font_w), f64::from(font_h));
        let canvas_px = Extent::new(
            f64::from(canvas.width) * cell.width,
            f64::from(canvas.height) * cell.height,
        );
        let intrinsic = parsed.size();
        let base = fit_scale(intrinsic, canvas_px);
        let fitted = Extent::new(intrinsic.width * base, intrinsic.height * base);
        let transform = ViewTransform::for_viewport(canvas_px, fitted, cell, &self.viewport);

        let raster = match parsed.rasterize(base * transform.scale) {
            Ok(raster) => raster,
            Err(err) => {
                tracing::warn!(seq = key.svg_seq, error = %err, "rasterize failed");
                self.preview = None;
                self.preview_error = Some((key.svg_seq, err.to_string()));
                return;
            }
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (width_px, height_px) = (canvas_px.width as u32, canvas_px.height as u32);
        #[allow(clippy::cast_possible_truncation)]
        let (left, top) = (transform.left.round() as i64, transform.top.round() as i64);
        let mut composed = compose(
            &raster,
            width_px,
            height_px,
            left,
            top,
            crate::ui::style::canvas_rgba(self.theme),
        );

        let halfblocks = matches!(picker.protocol_type(), ProtocolType::Halfblocks);
        if halfblocks && !crate::image::supports_truecolor_terminal() {
            composed = crate::image::quantize_to_ansi256(&composed);
        }
        let protocol = picker.new_resize_protocol(composed);
        crate::debug_log::log_event(
            "preview.protocol",
            format!(
                "seq={} zoom={} pan={},{} canvas={}x{} px={width_px}x{height_px} \
                 halfblocks={halfblocks}",
                key.svg_seq, key.zoom_percent, key.pan.x, key.pan.y, key.width, key.height
            ),
        );
        self.preview_error = None;
        self.preview = Some(PreviewImage { key, protocol });
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Rows available for source text in the editor pane.
    pub(super) fn editor_visible_rows(&self) -> usize {
        usize::from(self.layout().editor_text.height)
    }

    /// Scroll the editor so the cursor line is on screen.
    pub(super) fn ensure_cursor_visible(&mut self) {
        let cursor_line = self.source.cursor().line;
        let visible = self.editor_visible_rows();
        if visible == 0 {
            self.editor_scroll = cursor_line;
            return;
        }
        if cursor_line < self.editor_scroll {
            self.editor_scroll = cursor_line;
        } else if cursor_line >= self.editor_scroll + visible {
            self.editor_scroll = cursor_line + 1 - visible;
        }
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(SourceBuffer::from_text(DEFAULT_SOURCE), (80, 24))
    }
}
