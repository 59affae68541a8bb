use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};
use ratatui_image::protocol::StatefulProtocolType;
use ratatui_image::{Resize, StatefulImage};

use crate::app::Model;
use crate::source::diagram_kind;

use super::style::Palette;

/// Draw the diagram, or a text summary when no image can be shown.
pub fn render_canvas(model: &mut Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let canvas_style = Style::default().bg(palette.canvas);
    frame.buffer_mut().set_style(area, canvas_style);

    if model.shows_images()
        && let Some(preview) = model.preview.as_mut()
    {
        let resize = if matches!(
            preview.protocol.protocol_type(),
            StatefulProtocolType::Halfblocks(_)
        ) {
            // Nearest-neighbor causes strong color aliasing artifacts in half-cell mode.
            Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
        } else {
            Resize::Scale(None)
        };
        frame.render_stateful_widget(
            StatefulImage::default().resize(resize),
            area,
            &mut preview.protocol,
        );
        crate::debug_log::log_event(
            "render.preview",
            format!(
                "seq={} area={}x{}",
                preview.key.svg_seq, area.width, area.height
            ),
        );
        return;
    }

    let lines = summary_lines(model, palette);
    frame.render_widget(
        Paragraph::new(lines)
            .style(canvas_style)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn summary_lines(model: &Model, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match model.render.svg() {
        Some(_) => {
            let source = model.source.text();
            let kind = diagram_kind(&source).unwrap_or("diagram").to_string();
            lines.push(Line::styled(format!(" {kind}"), palette.text));
            let pan = model.viewport.pan();
            lines.push(Line::styled(
                format!(
                    " zoom {}%  pan {},{}",
                    model.viewport.zoom_percent(),
                    pan.x,
                    pan.y
                ),
                palette.dim,
            ));
            if !model.images_enabled {
                lines.push(Line::styled(" images disabled", palette.dim));
            } else if model.picker.is_none() {
                lines.push(Line::styled(" no image support detected", palette.dim));
            }
        }
        None if model.render.is_pending() => {
            lines.push(Line::styled(" Rendering…", palette.dim));
        }
        None => {
            lines.push(Line::styled(" Nothing rendered yet", palette.dim));
        }
    }
    if let Some(err) = model.render.last_error() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(format!(" {err}"), palette.error));
    }
    if let Some(err) = model.preview_error() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(format!(" preview: {err}"), palette.error));
    }
    lines
}
