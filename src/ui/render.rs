use std::time::Instant;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::Model;
use crate::render::Theme;

use super::layout::{HeaderButton, ScreenLayout, ZoomControl};
use super::style::Palette;
use super::{editor_gutter_width, overlays, preview, status};

const TITLE: &str = "Mermaid Editor";

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = ScreenLayout::new(area);
    let palette = Palette::for_theme(model.theme);

    render_header(model, frame, &layout, &palette);
    render_editor(model, frame, &layout, &palette);
    render_preview_toolbar(model, frame, &layout, &palette);
    preview::render_canvas(model, frame, layout.canvas, &palette);

    // The toast takes over the status row so the body never moves.
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, layout.status);
    } else {
        status::render_status_bar(model, frame, layout.status, &palette);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_header(model: &Model, frame: &mut Frame, layout: &ScreenLayout, palette: &Palette) {
    frame.render_widget(Clear, layout.header);
    frame.render_widget(
        Paragraph::new(Line::styled(format!(" {TITLE}"), palette.title)),
        layout.header,
    );

    let copied = model.copy_ack.is_active(Instant::now());
    for (button, rect) in &layout.buttons {
        let (text, style) = match button {
            HeaderButton::Theme => {
                let next = match model.theme {
                    Theme::Light => "Dark",
                    Theme::Dark => "Light",
                };
                (next, palette.button)
            }
            HeaderButton::Copy if copied => ("Copied!", palette.button_active),
            HeaderButton::Copy => ("Copy", palette.button),
            HeaderButton::Export => ("Export SVG", palette.button),
            HeaderButton::Share => ("Share", palette.button),
        };
        let label = bracketed(text, rect.width);
        frame.render_widget(Paragraph::new(Span::styled(label, style)), *rect);
    }
}

/// `[text]` centered in exactly `width` cells.
fn bracketed(text: &str, width: u16) -> String {
    let inner = usize::from(width.saturating_sub(2));
    format!("[{text:^inner$}]")
}

fn render_editor(model: &Model, frame: &mut Frame, layout: &ScreenLayout, palette: &Palette) {
    let title = model.file_path.as_ref().map_or_else(
        || " Editor ".to_string(),
        |path| {
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
            format!(" Editor: {name} ")
        },
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(palette.border);
    frame.render_widget(Clear, layout.editor_block);
    frame.render_widget(block, layout.editor_block);

    for (preset, rect) in &layout.tabs {
        let style = if model.active_preset == Some(*preset) {
            palette.tab_active
        } else {
            palette.tab
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {} ", preset.label()), style)),
            *rect,
        );
    }

    let area = layout.editor_text;
    let total_lines = model.source.line_count();
    let gutter = usize::from(editor_gutter_width(total_lines)) - 1;
    let start = model.editor_scroll;
    let end = (start + usize::from(area.height)).min(total_lines);
    let cursor = model.source.cursor();

    let mut content: Vec<Line> = Vec::with_capacity(end.saturating_sub(start));
    for line_idx in start..end {
        let line_text = model.source.line_at(line_idx).unwrap_or_default();
        let line_num = format!("{:>gutter$} ", line_idx + 1);
        let mut spans = vec![Span::styled(line_num, palette.gutter)];

        if line_idx == cursor.line {
            let (before, at, after) = split_at_cursor(&line_text, cursor.col);
            if !before.is_empty() {
                spans.push(Span::styled(before.to_string(), palette.text));
            }
            spans.push(Span::styled(at.to_string(), palette.cursor));
            if !after.is_empty() {
                spans.push(Span::styled(after.to_string(), palette.text));
            }
        } else {
            spans.push(Span::styled(line_text, palette.text));
        }
        content.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(content), area);
}

/// Split a line around the char at `col`; the cursor cell is a space past
/// the end of the line.
fn split_at_cursor(line: &str, col: usize) -> (&str, &str, &str) {
    let mut indices = line.char_indices().skip(col);
    let Some((start, _)) = indices.next() else {
        return (line, " ", "");
    };
    let end = indices.next().map_or(line.len(), |(i, _)| i);
    (&line[..start], &line[start..end], &line[end..])
}

fn render_preview_toolbar(
    model: &Model,
    frame: &mut Frame,
    layout: &ScreenLayout,
    palette: &Palette,
) {
    let block = Block::default()
        .title(" Preview ")
        .borders(Borders::ALL)
        .border_style(palette.border);
    frame.render_widget(Clear, layout.preview_block);
    frame.render_widget(block, layout.preview_block);

    let percent = format!("{}%", model.viewport.zoom_percent());
    frame.render_widget(
        Paragraph::new(Span::styled(format!("{percent:^6}"), palette.text)),
        layout.zoom_label,
    );
    for (control, rect) in &layout.zoom_controls {
        let text = match control {
            ZoomControl::ZoomOut => "[-]",
            ZoomControl::ZoomIn => "[+]",
            ZoomControl::Reset => "[Reset]",
        };
        frame.render_widget(Paragraph::new(Span::styled(text, palette.button)), *rect);
    }

    if model.render.is_pending() && layout.zoom_label.width > 0 {
        let left = layout.preview_block.x + 1;
        let width = layout
            .zoom_controls
            .first()
            .map_or(0, |(_, r)| r.x.saturating_sub(left + 1));
        let rect = Rect::new(left, layout.zoom_label.y, width, 1);
        frame.render_widget(Paragraph::new(Span::styled("rendering…", palette.dim)), rect);
    }
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
