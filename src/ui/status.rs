use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::source::diagram_kind;

use super::style::Palette;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    let source = model.source.text();
    let kind = diagram_kind(&source).unwrap_or("unknown").to_string();
    let cursor = model.source.cursor();

    let render_state = if model.render.is_pending() {
        "rendering".to_string()
    } else if model.render.last_error().is_some() {
        "error".to_string()
    } else if model.render.svg().is_some() {
        "ok".to_string()
    } else {
        "idle".to_string()
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };

    let mut spans = vec![Span::raw(format!(
        " {kind}  Ln {}, Col {}  [{}%]  {}  render:{render_state}{watch_indicator}",
        cursor.line + 1,
        cursor.col + 1,
        model.viewport.zoom_percent(),
        model.theme.as_str(),
    ))];
    if let Some(err) = model.render.last_error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err.to_string(), palette.status.patch(palette.error)));
    }
    spans.push(Span::raw("  Ctrl-g:help"));

    let status_bar = Paragraph::new(Line::from(spans)).style(palette.status);
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
