use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::source::{Preset, SYNTAX_GUIDE};

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));
    let code_style = Style::default().fg(Color::Cyan);

    let mut all_lines: Vec<Line> = Vec::new();

    all_lines.push(Line::styled("Editor", section_style));
    all_lines.push(Line::raw("  Type / paste        Edit source"));
    all_lines.push(Line::raw("  Arrows, Home/End    Move cursor"));
    all_lines.push(Line::raw("  Ctrl+Home/End       Buffer start / end"));
    all_lines.push(Line::raw("  PageUp/PageDown     Scroll editor"));
    all_lines.push(Line::raw("  Click               Place cursor"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Examples", section_style));
    for (idx, preset) in Preset::ALL.iter().enumerate() {
        all_lines.push(Line::raw(format!(
            "  F{:<18} {}",
            idx + 1,
            preset.label()
        )));
    }
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Preview", section_style));
    all_lines.push(Line::raw("  Drag                Pan"));
    all_lines.push(Line::raw("  Wheel               Zoom in / out"));
    all_lines.push(Line::raw("  Alt+Arrows          Pan by one cell"));
    all_lines.push(Line::raw("  Ctrl-+ / Ctrl--     Zoom in / out"));
    all_lines.push(Line::raw("  Ctrl-r              Reset zoom and pan"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Actions", section_style));
    all_lines.push(Line::raw("  Ctrl-t              Toggle theme"));
    all_lines.push(Line::raw("  Ctrl-y              Copy source"));
    all_lines.push(Line::raw("  Ctrl-e              Export diagram.svg"));
    all_lines.push(Line::raw("  F5                  Share"));
    all_lines.push(Line::raw("  Ctrl-g              Toggle help"));
    all_lines.push(Line::raw("  Ctrl-q / Ctrl-c     Quit"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Syntax Guide", section_style));
    for (title, snippet) in SYNTAX_GUIDE {
        all_lines.push(Line::styled(format!("  {title}"), dim_style));
        for line in snippet.lines() {
            all_lines.push(Line::styled(format!("    {line}"), code_style));
        }
    }
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Config", section_style));
    all_lines.push(Line::raw(format!("  Global: {global_cfg}")));
    all_lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height_u16 = inner.height.saturating_sub(1);
    let content_height = content_height_u16 as usize;
    let max_scroll = all_lines.len().saturating_sub(content_height);
    let scroll = model.help_scroll.min(max_scroll);

    let end = (scroll + content_height).min(all_lines.len());
    let visible: Vec<Line> = all_lines[scroll..end].to_vec();

    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height_u16);
    frame.render_widget(Paragraph::new(visible), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height_u16, inner.width, 1);
    let footer = Line::styled("j/k scroll \u{2502} any other key closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
