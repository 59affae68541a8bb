use std::time::{Duration, Instant};

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui_image::picker::Picker;

use super::*;
use crate::app::{Message, Model, update};
use crate::render::{RenderError, RenderOutcome};
use crate::source::{DEFAULT_SOURCE, Preset, SourceBuffer};

const SMALL_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80" viewBox="0 0 120 80"><rect x="10" y="10" width="100" height="60" fill="#ff0000"/></svg>"##;

fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).unwrap()
}

fn create_test_model(width: u16, height: u16) -> Model {
    let mut model = Model::new(SourceBuffer::from_text(DEFAULT_SOURCE), (width, height));
    model.active_preset = Some(Preset::Flowchart);
    model
}

fn with_svg(mut model: Model, svg: &str) -> Model {
    let seq = model.take_render_request().unwrap().seq;
    update(
        model,
        Message::RenderCompleted(RenderOutcome {
            seq,
            result: Ok(svg.to_string()),
            elapsed: Duration::ZERO,
        }),
    )
}

fn draw(model: &mut Model, terminal: &mut Terminal<TestBackend>) -> Vec<String> {
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|row| {
            (0..buffer.area.width)
                .map(|col| buffer[(col, row)].symbol())
                .collect()
        })
        .collect()
}

#[test]
fn test_header_shows_title_and_buttons() {
    let mut model = create_test_model(100, 30);
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    assert!(rows[0].contains("Mermaid Editor"));
    assert!(rows[0].contains("[  Dark ]") || rows[0].contains("[ Dark  ]"));
    assert!(rows[0].contains("[  Copy ]") || rows[0].contains("[ Copy  ]"));
    assert!(rows[0].contains("[Export SVG]"));
    assert!(rows[0].contains("[Share]"));
}

#[test]
fn test_copy_button_shows_copied_while_ack_is_active() {
    let mut model = create_test_model(100, 30);
    model.copy_ack.mark(Instant::now());
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    assert!(rows[0].contains("[Copied!]"));
}

#[test]
fn test_theme_button_offers_the_other_theme() {
    let mut model = update(create_test_model(100, 30), Message::ToggleTheme);
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    assert!(rows[0].contains("[ Light ]"));
}

#[test]
fn test_editor_shows_tabs_gutter_and_source() {
    let mut model = create_test_model(100, 30);
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    let text = model.layout().editor_text;
    let tab_row = &rows[usize::from(text.y - 1)];
    for preset in Preset::ALL {
        assert!(tab_row.contains(preset.label()), "missing tab {}", preset.label());
    }
    let first = &rows[usize::from(text.y)];
    assert!(first.contains("1 graph TD"), "first editor row: {first:?}");
    let second = &rows[usize::from(text.y + 1)];
    assert!(second.contains("2   A[Start]"));
}

#[test]
fn test_editor_respects_scroll() {
    let mut model = create_test_model(100, 30);
    model.editor_scroll = 2;
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    let first = &rows[usize::from(model.layout().editor_text.y)];
    assert!(first.contains("3   B -->|Yes|"));
}

#[test]
fn test_cursor_past_line_end_is_drawn() {
    let mut model = update(create_test_model(100, 30), Message::MoveEnd);
    let mut terminal = create_test_terminal(100, 30);
    draw(&mut model, &mut terminal);
    let layout = model.layout();
    let palette = style::Palette::for_theme(model.theme);
    let gutter = editor_gutter_width(model.source.line_count());
    let col = layout.editor_text.x + gutter + 8;
    let cell = &terminal.backend().buffer()[(col, layout.editor_text.y)];
    assert_eq!(cell.bg, palette.cursor.bg.unwrap());
}

#[test]
fn test_zoom_toolbar_shows_percent() {
    let model = create_test_model(100, 30);
    let mut model = update(
        model,
        Message::Viewport(crate::ui::viewport::ViewportEvent::ZoomIn),
    );
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    let row = &rows[usize::from(model.layout().zoom_label.y)];
    assert!(row.contains("[-]"));
    assert!(row.contains("110%"));
    assert!(row.contains("[+]"));
    assert!(row.contains("[Reset]"));
}

#[test]
fn test_preview_without_images_shows_summary() {
    let mut model = with_svg(create_test_model(100, 30), SMALL_SVG);
    model.images_enabled = false;
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    let canvas = model.layout().canvas;
    let top = &rows[usize::from(canvas.y)];
    assert!(top.contains("graph"));
    assert!(rows[usize::from(canvas.y + 1)].contains("zoom 100%"));
}

#[test]
fn test_preview_before_first_render_says_rendering() {
    let mut model = create_test_model(100, 30);
    model.take_render_request();
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    assert!(rows[usize::from(model.layout().canvas.y)].contains("Rendering"));
}

#[test]
fn test_render_error_is_shown_and_svg_kept() {
    let model = with_svg(create_test_model(100, 30), SMALL_SVG);
    let mut model = update(model, Message::InsertChar('!'));
    let seq = model.take_render_request().unwrap().seq;
    let mut model = update(
        model,
        Message::RenderCompleted(RenderOutcome {
            seq,
            result: Err(RenderError::Syntax("bad token".to_string())),
            elapsed: Duration::ZERO,
        }),
    );
    model.images_enabled = false;
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    let all = rows.join("\n");
    assert!(all.contains("syntax error: bad token"));
    assert_eq!(model.render.svg(), Some(SMALL_SVG));
}

#[test]
fn test_status_bar_shows_kind_zoom_and_theme() {
    let mut model = with_svg(create_test_model(100, 30), SMALL_SVG);
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    let status = &rows[29];
    assert!(status.contains("graph"));
    assert!(status.contains("[100%]"));
    assert!(status.contains("light"));
    assert!(status.contains("render:ok"));
}

#[test]
fn test_toast_replaces_status_row() {
    let mut model = update(create_test_model(100, 30), Message::Share);
    let rows = draw(&mut model, &mut create_test_terminal(100, 30));
    assert!(rows[29].contains("[info] Sharing is not available yet"));
    assert!(!rows[29].contains("Ctrl-g:help"));
}

#[test]
fn test_help_overlay_lists_keys_and_scrolls_to_config() {
    let mut model = update(create_test_model(100, 30), Message::ToggleHelp);
    let mut terminal = create_test_terminal(100, 30);
    let rows = draw(&mut model, &mut terminal);
    let all = rows.join("\n");
    assert!(all.contains("Help"));
    assert!(all.contains("Alt+Arrows"));

    model.help_scroll = 500;
    let rows = draw(&mut model, &mut terminal);
    let all = rows.join("\n");
    assert!(all.contains("Local override"));
    assert!(all.contains("sequenceDiagram"));
}

#[test]
fn test_halfblock_preview_builds_protocol_and_draws() {
    let mut model = with_svg(create_test_model(80, 24), SMALL_SVG);
    model.picker = Some(Picker::halfblocks());
    let canvas = model.layout().canvas;
    model.prepare_preview(canvas);
    let key = model.preview.as_ref().map(|p| p.key).expect("preview built");
    assert_eq!(key.width, canvas.width);
    assert_eq!(key.zoom_percent, 100);

    let mut terminal = create_test_terminal(80, 24);
    let result = terminal.draw(|frame| render(&mut model, frame));
    assert!(result.is_ok(), "Rendering with image protocol should not crash");
    let buffer = terminal.backend().buffer();
    let painted = (canvas.y..canvas.y + canvas.height)
        .flat_map(|row| (canvas.x..canvas.x + canvas.width).map(move |col| (col, row)))
        .any(|pos| buffer[pos].fg != ratatui::style::Color::Reset);
    assert!(painted, "halfblock cells should be drawn in the canvas");
}

#[test]
fn test_preview_is_cached_until_viewport_changes() {
    let mut model = with_svg(create_test_model(80, 24), SMALL_SVG);
    model.picker = Some(Picker::halfblocks());
    let canvas = model.layout().canvas;
    model.prepare_preview(canvas);
    let first = model.preview.as_ref().map(|p| p.key);
    model.prepare_preview(canvas);
    assert_eq!(model.preview.as_ref().map(|p| p.key), first);

    let mut model = update(
        model,
        Message::Viewport(crate::ui::viewport::ViewportEvent::Nudge(
            crate::ui::viewport::Point::new(2, 1),
        )),
    );
    model.prepare_preview(canvas);
    let key = model.preview.as_ref().map(|p| p.key).unwrap();
    assert_eq!(key.pan, crate::ui::viewport::Point::new(2, 1));
}

#[test]
fn test_invalid_svg_reports_preview_error() {
    let mut model = with_svg(create_test_model(80, 24), "<svg");
    model.picker = Some(Picker::halfblocks());
    let canvas = model.layout().canvas;
    model.prepare_preview(canvas);
    assert!(model.preview.is_none());
    assert!(model.preview_error().is_some());

    let rows = draw(&mut model, &mut create_test_terminal(80, 24));
    assert!(rows.join("\n").contains("preview:"));
}

#[test]
fn test_char_index_at_column_handles_wide_chars() {
    assert_eq!(char_index_at_column("abc", 1), 1);
    assert_eq!(char_index_at_column("abc", 10), 3);
    // "日" is two columns wide.
    assert_eq!(char_index_at_column("日本x", 1), 0);
    assert_eq!(char_index_at_column("日本x", 2), 1);
    assert_eq!(char_index_at_column("日本x", 4), 2);
}

#[test]
fn test_gutter_width_grows_with_line_count() {
    assert_eq!(editor_gutter_width(9), 2);
    assert_eq!(editor_gutter_width(10), 3);
    assert_eq!(editor_gutter_width(1_000), 5);
}
