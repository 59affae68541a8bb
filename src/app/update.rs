use crate::app::{Model, ToastLevel};
use crate::render::RenderOutcome;
use crate::source::{Direction, Preset};
use crate::ui::viewport::ViewportEvent;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editor
    /// Insert a character at the cursor
    InsertChar(char),
    /// Insert pasted text at the cursor
    InsertText(String),
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,
    /// Split line at cursor (Enter)
    SplitLine,
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    MoveToStart,
    MoveToEnd,
    /// Move cursor to (line, col), e.g. from a mouse click
    MoveTo(usize, usize),
    EditorScrollUp(usize),
    EditorScrollDown(usize),

    // Preview
    /// Pan/zoom input for the preview
    Viewport(ViewportEvent),

    // Actions
    /// Replace the source with an example diagram
    SelectPreset(Preset),
    ToggleTheme,
    /// Copy source to the clipboard (side effect)
    CopySource,
    /// Write the current SVG to disk (side effect)
    ExportSvg,
    Share,

    // Rendering and files
    /// A render finished on the worker thread
    RenderCompleted(RenderOutcome),
    /// The watched file changed; carries its new contents
    SourceReloaded(String),

    // Help
    ToggleHelp,
    HideHelp,
    HelpScrollUp,
    HelpScrollDown,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// Clipboard and file writes live in `effects`.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Editor
        Message::InsertChar(ch) => {
            model.source.insert_char(ch);
            source_edited(&mut model);
        }
        Message::InsertText(text) => {
            model.source.insert_str(&text);
            source_edited(&mut model);
        }
        Message::DeleteBack => {
            if model.source.delete_back() {
                source_edited(&mut model);
            }
        }
        Message::DeleteForward => {
            if model.source.delete_forward() {
                source_edited(&mut model);
            }
        }
        Message::SplitLine => {
            model.source.split_line();
            source_edited(&mut model);
        }
        Message::MoveCursor(direction) => {
            model.source.move_cursor(direction);
            model.ensure_cursor_visible();
        }
        Message::MoveHome => model.source.move_home(),
        Message::MoveEnd => model.source.move_end(),
        Message::MoveToStart => {
            model.source.move_to_start();
            model.ensure_cursor_visible();
        }
        Message::MoveToEnd => {
            model.source.move_to_end();
            model.ensure_cursor_visible();
        }
        Message::MoveTo(line, col) => {
            model.source.move_to(line, col);
            model.ensure_cursor_visible();
        }
        Message::EditorScrollUp(n) => {
            model.editor_scroll = model.editor_scroll.saturating_sub(n);
        }
        Message::EditorScrollDown(n) => {
            let max = model.source.line_count().saturating_sub(1);
            model.editor_scroll = (model.editor_scroll + n).min(max);
        }

        // Preview
        Message::Viewport(event) => {
            model.viewport = model.viewport.apply(event);
        }

        // Actions
        Message::SelectPreset(preset) => {
            model.source.replace(preset.source());
            model.active_preset = Some(preset);
            model.editor_scroll = 0;
            model.render_requested = true;
        }
        Message::ToggleTheme => {
            model.theme = model.theme.toggled();
            model.render_requested = true;
        }
        Message::Share => {
            model.show_toast(ToastLevel::Info, "Sharing is not available yet");
        }
        // CopySource/ExportSvg: handled in effects
        Message::CopySource | Message::ExportSvg => {}

        // Rendering and files
        Message::RenderCompleted(outcome) => {
            // Stale and failed outcomes leave the current SVG in place.
            model.render.apply(outcome);
        }
        Message::SourceReloaded(text) => {
            if !model.source.has_text(&text) {
                let cursor = model.source.cursor();
                model.source.replace(&text);
                model.source.move_to(cursor.line, cursor.col);
                model.ensure_cursor_visible();
                model.active_preset = None;
                model.render_requested = true;
                model.show_toast(ToastLevel::Info, "Reloaded from disk");
            }
        }

        // Help
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll = 0;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::HelpScrollUp => {
            model.help_scroll = model.help_scroll.saturating_sub(1);
        }
        Message::HelpScrollDown => {
            model.help_scroll = model.help_scroll.saturating_add(1);
        }

        // Window
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.ensure_cursor_visible();
        }

        // Application
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}

fn source_edited(model: &mut Model) {
    model.render_requested = true;
    model.ensure_cursor_visible();
}
