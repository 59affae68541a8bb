use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{Message, Model};
use crate::source::{Direction, Preset};
use crate::ui::layout::{HeaderButton, HitTarget, ZoomControl, contains};
use crate::ui::viewport::{Point, ViewportEvent, WheelDirection};

use super::event_loop::ResizeDebouncer;

const EDITOR_WHEEL_LINES: usize = 3;
const TAB_SPACES: &str = "    ";

pub(super) fn handle_event(
    event: &Event,
    model: &Model,
    now_ms: u64,
    resize_debouncer: &mut ResizeDebouncer,
) -> Option<Message> {
    match event {
        Event::Key(key) => handle_key(*key, model),
        Event::Mouse(mouse) => handle_mouse(*mouse, model),
        Event::Paste(text) if !model.help_visible => Some(Message::InsertText(text.clone())),
        Event::Resize(w, h) => {
            crate::debug_log::log_event("event.resize.queue", format!("width={w} height={h}"));
            resize_debouncer.queue(*w, *h, now_ms);
            None
        }
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && matches!(key.code, KeyCode::Char('q' | 'c')) {
        return Some(Message::Quit);
    }

    if model.help_visible {
        return match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Message::HelpScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::HelpScrollDown),
            _ => Some(Message::HideHelp),
        };
    }

    if ctrl {
        return match key.code {
            KeyCode::Char('y') => Some(Message::CopySource),
            KeyCode::Char('e') => Some(Message::ExportSvg),
            KeyCode::Char('t') => Some(Message::ToggleTheme),
            KeyCode::Char('r') => Some(Message::Viewport(ViewportEvent::Reset)),
            KeyCode::Char('=' | '+') => Some(Message::Viewport(ViewportEvent::ZoomIn)),
            KeyCode::Char('-') => Some(Message::Viewport(ViewportEvent::ZoomOut)),
            KeyCode::Char('g') => Some(Message::ToggleHelp),
            KeyCode::Home => Some(Message::MoveToStart),
            KeyCode::End => Some(Message::MoveToEnd),
            _ => None,
        };
    }

    if alt {
        let nudge = match key.code {
            KeyCode::Left => Point::new(-1, 0),
            KeyCode::Right => Point::new(1, 0),
            KeyCode::Up => Point::new(0, -1),
            KeyCode::Down => Point::new(0, 1),
            _ => return None,
        };
        return Some(Message::Viewport(ViewportEvent::Nudge(nudge)));
    }

    match key.code {
        KeyCode::F(n @ 1..=4) => Preset::ALL
            .get(usize::from(n - 1))
            .map(|preset| Message::SelectPreset(*preset)),
        KeyCode::F(5) => Some(Message::Share),
        KeyCode::Char(ch) => Some(Message::InsertChar(ch)),
        KeyCode::Tab => Some(Message::InsertText(TAB_SPACES.to_string())),
        KeyCode::Enter => Some(Message::SplitLine),
        KeyCode::Backspace => Some(Message::DeleteBack),
        KeyCode::Delete => Some(Message::DeleteForward),
        KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
        KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
        KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
        KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
        KeyCode::Home => Some(Message::MoveHome),
        KeyCode::End => Some(Message::MoveEnd),
        KeyCode::PageUp => Some(Message::EditorScrollUp(model.layout().editor_text.height.into())),
        KeyCode::PageDown => Some(Message::EditorScrollDown(
            model.layout().editor_text.height.into(),
        )),
        _ => None,
    }
}

pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    if model.help_visible {
        return match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::HelpScrollUp),
            MouseEventKind::ScrollDown => Some(Message::HelpScrollDown),
            MouseEventKind::Up(MouseButton::Left) => Some(Message::HideHelp),
            _ => None,
        };
    }

    let layout = model.layout();
    let point = Point::new(i32::from(mouse.column), i32::from(mouse.row));
    let in_canvas = contains(layout.canvas, mouse.column, mouse.row);

    // A drag ends as soon as the pointer leaves the preview.
    if model.viewport.is_dragging() {
        return match mouse.kind {
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved if in_canvas => {
                Some(Message::Viewport(ViewportEvent::PointerMove(point)))
            }
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                Some(Message::Viewport(ViewportEvent::PointerLeave))
            }
            MouseEventKind::Up(MouseButton::Left) => {
                Some(Message::Viewport(ViewportEvent::PointerUp))
            }
            MouseEventKind::ScrollUp if in_canvas => {
                Some(Message::Viewport(ViewportEvent::Wheel(WheelDirection::Up)))
            }
            MouseEventKind::ScrollDown if in_canvas => {
                Some(Message::Viewport(ViewportEvent::Wheel(WheelDirection::Down)))
            }
            _ => None,
        };
    }

    let target = layout.hit(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match target? {
            HitTarget::Preview => Some(Message::Viewport(ViewportEvent::PointerDown(point))),
            HitTarget::Editor => {
                let row = usize::from(mouse.row - layout.editor_text.y);
                let line = model.editor_scroll + row;
                let gutter = crate::ui::editor_gutter_width(model.source.line_count());
                let col = usize::from(
                    mouse
                        .column
                        .saturating_sub(layout.editor_text.x)
                        .saturating_sub(gutter),
                );
                let text = model.source.line_at(line).unwrap_or_default();
                Some(Message::MoveTo(line, crate::ui::char_index_at_column(&text, col)))
            }
            _ => None,
        },
        MouseEventKind::Up(MouseButton::Left) => match target? {
            HitTarget::Header(HeaderButton::Theme) => Some(Message::ToggleTheme),
            HitTarget::Header(HeaderButton::Copy) => Some(Message::CopySource),
            HitTarget::Header(HeaderButton::Export) => Some(Message::ExportSvg),
            HitTarget::Header(HeaderButton::Share) => Some(Message::Share),
            HitTarget::Tab(preset) => Some(Message::SelectPreset(preset)),
            HitTarget::Zoom(ZoomControl::ZoomOut) => {
                Some(Message::Viewport(ViewportEvent::ZoomOut))
            }
            HitTarget::Zoom(ZoomControl::ZoomIn) => Some(Message::Viewport(ViewportEvent::ZoomIn)),
            HitTarget::Zoom(ZoomControl::Reset) => Some(Message::Viewport(ViewportEvent::Reset)),
            HitTarget::Editor | HitTarget::Preview => None,
        },
        MouseEventKind::ScrollUp => match target? {
            HitTarget::Preview => {
                Some(Message::Viewport(ViewportEvent::Wheel(WheelDirection::Up)))
            }
            HitTarget::Editor => Some(Message::EditorScrollUp(EDITOR_WHEEL_LINES)),
            _ => None,
        },
        MouseEventKind::ScrollDown => match target? {
            HitTarget::Preview => {
                Some(Message::Viewport(ViewportEvent::Wheel(WheelDirection::Down)))
            }
            HitTarget::Editor => Some(Message::EditorScrollDown(EDITOR_WHEEL_LINES)),
            _ => None,
        },
        _ => None,
    }
}
