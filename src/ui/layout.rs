//! Screen geometry shared by drawing and mouse hit-testing.
//!
//! Every clickable element has a fixed width so the hit map does not depend
//! on transient labels such as "Copied!".

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::source::Preset;

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;

/// Header buttons, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderButton {
    Theme,
    Copy,
    Export,
    Share,
}

impl HeaderButton {
    pub const ALL: [Self; 4] = [Self::Theme, Self::Copy, Self::Export, Self::Share];

    /// Width in cells including the brackets.
    pub const fn width(self) -> u16 {
        match self {
            Self::Theme => 9,
            Self::Copy => 9,
            Self::Export => 12,
            Self::Share => 7,
        }
    }
}

/// Buttons on the preview toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomControl {
    ZoomOut,
    ZoomIn,
    Reset,
}

/// Something the pointer can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Header(HeaderButton),
    Tab(Preset),
    Zoom(ZoomControl),
    Editor,
    Preview,
}

/// Where everything is for a given terminal size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub buttons: Vec<(HeaderButton, Rect)>,
    pub editor_block: Rect,
    pub tabs: Vec<(Preset, Rect)>,
    pub editor_text: Rect,
    pub preview_block: Rect,
    pub zoom_label: Rect,
    pub zoom_controls: Vec<(ZoomControl, Rect)>,
    /// Area the diagram is drawn into.
    pub canvas: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);
        let (header, body, status) = (rows[0], rows[1], rows[2]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(EDITOR_WIDTH_PERCENT),
                Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
            ])
            .split(body);
        let (editor_block, preview_block) = (columns[0], columns[1]);

        let editor_inner = inner(editor_block);
        let preview_inner = inner(preview_block);

        Self {
            header,
            buttons: header_buttons(header),
            editor_block,
            tabs: tab_rects(first_row(editor_inner)),
            editor_text: below_first_row(editor_inner),
            preview_block,
            zoom_label: zoom_label_rect(first_row(preview_inner)),
            zoom_controls: zoom_control_rects(first_row(preview_inner)),
            canvas: below_first_row(preview_inner),
            status,
        }
    }

    /// What lies under terminal cell (`column`, `row`).
    pub fn hit(&self, column: u16, row: u16) -> Option<HitTarget> {
        if let Some((button, _)) = self.buttons.iter().find(|(_, r)| contains(*r, column, row)) {
            return Some(HitTarget::Header(*button));
        }
        if let Some((preset, _)) = self.tabs.iter().find(|(_, r)| contains(*r, column, row)) {
            return Some(HitTarget::Tab(*preset));
        }
        if let Some((control, _)) = self
            .zoom_controls
            .iter()
            .find(|(_, r)| contains(*r, column, row))
        {
            return Some(HitTarget::Zoom(*control));
        }
        if contains(self.editor_text, column, row) {
            return Some(HitTarget::Editor);
        }
        if contains(self.canvas, column, row) {
            return Some(HitTarget::Preview);
        }
        None
    }
}

pub const fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

const fn inner(block: Rect) -> Rect {
    Rect::new(
        block.x.saturating_add(1),
        block.y.saturating_add(1),
        block.width.saturating_sub(2),
        block.height.saturating_sub(2),
    )
}

const fn first_row(area: Rect) -> Rect {
    Rect::new(area.x, area.y, area.width, if area.height > 0 { 1 } else { 0 })
}

const fn below_first_row(area: Rect) -> Rect {
    Rect::new(
        area.x,
        area.y.saturating_add(1),
        area.width,
        area.height.saturating_sub(1),
    )
}

/// Right-aligned, one space apart. Buttons that do not fit are dropped from
/// the left.
fn header_buttons(header: Rect) -> Vec<(HeaderButton, Rect)> {
    let mut right = header.x.saturating_add(header.width);
    let mut placed = Vec::new();
    for button in HeaderButton::ALL.iter().rev() {
        let width = button.width();
        if right < header.x.saturating_add(width) {
            break;
        }
        right -= width;
        placed.push((*button, Rect::new(right, header.y, width, 1)));
        right = right.saturating_sub(1);
    }
    placed.reverse();
    placed
}

/// Tabs laid out left to right, each padded by one space on both sides.
fn tab_rects(row: Rect) -> Vec<(Preset, Rect)> {
    let mut x = row.x;
    let end = row.x.saturating_add(row.width);
    let mut tabs = Vec::new();
    for preset in Preset::ALL {
        #[allow(clippy::cast_possible_truncation)]
        let width = preset.label().len() as u16 + 2;
        if x.saturating_add(width) > end {
            break;
        }
        tabs.push((preset, Rect::new(x, row.y, width, row.height)));
        x = x.saturating_add(width + 1);
    }
    tabs
}

const ZOOM_TOOLBAR: [(Option<ZoomControl>, u16); 4] = [
    (Some(ZoomControl::ZoomOut), 3),
    (None, 6),
    (Some(ZoomControl::ZoomIn), 3),
    (Some(ZoomControl::Reset), 7),
];

fn zoom_toolbar_rects(row: Rect) -> Vec<(Option<ZoomControl>, Rect)> {
    let total: u16 = ZOOM_TOOLBAR.iter().map(|(_, w)| w + 1).sum::<u16>() - 1;
    if row.width < total || row.height == 0 {
        return Vec::new();
    }
    let mut x = row.x + row.width - total;
    ZOOM_TOOLBAR
        .iter()
        .map(|(control, width)| {
            let rect = Rect::new(x, row.y, *width, 1);
            x += width + 1;
            (*control, rect)
        })
        .collect()
}

fn zoom_control_rects(row: Rect) -> Vec<(ZoomControl, Rect)> {
    zoom_toolbar_rects(row)
        .into_iter()
        .filter_map(|(control, rect)| control.map(|c| (c, rect)))
        .collect()
}

fn zoom_label_rect(row: Rect) -> Rect {
    zoom_toolbar_rects(row)
        .into_iter()
        .find_map(|(control, rect)| control.is_none().then_some(rect))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ScreenLayout {
        ScreenLayout::new(Rect::new(0, 0, 120, 40))
    }

    #[test]
    fn test_rows_are_header_body_status() {
        let l = layout();
        assert_eq!(l.header, Rect::new(0, 0, 120, 1));
        assert_eq!(l.status, Rect::new(0, 39, 120, 1));
        assert_eq!(l.editor_block.height, 38);
    }

    #[test]
    fn test_buttons_are_right_aligned_in_order() {
        let l = layout();
        let order: Vec<_> = l.buttons.iter().map(|(b, _)| *b).collect();
        assert_eq!(order, HeaderButton::ALL.to_vec());
        let (_, share) = l.buttons.last().unwrap();
        assert_eq!(share.x + share.width, 120);
    }

    #[test]
    fn test_hit_finds_each_button() {
        let l = layout();
        for (button, rect) in &l.buttons {
            assert_eq!(l.hit(rect.x, rect.y), Some(HitTarget::Header(*button)));
            assert_eq!(
                l.hit(rect.x + rect.width - 1, rect.y),
                Some(HitTarget::Header(*button))
            );
        }
    }

    #[test]
    fn test_hit_finds_tabs_and_zoom_controls() {
        let l = layout();
        assert_eq!(l.tabs.len(), 4);
        let (preset, rect) = l.tabs[2];
        assert_eq!(preset, Preset::Class);
        assert_eq!(l.hit(rect.x + 1, rect.y), Some(HitTarget::Tab(Preset::Class)));

        let (control, rect) = l.zoom_controls[0];
        assert_eq!(control, ZoomControl::ZoomOut);
        assert_eq!(l.hit(rect.x, rect.y), Some(HitTarget::Zoom(ZoomControl::ZoomOut)));
        assert_eq!(l.zoom_controls.len(), 3);
        assert_eq!(l.zoom_label.width, 6);
    }

    #[test]
    fn test_canvas_and_editor_hits() {
        let l = layout();
        assert_eq!(
            l.hit(l.canvas.x + 3, l.canvas.y + 3),
            Some(HitTarget::Preview)
        );
        assert_eq!(
            l.hit(l.editor_text.x, l.editor_text.y),
            Some(HitTarget::Editor)
        );
        // Block borders are not targets.
        assert_eq!(l.hit(l.preview_block.x, l.preview_block.y + 5), None);
    }

    #[test]
    fn test_narrow_terminal_drops_controls_instead_of_overlapping() {
        let l = ScreenLayout::new(Rect::new(0, 0, 30, 10));
        let total: u16 = l.buttons.iter().map(|(_, r)| r.width + 1).sum();
        assert!(total <= 31);
        assert!(l.zoom_controls.is_empty());
        for window in l.buttons.windows(2) {
            assert!(window[0].1.x + window[0].1.width < window[1].1.x);
        }
    }
}
