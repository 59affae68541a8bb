//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`layout`]: Screen geometry shared with mouse hit-testing
//! - [`viewport`]: Preview pan/zoom state and its view transform
//! - [`style`]: Theming and colors

pub mod layout;
pub mod style;
pub mod viewport;

mod overlays;
mod preview;
mod render;
mod status;

use unicode_width::UnicodeWidthChar;

pub use render::{line_number_width, render};

/// Columns taken by the line-number gutter, including its trailing space.
pub const fn editor_gutter_width(line_count: usize) -> u16 {
    line_number_width(line_count) + 1
}

/// Char index in `line` under display column `column`. Columns past the end
/// map to the end of the line.
pub fn char_index_at_column(line: &str, column: usize) -> usize {
    let mut used = 0;
    for (idx, ch) in line.chars().enumerate() {
        let width = ch.width().unwrap_or(0);
        if column < used + width.max(1) {
            return idx;
        }
        used += width;
    }
    line.chars().count()
}

#[cfg(test)]
mod tests;
