//! Colors for the two UI themes.
//!
//! Terminal chrome uses indexed colors so it reads on any palette; the
//! preview canvas uses the exact page background behind the diagram.

use image::Rgba;
use ratatui::style::{Color, Modifier, Style};

use crate::render::Theme;

/// Canvas behind the diagram in the light theme (`#f8f9fa`).
pub const LIGHT_CANVAS: Rgba<u8> = Rgba([0xf8, 0xf9, 0xfa, 0xff]);
/// Canvas behind the diagram in the dark theme (`#1e1e1e`).
pub const DARK_CANVAS: Rgba<u8> = Rgba([0x1e, 0x1e, 0x1e, 0xff]);

/// Styles for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub title: Style,
    pub button: Style,
    pub button_active: Style,
    pub tab: Style,
    pub tab_active: Style,
    pub border: Style,
    pub gutter: Style,
    pub text: Style,
    pub cursor: Style,
    pub canvas: Color,
    pub status: Style,
    pub dim: Style,
    pub error: Style,
}

impl Palette {
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }
}

/// Pixel color painted behind the rasterized diagram.
pub const fn canvas_rgba(theme: Theme) -> Rgba<u8> {
    match theme {
        Theme::Light => LIGHT_CANVAS,
        Theme::Dark => DARK_CANVAS,
    }
}

const LIGHT: Palette = Palette {
    title: Style::new().fg(Color::Indexed(24)).add_modifier(Modifier::BOLD),
    button: Style::new().fg(Color::Black).bg(Color::Indexed(254)),
    button_active: Style::new()
        .fg(Color::White)
        .bg(Color::Indexed(28))
        .add_modifier(Modifier::BOLD),
    tab: Style::new().fg(Color::Indexed(240)),
    tab_active: Style::new()
        .fg(Color::Black)
        .bg(Color::Indexed(252))
        .add_modifier(Modifier::BOLD),
    border: Style::new().fg(Color::Indexed(246)),
    gutter: Style::new().fg(Color::Indexed(246)),
    text: Style::new().fg(Color::Black),
    cursor: Style::new().fg(Color::White).bg(Color::Black),
    canvas: Color::Rgb(0xf8, 0xf9, 0xfa),
    status: Style::new().fg(Color::Black).bg(Color::Indexed(252)),
    dim: Style::new().fg(Color::Indexed(243)),
    error: Style::new().fg(Color::Indexed(160)).add_modifier(Modifier::BOLD),
};

const DARK: Palette = Palette {
    title: Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    button: Style::new().fg(Color::White).bg(Color::Indexed(238)),
    button_active: Style::new()
        .fg(Color::Black)
        .bg(Color::Green)
        .add_modifier(Modifier::BOLD),
    tab: Style::new().fg(Color::Indexed(245)),
    tab_active: Style::new()
        .fg(Color::White)
        .bg(Color::Indexed(240))
        .add_modifier(Modifier::BOLD),
    border: Style::new().fg(Color::Indexed(240)),
    gutter: Style::new().fg(Color::DarkGray),
    text: Style::new().fg(Color::Indexed(252)),
    cursor: Style::new().fg(Color::Black).bg(Color::White),
    canvas: Color::Rgb(0x1e, 0x1e, 0x1e),
    status: Style::new().fg(Color::White).bg(Color::DarkGray),
    dim: Style::new().fg(Color::Indexed(245)),
    error: Style::new().fg(Color::LightRed).add_modifier(Modifier::BOLD),
};
