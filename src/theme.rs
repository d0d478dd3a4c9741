//! Color palette for the viewer chrome.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub surface: Color,
}

/// Default ink-on-paper scheme.
pub const INKPRESS: Palette = Palette {
    bg: Color::Rgb(0x1b, 0x1d, 0x22),
    fg: Color::Rgb(0xd8, 0xd4, 0xc8),
    accent: Color::Rgb(0x7a, 0xa2, 0xf7),
    muted: Color::Rgb(0x6b, 0x70, 0x89),
    error: Color::Rgb(0xf7, 0x76, 0x8e),
    surface: Color::Rgb(0x24, 0x28, 0x30),
};

impl Default for Palette {
    fn default() -> Self {
        INKPRESS
    }
}
