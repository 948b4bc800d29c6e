// Color themes for the TUI

use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub highlight: Color,
    /// Delete action and error toasts.
    pub danger: Color,
    /// Completed rows.
    pub done: Color,
    pub border_type: BorderType,
}

impl Theme {
    pub fn named(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(18, 18, 24),
            foreground: Color::Rgb(220, 220, 230),
            muted: Color::Rgb(120, 120, 140),
            highlight: Color::Rgb(124, 58, 237),
            danger: Color::Rgb(220, 68, 68),
            done: Color::Rgb(80, 180, 120),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(245, 245, 248),
            foreground: Color::Rgb(30, 30, 40),
            muted: Color::Rgb(140, 140, 155),
            highlight: Color::Rgb(104, 40, 220),
            danger: Color::Rgb(190, 40, 40),
            done: Color::Rgb(40, 140, 90),
            border_type: BorderType::Rounded,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
