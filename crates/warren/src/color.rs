//! ANSI coloring, per the reader's color mode.
//!
//! `Dark` is for terminals with a dark background and uses the colors as
//! named. `Light` swaps each color for its counterpart that stays
//! readable on a light background. `None` leaves text alone.

use warren_store::ColorMode;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    DarkRed,
    Green,
    DarkGreen,
    Blue,
    DarkBlue,
    Yellow,
    DarkYellow,
    Magenta,
    DarkMagenta,
    Cyan,
    DarkCyan,
    Black,
    White,
    Gray,
}

impl Color {
    pub(crate) const ALL: [Color; 15] = [
        Color::Red,
        Color::DarkRed,
        Color::Green,
        Color::DarkGreen,
        Color::Blue,
        Color::DarkBlue,
        Color::Yellow,
        Color::DarkYellow,
        Color::Magenta,
        Color::DarkMagenta,
        Color::Cyan,
        Color::DarkCyan,
        Color::Black,
        Color::White,
        Color::Gray,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::DarkRed => "Dark Red",
            Color::Green => "Green",
            Color::DarkGreen => "Dark Green",
            Color::Blue => "Blue",
            Color::DarkBlue => "Dark Blue",
            Color::Yellow => "Yellow",
            Color::DarkYellow => "Dark Yellow",
            Color::Magenta => "Magenta",
            Color::DarkMagenta => "Dark Magenta",
            Color::Cyan => "Cyan",
            Color::DarkCyan => "Dark Cyan",
            Color::Black => "Black",
            Color::White => "White",
            Color::Gray => "Gray",
        }
    }

    /// The color to use on a light background.
    fn on_light(self) -> Color {
        match self {
            Color::Red => Color::DarkRed,
            Color::DarkRed => Color::Red,
            Color::Green => Color::DarkGreen,
            Color::DarkGreen => Color::Green,
            Color::Blue => Color::DarkBlue,
            Color::DarkBlue => Color::Blue,
            Color::Yellow => Color::DarkYellow,
            Color::DarkYellow => Color::Yellow,
            Color::Magenta => Color::DarkMagenta,
            Color::DarkMagenta => Color::Magenta,
            Color::Cyan => Color::DarkCyan,
            Color::DarkCyan => Color::Cyan,
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Gray => Color::Gray,
        }
    }

    fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[1;31m",
            Color::DarkRed => "\x1b[0;31m",
            Color::Green => "\x1b[1;32m",
            Color::DarkGreen => "\x1b[0;32m",
            Color::Blue => "\x1b[1;34m",
            Color::DarkBlue => "\x1b[0;34m",
            Color::Yellow => "\x1b[1;33m",
            Color::DarkYellow => "\x1b[0;33m",
            Color::Magenta => "\x1b[1;35m",
            Color::DarkMagenta => "\x1b[0;35m",
            Color::Cyan => "\x1b[1;36m",
            Color::DarkCyan => "\x1b[0;36m",
            Color::Black => "\x1b[0;30m",
            Color::White => "\x1b[1;37m",
            Color::Gray => "\x1b[1;30m",
        }
    }
}

pub(crate) fn colorize(mode: ColorMode, color: Color, text: &str) -> String {
    let color = match mode {
        ColorMode::None => return text.to_string(),
        ColorMode::Dark => color,
        ColorMode::Light => color.on_light(),
    };
    format!("{}{text}{RESET}", color.code())
}

/// Parses `none`, `light`, or `dark`, ignoring case.
pub(crate) fn parse_mode(text: &str) -> Option<ColorMode> {
    match text.to_ascii_lowercase().as_str() {
        "none" => Some(ColorMode::None),
        "light" => Some(ColorMode::Light),
        "dark" => Some(ColorMode::Dark),
        _ => None,
    }
}

pub(crate) fn mode_label(mode: ColorMode) -> &'static str {
    match mode {
        ColorMode::None => "None",
        ColorMode::Light => "Light",
        ColorMode::Dark => "Dark",
    }
}
