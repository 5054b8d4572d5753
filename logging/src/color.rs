//! ANSI color decoration.

use tracing::Level;

pub const RESET_SEQ: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// Bold foreground escape sequence, `ESC[1;3Nm`.
    #[must_use]
    pub fn sequence(self) -> String {
        format!("\x1b[1;{}m", 30 + self as u8)
    }
}

#[must_use]
pub fn level_color(level: Level) -> Color {
    match level {
        Level::ERROR => Color::Red,
        Level::WARN => Color::Yellow,
        Level::INFO => Color::White,
        Level::DEBUG => Color::Blue,
        _ => Color::Cyan,
    }
}

/// Wrap the `left`..`right` delimited part of `message` in the level's color.
///
/// Every `left` becomes `"{color} {left}"` and every `right` becomes
/// `"{right} {reset}"`.
#[must_use]
pub fn color_format(message: &str, level: Level, left: &str, right: &str) -> String {
    let color = level_color(level).sequence();
    message
        .replace(left, &format!("{color} {left}"))
        .replace(right, &format!("{right} {RESET_SEQ}"))
}
