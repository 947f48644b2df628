//! Theme and styling for the Flowdeck TUI.
//!
//! A dark palette with a single warm accent. Components never build colors
//! themselves; they go through the constants and style helpers here.

use ratatui::style::{Color, Modifier, Style};

use crate::ui::components::logs::state::LogLevel;

/// Accent color for highlights, key hints and focus indicators.
pub const ACCENT: Color = Color::Rgb(240, 140, 60);

/// Primary foreground color for normal text.
pub const FG: Color = Color::Rgb(224, 224, 230);

/// Muted foreground for labels, hints and descriptions.
pub const FG_MUTED: Color = Color::Rgb(168, 168, 175);

pub const BORDER: Color = Color::Rgb(72, 72, 80);

pub const BORDER_FOCUS: Color = ACCENT;

pub const BG_PANEL: Color = Color::Rgb(18, 18, 24);

/// Background of the field under the cursor.
pub const BG_HIGHLIGHT: Color = Color::Rgb(44, 30, 20);

/// Warning color for rejected submissions and missing required fields.
pub const WARN: Color = Color::Rgb(230, 180, 80);

pub const ERROR: Color = Color::Rgb(220, 96, 110);

pub const SUCCESS: Color = Color::Rgb(120, 200, 140);

/// Border style based on focus state.
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BORDER_FOCUS)
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn title_style() -> Style {
    Style::default().fg(FG_MUTED).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(FG)
}

pub fn text_muted() -> Style {
    Style::default().fg(FG_MUTED)
}

/// Style for the field row under the cursor in a focused form.
pub fn highlight_style() -> Style {
    Style::default().fg(FG).bg(BG_HIGHLIGHT)
}

/// Key names in hint strips.
pub fn key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Info => Style::default().fg(SUCCESS),
        LogLevel::Warn => Style::default().fg(WARN),
        LogLevel::Error => Style::default().fg(ERROR),
    }
}
