//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Mocha Theme Color Palette
//!
//! Color constants plus the handful of derived styles the form components
//! share. Colors are from the official Catppuccin theme specification:
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};

use crate::model::ui_state::Severity;

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const ORANGE: Color = Color::Rgb(250, 179, 135); // Peach
pub const PINK: Color = Color::Rgb(245, 194, 231); // Pink
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

/// Foreground color for a page message of the given severity.
#[must_use]
pub const fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => CYAN,
        Severity::Success => GREEN,
        Severity::Warning => YELLOW,
        Severity::Error => RED,
    }
}

/// Banner icon for a page message of the given severity.
#[must_use]
pub const fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "ℹ",
        Severity::Success => "✓",
        Severity::Warning => "⚠",
        Severity::Error => "✕",
    }
}

#[must_use]
pub fn severity_style(severity: Severity) -> Style {
    Style::default().fg(severity_color(severity))
}

/// Border of the form cell that currently owns the keyboard.
#[must_use]
pub fn focused_border_style() -> Style {
    Style::default().fg(PURPLE)
}

#[must_use]
pub fn border_style() -> Style {
    Style::default().fg(COMMENT)
}

/// A workflow control that accepts input right now.
#[must_use]
pub fn control_style(enabled: bool) -> Style {
    if enabled {
        Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COMMENT)
    }
}

/// Row under the cursor in lists and tables.
#[must_use]
pub fn highlight_style() -> Style {
    Style::default()
        .bg(CURRENT_LINE)
        .add_modifier(Modifier::BOLD)
}

#[must_use]
pub fn base_style() -> Style {
    Style::default().bg(BACKGROUND).fg(FOREGROUND)
}
