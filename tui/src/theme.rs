//! Color Theme
//!
//! Palette resolution for the dark and light themes from the user profile.

use oracle_core::Theme;
use ratatui::style::Color;

/// Resolved palette for the active theme
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    /// Default background
    pub background: Color,
    /// Default text
    pub text: Color,
    /// De-emphasized text (timestamps, hints)
    pub dim: Color,
    /// Accent for the assistant and highlights
    pub accent: Color,
    /// User-authored content
    pub user: Color,
    /// Committed log entries and on-track progress
    pub positive: Color,
    /// Over-target and error states
    pub negative: Color,
    /// Pending proposals awaiting confirmation
    pub pending: Color,
}

impl Palette {
    /// Palette for the given theme preference
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                user: Color::Magenta,
                positive: Color::Green,
                negative: Color::Red,
                pending: Color::Yellow,
            },
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                user: Color::Magenta,
                positive: Color::Green,
                negative: Color::Red,
                pending: Color::Yellow,
            },
        }
    }
}
