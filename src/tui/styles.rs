//! Medical-themed color palette and styles.
//!
//! Teal accents on slate text, with the outcome colors taken from
//! `SurvivalOutcome::color` so the table and result panel agree.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::SurvivalOutcome;

/// Medical theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Deep teal, primary accent
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Lighter teal for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Darker teal behind the active tab
    pub const PRIMARY_DARK: Color = Color::Rgb(15, 118, 110); // #0F766E

    /// Light slate for borders
    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Table header background
    pub const BG_SURFACE: Color = Color::Rgb(30, 41, 59); // #1E293B

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Panel titles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Progress bar while a prediction runs
    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Focused form field title
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Foreground for a survival outcome label or gauge.
    #[must_use]
    pub fn outcome(outcome: SurvivalOutcome) -> Style {
        let (r, g, b) = outcome.color();
        Style::default().fg(Color::Rgb(r, g, b))
    }

    #[must_use]
    pub fn tab_active() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn table_header() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .bg(Self::BG_SURFACE)
            .add_modifier(Modifier::BOLD)
    }
}
