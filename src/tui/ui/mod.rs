//! UI module: View components for the TUI.

pub mod history;
pub mod patient;
pub mod prediction;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::tui::styles::MedicalTheme;

/// Top-level tab titles, in display order.
pub const TAB_TITLES: [&str; 2] = ["Predict", "History"];

pub fn render_tabs(f: &mut Frame, area: Rect, selected: usize) {
    let titles = TAB_TITLES
        .iter()
        .map(|t| Line::from(Span::raw(format!(" {t} "))));

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(Span::styled(" Lung Cancer Survival Prediction ", MedicalTheme::title()))
                .borders(Borders::BOTTOM)
                .border_style(MedicalTheme::border()),
        )
        .style(MedicalTheme::text_secondary())
        .highlight_style(MedicalTheme::tab_active())
        .select(selected)
        .divider(Span::styled("│", MedicalTheme::text_muted()));

    f.render_widget(tabs, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Predictions are statistical estimates and do not replace professional medical evaluation.",
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Nothing entered here is stored beyond this session.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
