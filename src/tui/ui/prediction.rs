//! Prediction progress and result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{PredictionRecord, SurvivalOutcome};
use crate::tui::styles::MedicalTheme;

/// Prediction state
#[derive(Debug, Clone, Default)]
pub enum PredictState {
    /// Form is being edited
    #[default]
    Idle,
    /// Cosmetic progress before the model runs (0.0 to 1.0)
    Running { progress: f64 },
    /// Completed with result
    Complete { record: PredictionRecord },
    /// Error occurred
    Error { message: String },
}

impl PredictState {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Whether the result or error panel replaces the form.
    #[must_use]
    pub fn shows_outcome(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Convert a 0..1 fraction to a gauge percent, clamped to 0..=100.
#[must_use]
pub fn gauge_percent(fraction: f64) -> u16 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u16
}

/// Render the progress bar or the result panel
pub fn render_prediction(f: &mut Frame, area: Rect, state: &PredictState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_prediction_header(f, chunks[0]);
    match state {
        PredictState::Idle => {}
        PredictState::Running { progress } => render_progress(f, chunks[1], *progress),
        PredictState::Complete { record } => render_result(f, chunks[1], record),
        PredictState::Error { message } => render_error(f, chunks[1], message),
    }
    render_prediction_footer(f, chunks[2], state);
}

fn render_prediction_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Survival Prediction", MedicalTheme::title()),
        Span::styled(" │ Lung cancer patient outcome", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, area: Rect, progress: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(area);

    let label = Paragraph::new(Line::from(Span::styled(
        "Predicting survival...",
        MedicalTheme::focused(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(label, chunks[0]);

    let percent = gauge_percent(progress);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::info())
        .percent(percent)
        .label(format!("{percent}%"));
    f.render_widget(gauge, chunks[1]);
}

fn render_result(f: &mut Frame, area: Rect, record: &PredictionRecord) {
    let block = Block::default()
        .title(Span::styled(" Prediction Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Outcome
            Constraint::Length(4), // Confidence
            Constraint::Length(4), // Inputs recap
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let style = MedicalTheme::outcome(record.prediction);
    let icon = match record.prediction {
        SurvivalOutcome::Survived => "OK",
        SurvivalOutcome::NotSurvived => "!",
    };

    let outcome = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} {}", icon, record.prediction),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            record.prediction.description(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(outcome, chunks[0]);

    // Unparseable confidence only affects the bar, never the label.
    let fraction = record.confidence.parse::<f64>().unwrap_or(0.0) / 100.0;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Confidence ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(style)
        .percent(gauge_percent(fraction))
        .label(format!("{}%", record.confidence));
    f.render_widget(gauge, chunks[1]);

    let recap = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Age: ", MedicalTheme::text_secondary()),
            Span::styled(record.age.to_string(), MedicalTheme::text()),
            Span::styled("  Gender: ", MedicalTheme::text_secondary()),
            Span::styled(record.gender.to_string(), MedicalTheme::text()),
            Span::styled("  Country: ", MedicalTheme::text_secondary()),
            Span::styled(record.country.to_string(), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("Stage: ", MedicalTheme::text_secondary()),
            Span::styled(record.stage.to_string(), MedicalTheme::text()),
            Span::styled("  Smoking: ", MedicalTheme::text_secondary()),
            Span::styled(record.smoking.to_string(), MedicalTheme::text()),
            Span::styled("  Treatment: ", MedicalTheme::text_secondary()),
            Span::styled(record.treatment.to_string(), MedicalTheme::text()),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(recap, chunks[2]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_prediction_footer(f: &mut Frame, area: Rect, state: &PredictState) {
    let content = match state {
        PredictState::Complete { .. } | PredictState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Tab] ", MedicalTheme::key_hint()),
            Span::styled("History", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![Span::styled(
            "Processing...",
            MedicalTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_percent_clamped() {
        assert_eq!(gauge_percent(0.0), 0);
        assert_eq!(gauge_percent(0.5), 50);
        assert_eq!(gauge_percent(1.0), 100);
        assert_eq!(gauge_percent(1.7), 100);
        assert_eq!(gauge_percent(-0.2), 0);
        assert_eq!(gauge_percent(f64::NAN), 0);
    }

    #[test]
    fn test_state_flags() {
        assert!(PredictState::Running { progress: 0.3 }.is_running());
        assert!(!PredictState::Idle.shows_outcome());
        assert!(PredictState::Error {
            message: "x".to_string()
        }
        .shows_outcome());
    }
}
