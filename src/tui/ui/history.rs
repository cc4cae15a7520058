//! Prediction history view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::application::SessionHistory;
use crate::domain::PredictionRecord;
use crate::tui::styles::MedicalTheme;

/// Transient feedback shown under the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// History view state
#[derive(Debug, Default)]
pub struct HistoryState {
    /// Rows skipped from the top of the newest-first list
    pub scroll: usize,
    pub status: Option<StatusMessage>,
}

impl HistoryState {
    pub fn scroll_down(&mut self, total: usize) {
        if self.scroll + 1 < total {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

/// Render the history table
pub fn render_history(f: &mut Frame, area: Rect, state: &HistoryState, history: &SessionHistory) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_history_header(f, chunks[0], history);
    render_history_table(f, chunks[1], state, history);
    render_status(f, chunks[2], state);
    render_history_footer(f, chunks[3]);
}

fn render_history_header(f: &mut Frame, area: Rect, history: &SessionHistory) {
    let summary = history.summary();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction History", MedicalTheme::title()),
        Span::styled(
            format!(" │ {} predictions ", summary.total),
            MedicalTheme::text_secondary(),
        ),
        Span::styled(format!("{} survived", summary.survived), MedicalTheme::success()),
        Span::styled(" · ", MedicalTheme::text_muted()),
        Span::styled(
            format!("{} not survived", summary.not_survived),
            MedicalTheme::danger(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn record_row(record: &PredictionRecord) -> Row<'static> {
    let outcome_style = MedicalTheme::outcome(record.prediction);
    let cells = record.cells();
    let last = cells.len() - 1;
    Row::new(cells.into_iter().enumerate().map(|(i, text)| {
        // Prediction and confidence columns carry the outcome color.
        if i + 1 >= last {
            Cell::from(text).style(outcome_style)
        } else {
            Cell::from(text).style(MedicalTheme::text())
        }
    }))
}

fn render_history_table(f: &mut Frame, area: Rect, state: &HistoryState, history: &SessionHistory) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No predictions yet. Fill the form on the Predict tab and press Enter.",
            MedicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(PredictionRecord::HEADERS.iter().map(|h| Cell::from(*h)))
        .style(MedicalTheme::table_header());

    let rows: Vec<Row> = history
        .list_descending()
        .skip(state.scroll)
        .map(record_row)
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Min(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);

    f.render_widget(table, area);
}

fn render_status(f: &mut Frame, area: Rect, state: &HistoryState) {
    let line = match &state.status {
        Some(StatusMessage::Info(msg)) => Line::from(Span::styled(format!(" {msg}"), MedicalTheme::success())),
        Some(StatusMessage::Error(msg)) => {
            Line::from(Span::styled(format!(" ! {msg}"), MedicalTheme::danger()))
        }
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_history_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Scroll ", MedicalTheme::key_desc()),
        Span::styled("[E] ", MedicalTheme::key_hint()),
        Span::styled("Export CSV ", MedicalTheme::key_desc()),
        Span::styled("[C] ", MedicalTheme::key_hint()),
        Span::styled("Clear History ", MedicalTheme::key_desc()),
        Span::styled("[Tab] ", MedicalTheme::key_hint()),
        Span::styled("Predict ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);

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
    fn test_scroll_stays_in_bounds() {
        let mut state = HistoryState::default();
        state.scroll_up();
        assert_eq!(state.scroll, 0);

        state.scroll_down(3);
        state.scroll_down(3);
        state.scroll_down(3);
        assert_eq!(state.scroll, 2);

        state.scroll_down(0);
        assert_eq!(state.scroll, 2);
    }
}
