//! Main TUI application state machine.
//!
//! Handles:
//! - Tab navigation
//! - Input event handling
//! - Service integration
//! - The cosmetic progress bar that precedes each prediction

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::artifacts::{LogisticRegression, ModelArtifacts, StandardScaler};
use crate::adapters::export;
use crate::application::{PredictionService, SessionHistory};
use crate::config::AppConfig;
use crate::domain::PatientAttributes;

use super::ui::{
    history::{render_history, HistoryState, StatusMessage},
    patient::{render_patient_form, PatientFormState},
    prediction::{render_prediction, PredictState},
    render_disclaimer, render_tabs,
};

/// Prediction service over the artifacts loaded from disk.
pub type ArtifactService = PredictionService<StandardScaler, LogisticRegression>;

/// Top-level tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Predict,
    History,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Self::Predict => 0,
            Self::History => 1,
        }
    }

    fn toggle(self) -> Self {
        match self {
            Self::Predict => Self::History,
            Self::History => Self::Predict,
        }
    }
}

/// A submitted form waiting for the progress bar to fill.
#[derive(Debug)]
struct PendingPrediction {
    attributes: PatientAttributes,
    started_at: Instant,
}

/// Main application state
pub struct App {
    config: AppConfig,

    /// Whether the app should quit
    should_quit: bool,

    tab: Tab,

    service: ArtifactService,

    /// Predictions made this session
    history: SessionHistory,

    /// Patient form state
    form_state: PatientFormState,

    /// Progress or result shown on the Predict tab
    predict_state: PredictState,

    /// History tab state
    history_state: HistoryState,

    pending: Option<PendingPrediction>,
}

impl App {
    /// Create a new application instance, loading the model artifacts named
    /// by the configuration.
    ///
    /// # Errors
    /// Returns error if the artifacts cannot be loaded or do not fit the
    /// encoder.
    pub fn new(config: AppConfig) -> Result<Self> {
        let artifacts = ModelArtifacts::load(&config.model_dir).with_context(|| {
            format!(
                "Failed to load model artifacts from {:?}. Set LUNGSURV_MODEL_PATH to a directory containing scaler.json and model.json.",
                config.model_dir
            )
        })?;
        let service = PredictionService::new(artifacts.scaler, artifacts.classifier)?;

        Ok(Self::with_dependencies(service, config))
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(service: ArtifactService, config: AppConfig) -> Self {
        Self {
            config,
            should_quit: false,
            tab: Tab::Predict,
            service,
            history: SessionHistory::new(),
            form_state: PatientFormState::default(),
            predict_state: PredictState::Idle,
            history_state: HistoryState::default(),
            pending: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.tick_progress(Instant::now());

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(0),
                        Constraint::Length(3),
                    ])
                    .split(f.area());

                render_tabs(f, chunks[0], self.tab.index());

                match self.tab {
                    Tab::Predict if self.predict_state.is_running()
                        || self.predict_state.shows_outcome() =>
                    {
                        render_prediction(f, chunks[1], &self.predict_state)
                    }
                    Tab::Predict => render_patient_form(f, chunks[1], &self.form_state),
                    Tab::History => {
                        render_history(f, chunks[1], &self.history_state, &self.history)
                    }
                }

                render_disclaimer(f, chunks[2]);
            })?;

            // Handle input (short poll to keep the progress bar moving)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Advance the progress bar and run the prediction once it is full.
    fn tick_progress(&mut self, now: Instant) {
        let Some(pending) = &self.pending else {
            return;
        };

        let elapsed = now.saturating_duration_since(pending.started_at);
        let total = self.config.progress_duration;
        if elapsed >= total {
            if let Some(pending) = self.pending.take() {
                self.finish_prediction(&pending.attributes);
            }
            return;
        }

        let progress = elapsed.as_secs_f64() / total.as_secs_f64();
        self.predict_state = PredictState::Running { progress };
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling (q, Ctrl-Q, Ctrl-C)
        let ctrl_c = key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
        if ctrl_c || matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
            self.should_quit = true;
            return;
        }

        // Input is ignored while a prediction runs
        if self.pending.is_some() {
            return;
        }

        match key {
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.toggle();
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Predict if self.predict_state.shows_outcome() => self.handle_result_key(key),
            Tab::Predict => self.handle_form_key(key),
            Tab::History => self.handle_history_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.form_state.prev_field(),
            KeyCode::Down => self.form_state.next_field(),
            KeyCode::Left => self.form_state.decrement(),
            KeyCode::Right => self.form_state.increment(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.form_state.reset(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc) {
            self.predict_state = PredictState::Idle;
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.history_state.scroll_up(),
            KeyCode::Down => self.history_state.scroll_down(self.history.len()),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_history(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.history.clear();
                self.history_state.scroll = 0;
                self.history_state.status = Some(StatusMessage::Info("History cleared!".to_string()));
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let attributes = self.form_state.submit();
        if self.form_state.error_message.is_some() {
            return;
        }

        if self.config.progress_duration.is_zero() {
            self.finish_prediction(&attributes);
            return;
        }

        self.predict_state = PredictState::Running { progress: 0.0 };
        self.pending = Some(PendingPrediction {
            attributes,
            started_at: Instant::now(),
        });
    }

    fn finish_prediction(&mut self, attributes: &PatientAttributes) {
        self.predict_state = match self.service.run(attributes, &mut self.history) {
            Ok(record) => {
                self.history_state.scroll = 0;
                PredictState::Complete { record }
            }
            Err(e) => PredictState::Error {
                message: e.user_message(),
            },
        };
    }

    fn export_history(&mut self) {
        let written = self
            .history
            .export_csv()
            .and_then(|bytes| export::write_export(&self.config.export_dir, &bytes));

        self.history_state.status = Some(match written {
            Ok(path) => StatusMessage::Info(format!(
                "Exported {} predictions to {}",
                self.history.len(),
                path.display()
            )),
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                StatusMessage::Error(e.user_message())
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::tests::{identity_scaler, stage_model};
    use crate::domain::{CancerStage, SurvivalOutcome};
    use tempfile::tempdir;

    fn app_with(export_dir: &std::path::Path, progress: Duration) -> App {
        let service =
            PredictionService::new(identity_scaler(), stage_model(-1.5, 2.0)).expect("service");
        let config = AppConfig {
            export_dir: export_dir.to_path_buf(),
            progress_duration: progress,
            ..AppConfig::default()
        };
        App::with_dependencies(service, config)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_enter_predicts_and_records() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_with(temp.path(), Duration::ZERO);

        press(&mut app, KeyCode::Enter);

        match &app.predict_state {
            PredictState::Complete { record } => {
                assert_eq!(record.prediction, SurvivalOutcome::Survived);
                assert_eq!(record.confidence, "88.08");
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(app.history.len(), 1);

        // Back to the form, values kept
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.predict_state, PredictState::Idle));
        assert_eq!(app.form_state.attributes, PatientAttributes::default());
    }

    #[test]
    fn test_progress_runs_before_prediction() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_with(temp.path(), Duration::from_millis(1000));

        press(&mut app, KeyCode::Enter);
        assert!(app.predict_state.is_running());
        assert!(app.history.is_empty());

        let started = app.pending.as_ref().expect("pending").started_at;

        // Keys other than quit are ignored while running
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Predict);

        app.tick_progress(started + Duration::from_millis(500));
        match app.predict_state {
            PredictState::Running { progress } => assert!((progress - 0.5).abs() < 1e-9),
            ref other => panic!("unexpected state {other:?}"),
        }

        app.tick_progress(started + Duration::from_millis(1000));
        assert!(matches!(app.predict_state, PredictState::Complete { .. }));
        assert!(app.pending.is_none());
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_form_edits_flow_into_record() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_with(temp.path(), Duration::ZERO);

        // Age: type 45
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('5'));
        // Down to Cancer Stage, then three steps right to Stage IV
        for _ in 0..3 {
            press(&mut app, KeyCode::Down);
        }
        for _ in 0..3 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Enter);

        let newest = app.history.list_descending().next().expect("record");
        assert_eq!(newest.age, 45);
        assert_eq!(newest.stage, CancerStage::StageIV);
        assert_eq!(newest.prediction, SurvivalOutcome::NotSurvived);
    }

    #[test]
    fn test_invalid_number_does_not_block_later_predictions() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_with(temp.path(), Duration::ZERO);

        // Down to BMI, type an unparseable value, leave the field
        for _ in 0..6 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Char('.'));
        press(&mut app, KeyCode::Down);
        assert!(app.form_state.error_message.is_some());

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.predict_state, PredictState::Complete { .. }));
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_history_export_and_clear() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_with(temp.path(), Duration::ZERO);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.history.len(), 2);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::History);

        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.history_state.status, Some(StatusMessage::Info(_))));
        let bytes = std::fs::read(temp.path().join(export::EXPORT_FILE_NAME)).expect("export file");
        assert_eq!(export::decode_csv(&bytes).expect("parse").len(), 2);

        press(&mut app, KeyCode::Char('c'));
        assert!(app.history.is_empty());
        assert_eq!(
            app.history_state.status,
            Some(StatusMessage::Info("History cleared!".to_string()))
        );
    }

    #[test]
    fn test_export_error_reported_in_status() {
        let temp = tempdir().expect("tempdir");
        // A file where the export directory should be
        let blocker = temp.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").expect("write");
        let mut app = app_with(&blocker, Duration::ZERO);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.history_state.status, Some(StatusMessage::Error(_))));
    }

    #[test]
    fn test_quit_keys() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_with(temp.path(), Duration::ZERO);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = app_with(temp.path(), Duration::ZERO);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        // Ctrl-C quits even on the History tab where 'c' clears
        let mut app = app_with(temp.path(), Duration::ZERO);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Tab);
        app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_new_fails_without_artifacts() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig {
            model_dir: temp.path().join("missing"),
            ..AppConfig::default()
        };
        assert!(App::new(config).is_err());
    }
}
