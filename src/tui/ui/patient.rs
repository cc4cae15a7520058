//! Patient information form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::patient::{AGE_RANGE, BMI_RANGE, CHOLESTEROL_RANGE};
use crate::domain::{Category, PatientAttributes};
use crate::tui::styles::MedicalTheme;

/// Form fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Age,
    Gender,
    Country,
    CancerStage,
    FamilyHistory,
    SmokingStatus,
    Bmi,
    Cholesterol,
    Hypertension,
    Asthma,
    Cirrhosis,
    OtherCancer,
    TreatmentType,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        Self::Age,
        Self::Gender,
        Self::Country,
        Self::CancerStage,
        Self::FamilyHistory,
        Self::SmokingStatus,
        Self::Bmi,
        Self::Cholesterol,
        Self::Hypertension,
        Self::Asthma,
        Self::Cirrhosis,
        Self::OtherCancer,
        Self::TreatmentType,
    ];

    /// Fields shown in the left column; the rest go right.
    pub const LEFT_COLUMN: usize = 6;

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Country => "Country",
            Self::CancerStage => "Cancer Stage",
            Self::FamilyHistory => "Family History of Cancer",
            Self::SmokingStatus => "Smoking Status",
            Self::Bmi => "BMI",
            Self::Cholesterol => "Cholesterol Level",
            Self::Hypertension => "Hypertension",
            Self::Asthma => "Asthma",
            Self::Cirrhosis => "Cirrhosis",
            Self::OtherCancer => "Other Cancer History",
            Self::TreatmentType => "Treatment Type",
        }
    }

    /// Numeric fields accept typed input; the rest are selects.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Age | Self::Bmi | Self::Cholesterol)
    }

    fn hint(self) -> &'static str {
        match self {
            Self::Age => "years (10-100)",
            Self::Bmi => "kg/m² (10.0-60.0)",
            Self::Cholesterol => "mg/dL (100-400)",
            _ => "",
        }
    }
}

/// Patient form state
#[derive(Debug)]
pub struct PatientFormState {
    pub attributes: PatientAttributes,
    pub selected_field: usize,
    /// Typed but not yet committed value of the selected numeric field
    pub input: String,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self {
            attributes: PatientAttributes::default(),
            selected_field: 0,
            input: String::new(),
            error_message: None,
        }
    }
}

impl PatientFormState {
    #[must_use]
    pub fn current_field(&self) -> FormField {
        FormField::ALL[self.selected_field]
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.commit_input();
        self.selected_field = (self.selected_field + 1) % FormField::ALL.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        self.commit_input();
        if self.selected_field == 0 {
            self.selected_field = FormField::ALL.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Step the selected field forward (next option, or one unit up).
    pub fn increment(&mut self) {
        self.commit_input();
        self.step(true);
    }

    /// Step the selected field backward.
    pub fn decrement(&mut self) {
        self.commit_input();
        self.step(false);
    }

    fn step(&mut self, up: bool) {
        let field = self.current_field();
        let a = &mut self.attributes;
        match field {
            FormField::Age => {
                a.age = if up { a.age.saturating_add(1) } else { a.age.saturating_sub(1) };
                a.age = clamp_u32(a.age, &AGE_RANGE);
            }
            FormField::Bmi => {
                let delta = if up { 0.1 } else { -0.1 };
                a.bmi = clamp_bmi(round_tenth(a.bmi + delta));
            }
            FormField::Cholesterol => {
                a.cholesterol = if up {
                    a.cholesterol.saturating_add(1)
                } else {
                    a.cholesterol.saturating_sub(1)
                };
                a.cholesterol = clamp_u32(a.cholesterol, &CHOLESTEROL_RANGE);
            }
            FormField::Gender => a.gender = cycle(a.gender, up),
            FormField::Country => a.country = cycle(a.country, up),
            FormField::CancerStage => a.cancer_stage = cycle(a.cancer_stage, up),
            FormField::FamilyHistory => a.family_history = cycle(a.family_history, up),
            FormField::SmokingStatus => a.smoking_status = cycle(a.smoking_status, up),
            FormField::Hypertension => a.hypertension = cycle(a.hypertension, up),
            FormField::Asthma => a.asthma = cycle(a.asthma, up),
            FormField::Cirrhosis => a.cirrhosis = cycle(a.cirrhosis, up),
            FormField::OtherCancer => a.other_cancer = cycle(a.other_cancer, up),
            FormField::TreatmentType => a.treatment_type = cycle(a.treatment_type, up),
        }
        self.error_message = None;
    }

    /// Add a character to the typed input of a numeric field
    pub fn input_char(&mut self, c: char) {
        let field = self.current_field();
        if !field.is_numeric() {
            return;
        }
        let allowed = c.is_ascii_digit() || (c == '.' && field == FormField::Bmi && !self.input.contains('.'));
        if allowed && self.input.len() < 6 {
            self.input.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last typed character
    pub fn delete_char(&mut self) {
        self.input.pop();
    }

    /// Apply typed input to the selected numeric field, clamped to its range.
    ///
    /// Unparseable input is discarded and reported; the previous value stays.
    pub fn commit_input(&mut self) {
        self.error_message = None;
        if self.input.is_empty() {
            return;
        }
        let field = self.current_field();
        let a = &mut self.attributes;
        let parsed = match field {
            FormField::Age => self.input.parse::<u32>().map(|v| a.age = clamp_u32(v, &AGE_RANGE)).is_ok(),
            FormField::Cholesterol => self
                .input
                .parse::<u32>()
                .map(|v| a.cholesterol = clamp_u32(v, &CHOLESTEROL_RANGE))
                .is_ok(),
            FormField::Bmi => self
                .input
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| a.bmi = clamp_bmi(v))
                .is_some(),
            _ => true,
        };
        if !parsed {
            self.error_message = Some(format!("{}: Invalid number", field.label()));
        }
        self.input.zeroize();
    }

    /// Commit pending input and return the attributes to predict on.
    pub fn submit(&mut self) -> PatientAttributes {
        self.commit_input();
        self.attributes
    }

    /// Restore defaults and wipe the typed buffer.
    pub fn reset(&mut self) {
        self.input.zeroize();
        *self = Self::default();
    }

    /// Display value of a field.
    #[must_use]
    pub fn value_of(&self, field: FormField) -> String {
        let a = &self.attributes;
        match field {
            FormField::Age => a.age.to_string(),
            FormField::Gender => a.gender.to_string(),
            FormField::Country => a.country.to_string(),
            FormField::CancerStage => a.cancer_stage.to_string(),
            FormField::FamilyHistory => a.family_history.to_string(),
            FormField::SmokingStatus => a.smoking_status.to_string(),
            FormField::Bmi => format!("{:.2}", a.bmi),
            FormField::Cholesterol => a.cholesterol.to_string(),
            FormField::Hypertension => a.hypertension.to_string(),
            FormField::Asthma => a.asthma.to_string(),
            FormField::Cirrhosis => a.cirrhosis.to_string(),
            FormField::OtherCancer => a.other_cancer.to_string(),
            FormField::TreatmentType => a.treatment_type.to_string(),
        }
    }
}

fn cycle<T: Category>(value: T, up: bool) -> T {
    if up {
        value.next()
    } else {
        value.prev()
    }
}

fn clamp_u32(value: u32, range: &std::ops::RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn clamp_bmi(value: f64) -> f64 {
    value.clamp(*BMI_RANGE.start(), *BMI_RANGE.end())
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render the patient information form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Information", MedicalTheme::title()),
        Span::styled(
            " │ Provide the patient details to check their survival prediction",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let (left, right) = FormField::ALL.split_at(FormField::LEFT_COLUMN);
    render_field_column(f, columns[0], state, left, 0);
    render_field_column(f, columns[1], state, right, FormField::LEFT_COLUMN);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    fields: &[FormField],
    offset: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == state.selected_field;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        if is_selected && !state.input.is_empty() {
            spans.push(Span::styled(state.input.clone(), MedicalTheme::text()));
            spans.push(Span::styled("▌", MedicalTheme::focused()));
        } else if field.is_numeric() {
            spans.push(Span::styled(state.value_of(*field), MedicalTheme::text()));
            spans.push(Span::styled(format!("  {}", field.hint()), MedicalTheme::text_muted()));
        } else {
            let arrow_style = if is_selected {
                MedicalTheme::key_hint()
            } else {
                MedicalTheme::text_muted()
            };
            spans.push(Span::styled("◀ ", arrow_style));
            spans.push(Span::styled(state.value_of(*field), MedicalTheme::text()));
            spans.push(Span::styled(" ▶", arrow_style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change ", MedicalTheme::key_desc()),
            Span::styled("[0-9] ", MedicalTheme::key_hint()),
            Span::styled("Type value ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict Survival ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset", MedicalTheme::key_desc()),
        ])
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
    use crate::domain::{CancerStage, Country, TreatmentType, YesNo};

    fn select(state: &mut PatientFormState, field: FormField) {
        state.selected_field = FormField::ALL
            .iter()
            .position(|f| *f == field)
            .expect("field exists");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = PatientFormState::default();
        state.prev_field();
        assert_eq!(state.current_field(), FormField::TreatmentType);
        state.next_field();
        assert_eq!(state.current_field(), FormField::Age);
    }

    #[test]
    fn test_select_cycles_options() {
        let mut state = PatientFormState::default();
        select(&mut state, FormField::Country);
        state.increment();
        assert_eq!(state.attributes.country, Country::Usa);
        state.decrement();
        state.decrement();
        assert_eq!(state.attributes.country, Country::Other);

        select(&mut state, FormField::CancerStage);
        state.decrement();
        assert_eq!(state.attributes.cancer_stage, CancerStage::StageIV);

        select(&mut state, FormField::Cirrhosis);
        state.increment();
        assert_eq!(state.attributes.cirrhosis, YesNo::No);

        select(&mut state, FormField::TreatmentType);
        state.increment();
        assert_eq!(state.attributes.treatment_type, TreatmentType::Chemotherapy);
    }

    #[test]
    fn test_slider_clamps_at_bounds() {
        let mut state = PatientFormState::default();
        state.attributes.age = 100;
        state.increment();
        assert_eq!(state.attributes.age, 100);

        state.attributes.age = 10;
        state.decrement();
        assert_eq!(state.attributes.age, 10);
    }

    #[test]
    fn test_bmi_steps_by_tenth() {
        let mut state = PatientFormState::default();
        select(&mut state, FormField::Bmi);
        state.increment();
        state.increment();
        assert!((state.attributes.bmi - 22.2).abs() < 1e-9);
    }

    #[test]
    fn test_typed_values_are_clamped_on_commit() {
        let mut state = PatientFormState::default();
        select(&mut state, FormField::Cholesterol);
        for c in "999".chars() {
            state.input_char(c);
        }
        state.next_field();
        assert_eq!(state.attributes.cholesterol, 400);
        assert!(state.input.is_empty());

        select(&mut state, FormField::Bmi);
        for c in "7.5".chars() {
            state.input_char(c);
        }
        let attrs = state.submit();
        assert!((attrs.bmi - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_typing_ignored_on_select_fields() {
        let mut state = PatientFormState::default();
        select(&mut state, FormField::Gender);
        state.input_char('5');
        assert!(state.input.is_empty());
    }

    #[test]
    fn test_second_decimal_point_ignored() {
        let mut state = PatientFormState::default();
        select(&mut state, FormField::Bmi);
        for c in "2.5.1".chars() {
            state.input_char(c);
        }
        assert_eq!(state.input, "2.51");
    }

    #[test]
    fn test_invalid_number_error_cleared_on_next_commit() {
        let mut state = PatientFormState::default();
        select(&mut state, FormField::Bmi);
        state.input_char('.');
        state.next_field();
        assert!(state.error_message.is_some());
        assert!((state.attributes.bmi - 22.0).abs() < f64::EPSILON);

        state.next_field();
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = PatientFormState::default();
        state.attributes.age = 85;
        state.input.push_str("12");
        state.reset();
        assert_eq!(state.attributes, PatientAttributes::default());
        assert!(state.input.is_empty());
        assert_eq!(state.selected_field, 0);
    }
}
