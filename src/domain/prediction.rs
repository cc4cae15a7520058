//! Prediction result types.
//!
//! Represents the classifier output and the record kept in the session history.

use serde::{Deserialize, Serialize};

use super::patient::{CancerStage, Country, Gender, PatientAttributes, SmokingStatus, TreatmentType};

/// Binary survival outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurvivalOutcome {
    /// Class 1
    Survived,
    /// Class 0
    #[serde(rename = "Not Survived")]
    NotSurvived,
}

impl SurvivalOutcome {
    /// Map a classifier class index. Only 0 and 1 are meaningful.
    #[must_use]
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(Self::NotSurvived),
            1 => Some(Self::Survived),
            _ => None,
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Survived => "The patient is likely to SURVIVE.",
            Self::NotSurvived => "The patient is unlikely to survive.",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Survived => (16, 185, 129),   // Emerald (#10B981)
            Self::NotSurvived => (244, 63, 94), // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for SurvivalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Survived => write!(f, "Survived"),
            Self::NotSurvived => write!(f, "Not Survived"),
        }
    }
}

/// Result of one model invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub outcome: SurvivalOutcome,

    /// Probability of the predicted class, in percent (0.0 to 100.0)
    pub confidence: f64,
}

impl Prediction {
    #[must_use]
    pub fn new(outcome: SurvivalOutcome, probability: f64) -> Self {
        Self {
            outcome,
            confidence: probability * 100.0,
        }
    }

    /// Confidence with two decimals, as shown and exported.
    #[must_use]
    pub fn confidence_display(&self) -> String {
        format!("{:.2}", self.confidence)
    }
}

/// One row of the session history.
///
/// Field names are the CSV column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "Age")]
    pub age: u32,

    #[serde(rename = "Gender")]
    pub gender: Gender,

    #[serde(rename = "Country")]
    pub country: Country,

    #[serde(rename = "Stage")]
    pub stage: CancerStage,

    #[serde(rename = "Smoking")]
    pub smoking: SmokingStatus,

    #[serde(rename = "Treatment")]
    pub treatment: TreatmentType,

    #[serde(rename = "Prediction")]
    pub prediction: SurvivalOutcome,

    /// Two-decimal percentage string
    #[serde(rename = "Confidence (%)")]
    pub confidence: String,
}

impl PredictionRecord {
    /// Column headers in export order.
    pub const HEADERS: [&'static str; 8] = [
        "Age",
        "Gender",
        "Country",
        "Stage",
        "Smoking",
        "Treatment",
        "Prediction",
        "Confidence (%)",
    ];

    /// Build the history record for a completed prediction.
    #[must_use]
    pub fn new(attrs: &PatientAttributes, prediction: &Prediction) -> Self {
        Self {
            age: attrs.age,
            gender: attrs.gender,
            country: attrs.country,
            stage: attrs.cancer_stage,
            smoking: attrs.smoking_status,
            treatment: attrs.treatment_type,
            prediction: prediction.outcome,
            confidence: prediction.confidence_display(),
        }
    }

    /// Cell values in column order, for table rendering.
    #[must_use]
    pub fn cells(&self) -> [String; 8] {
        [
            self.age.to_string(),
            self.gender.to_string(),
            self.country.to_string(),
            self.stage.to_string(),
            self.smoking.to_string(),
            self.treatment.to_string(),
            self.prediction.to_string(),
            self.confidence.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_class() {
        assert_eq!(SurvivalOutcome::from_class(1), Some(SurvivalOutcome::Survived));
        assert_eq!(SurvivalOutcome::from_class(0), Some(SurvivalOutcome::NotSurvived));
        assert_eq!(SurvivalOutcome::from_class(2), None);
    }

    #[test]
    fn test_confidence_is_percent_with_two_decimals() {
        let prediction = Prediction::new(SurvivalOutcome::Survived, 0.87654);
        assert!((prediction.confidence - 87.654).abs() < 1e-9);
        assert_eq!(prediction.confidence_display(), "87.65");

        let certain = Prediction::new(SurvivalOutcome::NotSurvived, 1.0);
        assert_eq!(certain.confidence_display(), "100.00");
    }

    #[test]
    fn test_record_from_attributes() {
        let attrs = PatientAttributes {
            age: 72,
            cancer_stage: CancerStage::StageIV,
            smoking_status: SmokingStatus::CurrentSmoker,
            ..PatientAttributes::default()
        };
        let prediction = Prediction::new(SurvivalOutcome::NotSurvived, 0.5);
        let record = PredictionRecord::new(&attrs, &prediction);

        assert_eq!(record.age, 72);
        assert_eq!(record.stage, CancerStage::StageIV);
        assert_eq!(record.prediction, SurvivalOutcome::NotSurvived);
        assert_eq!(record.confidence, "50.00");
        assert_eq!(record.cells()[6], "Not Survived");
        assert_eq!(record.cells()[3], "Stage IV");
    }

    #[test]
    fn test_outcome_serializes_with_space() {
        let json = serde_json::to_string(&SurvivalOutcome::NotSurvived).expect("serialize");
        assert_eq!(json, "\"Not Survived\"");
    }
}
