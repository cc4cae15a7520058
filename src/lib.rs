//! # Lungsurv
//!
//! Lung cancer survival prediction from a terminal form.
//!
//! This crate provides:
//! - Deterministic encoding of patient attributes into the 13-feature vector
//!   expected by an externally trained scaler and classifier
//! - A prediction service that invokes those artifacts behind narrow traits
//! - A session-scoped prediction history with CSV export
//! - Terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (patient attributes, encoder, records)
//! - `ports`: Trait definitions for the scaler and classifier
//! - `adapters`: Concrete implementations (JSON artifacts, CSV export, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureVector, PatientAttributes, Prediction, PredictionRecord, SurvivalOutcome};

/// Result type for Lungsurv operations
pub type Result<T> = std::result::Result<T, LungsurvError>;

/// Main error type for Lungsurv
#[derive(Debug, thiserror::Error)]
pub enum LungsurvError {
    #[error("Invalid value {value:?} for {field}")]
    InvalidCategory { field: &'static str, value: String },

    #[error("Prediction service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Feature shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ports::ServiceError> for LungsurvError {
    fn from(err: ports::ServiceError) -> Self {
        match err {
            ports::ServiceError::Unavailable(msg) => Self::ServiceUnavailable(msg),
            other => Self::ShapeMismatch(other.to_string()),
        }
    }
}

impl LungsurvError {
    /// Message safe to show in the UI.
    ///
    /// Contract violations between the encoder and the artifacts are reported
    /// generically; the details stay in the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ShapeMismatch(_) => {
                "Prediction failed: the model rejected the input. See the log for details.".to_string()
            }
            other => other.to_string(),
        }
    }
}
