//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! Categorical attributes are closed enums so invalid options cannot be built.

pub mod encoder;
pub mod patient;
mod prediction;

pub use encoder::{encode, encode_labels, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use patient::{
    CancerStage, Category, Country, Gender, PatientAttributes, RawPatientInput, SmokingStatus,
    TreatmentType, YesNo,
};
pub use prediction::{Prediction, PredictionRecord, SurvivalOutcome};
