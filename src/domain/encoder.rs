//! Feature encoding: patient attributes to the model's input vector.

use serde::{Deserialize, Serialize};

use super::patient::{Category, PatientAttributes, RawPatientInput};
use crate::LungsurvError;

/// Number of features expected by the scaler and classifier.
pub const FEATURE_COUNT: usize = 13;

/// Feature names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "gender",
    "country",
    "cancer_stage",
    "family_history",
    "smoking_status",
    "bmi",
    "cholesterol_level",
    "hypertension",
    "asthma",
    "cirrhosis",
    "other_cancer",
    "treatment_type",
];

/// Fixed-order numeric encoding of one patient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        FEATURE_COUNT
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

/// Encode typed attributes.
///
/// Order: age, gender, country, stage, family history, smoking, bmi,
/// cholesterol, hypertension, asthma, cirrhosis, other cancer, treatment.
#[must_use]
pub fn encode(attrs: &PatientAttributes) -> FeatureVector {
    FeatureVector([
        f64::from(attrs.age),
        f64::from(attrs.gender.code()),
        f64::from(attrs.country.code()),
        f64::from(attrs.cancer_stage.code()),
        f64::from(attrs.family_history.code()),
        f64::from(attrs.smoking_status.code()),
        attrs.bmi,
        f64::from(attrs.cholesterol),
        f64::from(attrs.hypertension.code()),
        f64::from(attrs.asthma.code()),
        f64::from(attrs.cirrhosis.code()),
        f64::from(attrs.other_cancer.code()),
        f64::from(attrs.treatment_type.code()),
    ])
}

/// Encode labelled attributes.
///
/// # Errors
/// Returns `LungsurvError::InvalidCategory` if any label is outside its option set.
pub fn encode_labels(raw: &RawPatientInput) -> Result<FeatureVector, LungsurvError> {
    PatientAttributes::from_labels(raw).map(|attrs| encode(&attrs))
}
