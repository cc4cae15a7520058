//! Prediction service: Orchestrates survival prediction.
//!
//! This service coordinates:
//! - Feature encoding
//! - Scaling with the fitted scaler
//! - Classification and confidence extraction
//! - Appending the result to the session history

use crate::application::SessionHistory;
use crate::domain::{encode, FeatureVector, PatientAttributes, Prediction, PredictionRecord, SurvivalOutcome};
use crate::ports::{Classifier, FeatureScaler, ServiceError};
use crate::LungsurvError;

/// Service for running survival predictions against the loaded artifacts.
///
/// Calls are blocking and never retried.
pub struct PredictionService<S, C>
where
    S: FeatureScaler,
    C: Classifier,
{
    scaler: S,
    classifier: C,
}

impl<S, C> PredictionService<S, C>
where
    S: FeatureScaler,
    C: Classifier,
{
    /// Create a new prediction service.
    ///
    /// # Errors
    /// Returns `LungsurvError::ShapeMismatch` if the scaler and classifier
    /// disagree with the encoder on the feature count, or the classifier is
    /// not binary.
    pub fn new(scaler: S, classifier: C) -> Result<Self, LungsurvError> {
        let service = Self { scaler, classifier };
        service.check_contract(crate::domain::FEATURE_COUNT)?;
        tracing::info!("Prediction service ready");
        Ok(service)
    }

    fn check_contract(&self, n: usize) -> Result<(), LungsurvError> {
        if self.scaler.n_features() != n {
            return Err(ServiceError::FeatureCount {
                expected: self.scaler.n_features(),
                actual: n,
            }
            .into());
        }
        if self.classifier.n_features() != n {
            return Err(ServiceError::FeatureCount {
                expected: self.classifier.n_features(),
                actual: n,
            }
            .into());
        }
        if self.classifier.classes().len() != 2 {
            return Err(ServiceError::NotBinary(format!(
                "{} classes declared",
                self.classifier.classes().len()
            ))
            .into());
        }
        Ok(())
    }

    /// Run the scaler and classifier on an encoded vector.
    ///
    /// Confidence is the probability of the predicted class, in percent.
    ///
    /// # Errors
    /// Returns `LungsurvError::ShapeMismatch` if any stage of the model
    /// returns output that does not fit the binary contract.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, LungsurvError> {
        self.check_contract(features.len())?;

        tracing::debug!("Step 1: Scaling {} features...", features.len());
        let scaled = self.scaler.transform(features.as_slice())?;
        if scaled.len() != features.len() {
            return Err(ServiceError::FeatureCount {
                expected: features.len(),
                actual: scaled.len(),
            }
            .into());
        }

        tracing::debug!("Step 2: Classifying...");
        let class = self.classifier.predict(&scaled)?;
        let proba = self.classifier.predict_proba(&scaled)?;

        if proba.len() != 2 {
            return Err(ServiceError::NotBinary(format!(
                "{} probabilities returned",
                proba.len()
            ))
            .into());
        }
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(ServiceError::NonFinite("class probabilities").into());
        }
        let outcome = SurvivalOutcome::from_class(class).ok_or_else(|| {
            LungsurvError::from(ServiceError::NotBinary(format!(
                "predicted class index {class}"
            )))
        })?;

        Ok(Prediction::new(outcome, proba[class]))
    }

    /// Encode, predict and record one request.
    ///
    /// The record is appended only when every step succeeds.
    ///
    /// # Errors
    /// Returns error if prediction fails; `history` is left untouched.
    pub fn run(
        &self,
        attrs: &PatientAttributes,
        history: &mut SessionHistory,
    ) -> Result<PredictionRecord, LungsurvError> {
        tracing::info!("Starting prediction pipeline...");

        let features = encode(attrs);
        let prediction = match self.predict(&features) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                return Err(e);
            }
        };

        let record = PredictionRecord::new(attrs, &prediction);
        history.append(record.clone());

        tracing::info!(
            "Prediction complete: outcome={}, confidence={:.2}%",
            prediction.outcome,
            prediction.confidence
        );

        Ok(record)
    }
}
