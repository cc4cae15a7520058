//! Model ports: Traits for the pre-trained scaler and classifier.
//!
//! These traits abstract the trained artifacts from the application logic so
//! the prediction flow can run against stubs in tests.

/// Errors reported by a scaler or classifier implementation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unavailable(String),

    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model is not a binary classifier: {0}")]
    NotBinary(String),

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// A fitted feature transformation applied before prediction.
pub trait FeatureScaler {
    /// Number of features the scaler was fitted on.
    fn n_features(&self) -> usize;

    /// Scale a raw feature vector.
    ///
    /// # Errors
    /// Returns `ServiceError::FeatureCount` if `features` has the wrong length.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ServiceError>;
}

/// A trained classifier.
pub trait Classifier {
    /// Number of features the classifier expects.
    fn n_features(&self) -> usize;

    /// Class labels, indexed like the `predict_proba` output.
    fn classes(&self) -> &[i64];

    /// Predict the class index for a scaled vector.
    ///
    /// # Errors
    /// Returns error if the vector does not fit the model.
    fn predict(&self, scaled: &[f64]) -> Result<usize, ServiceError>;

    /// Probability for each class, in `classes()` order.
    ///
    /// # Errors
    /// Returns error if the vector does not fit the model.
    fn predict_proba(&self, scaled: &[f64]) -> Result<Vec<f64>, ServiceError>;
}
