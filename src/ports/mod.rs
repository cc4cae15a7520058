//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundary between
//! the application and the externally trained model artifacts.

mod model;

pub use model::{Classifier, FeatureScaler, ServiceError};
