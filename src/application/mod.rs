//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod history;
mod prediction;

pub use history::{HistorySummary, SessionHistory};
pub use prediction::PredictionService;
