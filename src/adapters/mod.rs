//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the integration with files and external crates:
//! - `artifacts`: JSON scaler and classifier loading with integrity checks
//! - `export`: CSV encoding of the prediction history
//! - `sanitize`: patient-data filtering for logs

pub mod artifacts;
pub mod export;
pub mod sanitize;
