//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Patient data input
//! - Survival prediction with confidence
//! - Session prediction history with CSV export

mod app;
mod styles;
mod ui;

pub use app::{App, ArtifactService};
pub use styles::MedicalTheme;
