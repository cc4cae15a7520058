//! Runtime configuration sourced from environment variables.

use std::path::PathBuf;
use std::time::Duration;

const MODEL_PATH_ENV: &str = "LUNGSURV_MODEL_PATH";
const EXPORT_DIR_ENV: &str = "LUNGSURV_EXPORT_DIR";
const LOG_MODE_ENV: &str = "LUNGSURV_LOG_MODE";
const LOG_FILE_ENV: &str = "LUNGSURV_LOG_FILE";
const PROGRESS_MS_ENV: &str = "LUNGSURV_PROGRESS_MS";

/// Default duration of the progress animation shown before a prediction.
const DEFAULT_PROGRESS_MS: u64 = 1000;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `scaler.json`, `model.json` and optionally `manifest.json`
    pub model_dir: PathBuf,
    /// Directory the CSV export is written to
    pub export_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Length of the cosmetic progress bar; zero predicts immediately
    pub progress_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            export_dir: PathBuf::from("."),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("lungsurv.log"),
            progress_duration: Duration::from_millis(DEFAULT_PROGRESS_MS),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let progress_duration = lookup(PROGRESS_MS_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.progress_duration);

        Self {
            model_dir: lookup(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            export_dir: lookup(EXPORT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            log_mode: lookup(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: lookup(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            progress_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.log_mode, LogMode::Auto);
        assert_eq!(config.progress_duration, Duration::from_millis(1000));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("LUNGSURV_MODEL_PATH", "/opt/artifacts"),
            ("LUNGSURV_EXPORT_DIR", "/tmp/out"),
            ("LUNGSURV_LOG_MODE", "STDOUT"),
            ("LUNGSURV_PROGRESS_MS", "0"),
        ]));
        assert_eq!(config.model_dir, PathBuf::from("/opt/artifacts"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert!(config.progress_duration.is_zero());
    }

    #[test]
    fn test_bad_progress_falls_back() {
        let config = AppConfig::from_lookup(lookup_from(&[("LUNGSURV_PROGRESS_MS", "soon")]));
        assert_eq!(config.progress_duration, Duration::from_millis(1000));
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
