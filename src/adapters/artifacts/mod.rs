//! Artifact adapter: JSON-exported scaler and classifier.
//!
//! The training pipeline exports two files into the model directory:
//! - `scaler.json`: a standard scaler (`mean`, `scale` per feature)
//! - `model.json`: a binary logistic regression (`coefficients`, `intercept`, `classes`)
//!
//! # Integrity
//!
//! When `manifest.json` is present, every file it lists must exist and match
//! its SHA-256 digest before anything is parsed. Without a manifest the
//! artifacts are loaded as-is (a warning is logged).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{Classifier, FeatureScaler, ServiceError};
use crate::LungsurvError;

pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "model.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Manifest format version understood by this loader.
pub const MANIFEST_VERSION: u32 = 1;

/// Standard scaler exported by the training pipeline.
///
/// `transform(x) = (x - mean) / scale`, with a zero scale treated as 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Binary logistic regression exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// SHA-256 digests binding the artifact files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Hash the scaler and model files of `model_dir`.
    ///
    /// # Errors
    /// Returns `LungsurvError::Io` if either artifact cannot be read.
    pub fn build(model_dir: &Path, created_at: Option<i64>) -> Result<Self, LungsurvError> {
        let mut files = BTreeMap::new();
        for rel in [SCALER_FILE, MODEL_FILE] {
            let bytes = fs::read(model_dir.join(rel))?;
            files.insert(rel.to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            created_at,
            files,
        })
    }

    /// Write the manifest as pretty JSON into `model_dir`.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn write(&self, model_dir: &Path) -> Result<std::path::PathBuf, LungsurvError> {
        let path = model_dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(path)
    }
}

/// The loaded scaler and classifier pair.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
}

impl ModelArtifacts {
    /// Load and validate both artifacts from `model_dir`.
    ///
    /// # Errors
    /// Returns `LungsurvError::ServiceUnavailable` if a file is missing, unreadable,
    /// malformed or fails the manifest check, and `LungsurvError::ShapeMismatch`
    /// if the artifacts do not match the 13-feature binary contract.
    pub fn load(model_dir: &Path) -> Result<Self, LungsurvError> {
        if !model_dir.is_dir() {
            return Err(LungsurvError::ServiceUnavailable(format!(
                "model directory {model_dir:?} not found"
            )));
        }

        match verify_manifest(model_dir)? {
            Some(manifest) => tracing::info!(
                "Artifact manifest verified ({} files)",
                manifest.files.len()
            ),
            None => tracing::warn!(
                "No {MANIFEST_FILE} in {:?}; loading artifacts without integrity check",
                model_dir
            ),
        }

        let scaler: StandardScaler = read_json(&model_dir.join(SCALER_FILE))?;
        let classifier: LogisticRegression = read_json(&model_dir.join(MODEL_FILE))?;

        scaler.validate()?;
        classifier.validate()?;

        tracing::info!(
            "Loaded artifacts from {:?} (n_features={}, classes={:?})",
            model_dir,
            FEATURE_COUNT,
            classifier.classes
        );

        Ok(Self { scaler, classifier })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LungsurvError> {
    let content = fs::read_to_string(path).map_err(|e| {
        LungsurvError::ServiceUnavailable(format!("failed to read {path:?}: {e}"))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| LungsurvError::ServiceUnavailable(format!("invalid {path:?}: {e}")))
}

/// Check that artifact feature names, when given, follow the encoder order.
fn check_feature_names(artifact: &str, names: &[String]) -> Result<(), LungsurvError> {
    if names.is_empty() {
        return Ok(());
    }
    if names.len() != FEATURE_COUNT
        || names.iter().zip(FEATURE_NAMES.iter()).any(|(a, b)| a != b)
    {
        return Err(LungsurvError::ShapeMismatch(format!(
            "{artifact} feature order {names:?} does not match {FEATURE_NAMES:?}"
        )));
    }
    Ok(())
}

fn check_len(artifact: &str, what: &str, len: usize) -> Result<(), LungsurvError> {
    if len != FEATURE_COUNT {
        return Err(LungsurvError::ShapeMismatch(format!(
            "{artifact} has {len} {what}, expected {FEATURE_COUNT}"
        )));
    }
    Ok(())
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl StandardScaler {
    fn validate(&self) -> Result<(), LungsurvError> {
        check_feature_names(SCALER_FILE, &self.feature_names)?;
        check_len(SCALER_FILE, "means", self.mean.len())?;
        check_len(SCALER_FILE, "scales", self.scale.len())?;
        if !all_finite(&self.mean) || !all_finite(&self.scale) {
            return Err(LungsurvError::ServiceUnavailable(format!(
                "{SCALER_FILE} contains non-finite parameters"
            )));
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ServiceError> {
        if features.len() != self.mean.len() {
            return Err(ServiceError::FeatureCount {
                expected: self.mean.len(),
                actual: features.len(),
            });
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), LungsurvError> {
        check_feature_names(MODEL_FILE, &self.feature_names)?;
        check_len(MODEL_FILE, "coefficients", self.coefficients.len())?;
        if self.classes.len() != 2 {
            return Err(LungsurvError::ShapeMismatch(format!(
                "{MODEL_FILE} declares {} classes, expected 2",
                self.classes.len()
            )));
        }
        if !all_finite(&self.coefficients) || !self.intercept.is_finite() {
            return Err(LungsurvError::ServiceUnavailable(format!(
                "{MODEL_FILE} contains non-finite parameters"
            )));
        }
        Ok(())
    }

    fn decision_function(&self, scaled: &[f64]) -> Result<f64, ServiceError> {
        if scaled.len() != self.coefficients.len() {
            return Err(ServiceError::FeatureCount {
                expected: self.coefficients.len(),
                actual: scaled.len(),
            });
        }
        let z = scaled
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        if z.is_finite() {
            Ok(z)
        } else {
            Err(ServiceError::NonFinite("decision function"))
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, scaled: &[f64]) -> Result<usize, ServiceError> {
        let proba = self.predict_proba(scaled)?;
        // argmax; ties resolve to the first class
        Ok(if proba[1] > proba[0] { 1 } else { 0 })
    }

    fn predict_proba(&self, scaled: &[f64]) -> Result<Vec<f64>, ServiceError> {
        let p1 = sigmoid(self.decision_function(scaled)?);
        Ok(vec![1.0 - p1, p1])
    }
}

/// Compute the lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verify `manifest.json` against the files in `model_dir`.
///
/// Returns `Ok(None)` when no manifest exists.
fn verify_manifest(model_dir: &Path) -> Result<Option<ArtifactManifest>, LungsurvError> {
    let manifest_path = model_dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Ok(None);
    }

    let manifest: ArtifactManifest = read_json(&manifest_path)?;
    if manifest.version != MANIFEST_VERSION {
        return Err(LungsurvError::ServiceUnavailable(format!(
            "unsupported manifest version: {}",
            manifest.version
        )));
    }

    for required in [SCALER_FILE, MODEL_FILE] {
        if !manifest.files.contains_key(required) {
            return Err(LungsurvError::ServiceUnavailable(format!(
                "{MANIFEST_FILE} must include {required}"
            )));
        }
    }

    for (rel, expected_hex) in &manifest.files {
        let path = model_dir.join(rel);
        let bytes = fs::read(&path).map_err(|e| {
            LungsurvError::ServiceUnavailable(format!(
                "manifest references missing/unreadable file {path:?}: {e}"
            ))
        })?;
        let actual_hex = sha256_hex(&bytes);
        if !constant_time_eq_str(&actual_hex, &expected_hex.to_ascii_lowercase()) {
            tracing::error!("Hash mismatch for artifact {}", rel);
            return Err(LungsurvError::ServiceUnavailable(format!(
                "file hash mismatch for {rel}"
            )));
        }
    }

    Ok(Some(manifest))
}
