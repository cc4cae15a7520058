//! Integrity manifest utility for Lungsurv model artifacts.
//!
//! Writes `manifest.json` with the SHA-256 digests of `scaler.json` and
//! `model.json`. The application refuses to load artifacts that no longer
//! match a present manifest.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir>
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use lungsurv::adapters::artifacts::{ArtifactManifest, ModelArtifacts};

fn usage() -> String {
    "Usage: write_manifest <model_dir>".to_string()
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let model_dir = match args.next().as_deref() {
        None | Some("-h") | Some("--help") => bail!(usage()),
        Some(dir) => PathBuf::from(dir),
    };
    if args.next().is_some() {
        bail!(usage());
    }

    // Accept a path to one of the artifact files as well.
    if model_dir.is_file() {
        return model_dir
            .parent()
            .map(PathBuf::from)
            .context("Model path has no parent directory");
    }
    Ok(model_dir)
}

fn main() -> Result<()> {
    let model_dir = parse_args()?;

    let manifest = ArtifactManifest::build(&model_dir, Some(chrono::Utc::now().timestamp()))
        .with_context(|| format!("Failed to hash artifacts in {model_dir:?}"))?;
    let path = manifest.write(&model_dir)?;

    // Confirm the directory loads with the new manifest in place.
    ModelArtifacts::load(&model_dir).context("Artifacts do not load with the written manifest")?;

    println!("Wrote manifest: {path:?}");
    for (file, digest) in &manifest.files {
        println!("  {file}  sha256={digest}");
    }
    Ok(())
}
