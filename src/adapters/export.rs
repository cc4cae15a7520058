//! CSV export of prediction records.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::PredictionRecord;
use crate::LungsurvError;

/// Default file name of the history export.
pub const EXPORT_FILE_NAME: &str = "survival_predictions.csv";

/// MIME type of the history export.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize records as UTF-8 CSV with a header row, in the given order.
///
/// The header row is written even when there are no records.
///
/// # Errors
/// Returns error if a record cannot be serialized.
pub fn encode_csv<'a, I>(records: I) -> Result<Vec<u8>, LungsurvError>
where
    I: IntoIterator<Item = &'a PredictionRecord>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(PredictionRecord::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| LungsurvError::Export(e.to_string()))
}

/// Parse an export produced by [`encode_csv`].
///
/// # Errors
/// Returns `LungsurvError::Export` if the header row differs from
/// `PredictionRecord::HEADERS`, or a CSV error for malformed rows.
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<PredictionRecord>, LungsurvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if !headers.iter().eq(PredictionRecord::HEADERS.iter().copied()) {
        return Err(LungsurvError::Export(format!(
            "unexpected header row: {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    reader
        .deserialize::<PredictionRecord>()
        .map(|row| row.map_err(LungsurvError::from))
        .collect()
}

/// Write an export into `dir`, creating the directory if needed.
///
/// Returns the path of the written file.
///
/// # Errors
/// Returns error if the directory or file cannot be written.
pub fn write_export(dir: &Path, bytes: &[u8]) -> Result<PathBuf, LungsurvError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, bytes)?;
    tracing::info!("Exported {} bytes of {} to {:?}", bytes.len(), EXPORT_MIME, path);
    Ok(path)
}
