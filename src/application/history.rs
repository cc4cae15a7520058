//! Session history: predictions made during the running session.

use crate::adapters::export;
use crate::domain::{PredictionRecord, SurvivalOutcome};
use crate::LungsurvError;

/// Outcome counts for the history header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub total: usize,
    pub survived: usize,
    pub not_survived: usize,
}

/// Append-only log of prediction records, owned by one session.
///
/// Records are stored oldest-first; display and export are newest-first.
#[derive(Debug, Default)]
pub struct SessionHistory {
    records: Vec<PredictionRecord>,
}

impl SessionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, preserving insertion order.
    pub fn append(&mut self, record: PredictionRecord) {
        self.records.push(record);
        tracing::debug!("History now holds {} records", self.records.len());
    }

    /// Records newest-first. Does not modify the log.
    pub fn list_descending(&self) -> impl ExactSizeIterator<Item = &PredictionRecord> + '_ {
        self.records.iter().rev()
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        let removed = self.records.len();
        self.records.clear();
        tracing::info!("Cleared {} history records", removed);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> HistorySummary {
        let survived = self
            .records
            .iter()
            .filter(|r| r.prediction == SurvivalOutcome::Survived)
            .count();
        HistorySummary {
            total: self.records.len(),
            survived,
            not_survived: self.records.len() - survived,
        }
    }

    /// Serialize the whole log as CSV, newest-first like the table.
    ///
    /// # Errors
    /// Returns error if a record cannot be serialized.
    pub fn export_csv(&self) -> Result<Vec<u8>, LungsurvError> {
        export::encode_csv(self.list_descending())
    }
}
