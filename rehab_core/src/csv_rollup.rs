//! CSV rollup for archiving the feedback journal.
//!
//! This module implements atomic journal-to-CSV conversion with proper error
//! handling to prevent data loss.

use crate::{FeedbackRecord, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
///
/// The symptom trend is not stored; it is derived from the ratings on load.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub submitted_at: String,
    pub pain_level: i32,
    pub stiffness: i32,
    pub fatigue_level: i32,
    pub swelling: i32,
    pub strength_perception: i32,
    pub functional_improvement: i32,
    pub exercise_tolerance: i32,
    pub level: i32,
    pub score: i32,
}

impl From<&FeedbackRecord> for CsvRow {
    fn from(record: &FeedbackRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            submitted_at: record.submitted_at.to_rfc3339(),
            pain_level: record.entry.pain_level,
            stiffness: record.entry.stiffness,
            fatigue_level: record.entry.fatigue_level,
            swelling: record.entry.swelling,
            strength_perception: record.entry.strength_perception,
            functional_improvement: record.entry.functional_improvement,
            exercise_tolerance: record.entry.exercise_tolerance,
            level: record.level,
            score: record.score,
        }
    }
}

/// Roll up journal feedback into CSV and archive the journal atomically
///
/// This function:
/// 1. Reads all feedback records from the journal
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to .processed
/// 5. Returns the number of records processed
///
/// The journal is renamed (not deleted) so it can be recovered by hand.
pub fn feedback_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = crate::wal::read_records::<FeedbackRecord>(wal_path)?;

    if records.is_empty() {
        tracing::info!("No feedback in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only for a brand new archive
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} feedback records to CSV", records.len());

    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(records.len())
}

/// Clean up old processed journal files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
