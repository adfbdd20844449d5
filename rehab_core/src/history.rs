//! Feedback history loading across the live journal and the CSV archive.

use crate::csv_rollup::CsvRow;
use crate::{Error, FeedbackEntry, FeedbackRecord, Result};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

impl TryFrom<CsvRow> for FeedbackRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;

        let submitted_at = DateTime::parse_from_rfc3339(&row.submitted_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let entry = FeedbackEntry {
            pain_level: row.pain_level,
            stiffness: row.stiffness,
            fatigue_level: row.fatigue_level,
            swelling: row.swelling,
            strength_perception: row.strength_perception,
            functional_improvement: row.functional_improvement,
            exercise_tolerance: row.exercise_tolerance,
        };

        Ok(FeedbackRecord {
            id,
            submitted_at,
            entry,
            level: row.level,
            score: row.score,
            trend: entry.symptom_trend(),
        })
    }
}

/// Load every feedback record from the journal and the archive
///
/// Returns records sorted newest first, deduplicated by id.
pub fn load_all_feedback(wal_path: &Path, csv_path: &Path) -> Result<Vec<FeedbackRecord>> {
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for record in crate::wal::read_records::<FeedbackRecord>(wal_path)? {
            if seen_ids.insert(record.id) {
                records.push(record);
            }
        }
        tracing::debug!("Loaded {} feedback records from journal", records.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for record in load_feedback_from_csv(csv_path)? {
            if seen_ids.insert(record.id) {
                records.push(record);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} feedback records from CSV", csv_count);
    }

    records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(records)
}

/// Load feedback submitted within the last `days` days of `now`
pub fn load_recent_feedback(
    wal_path: &Path,
    csv_path: &Path,
    now: DateTime<Utc>,
    days: i64,
) -> Result<Vec<FeedbackRecord>> {
    // A window reaching past chrono's range keeps everything up to `now`
    let cutoff = Duration::try_days(days).and_then(|window| now.checked_sub_signed(window));
    let mut records = load_all_feedback(wal_path, csv_path)?;
    records.retain(|r| cutoff.map_or(true, |c| r.submitted_at >= c) && r.submitted_at <= now);

    tracing::info!(
        "Loaded {} feedback records from last {} days",
        records.len(),
        days
    );

    Ok(records)
}

fn load_feedback_from_csv(path: &Path) -> Result<Vec<FeedbackRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match FeedbackRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(records)
}
