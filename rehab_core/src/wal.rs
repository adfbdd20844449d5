//! Append-only JSONL journals for score and feedback history.
//!
//! Records are appended one JSON object per line under an exclusive file
//! lock; readers take a shared lock.

use crate::{Result, ScoreRecord};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Sink trait for persisting journal records
pub trait RecordSink<T> {
    fn append(&mut self, record: &T) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlSink<T> {
    path: PathBuf,
    _record: PhantomData<fn(&T)>,
}

impl<T> JsonlSink<T> {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl<T: Serialize> RecordSink<T> for JsonlSink<T> {
    fn append(&mut self, record: &T) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended record to {:?}", self.path);
        Ok(())
    }
}

/// Read all records from a journal file
///
/// Lines that fail to parse are logged and skipped.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse record at {:?} line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Most recent score in a score journal
pub fn latest_score(path: &Path) -> Result<Option<ScoreRecord>> {
    Ok(read_records::<ScoreRecord>(path)?.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScoreSource;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_score(score: i32, level: i32) -> ScoreRecord {
        ScoreRecord {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            score,
            level,
            source: ScoreSource::Feedback,
        }
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("scores.wal");

        let record = create_score(26, 5);
        let record_id = record.id;

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&record).unwrap();

        let records: Vec<ScoreRecord> = read_records(&wal_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record_id);
        assert_eq!(records[0].score, 26);
    }

    #[test]
    fn test_latest_score_is_last_appended() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("scores.wal");

        let mut sink = JsonlSink::new(&wal_path);
        for score in [20, 35, 18] {
            sink.append(&create_score(score, 5)).unwrap();
        }

        let latest = latest_score(&wal_path).unwrap().unwrap();
        assert_eq!(latest.score, 18);
    }

    #[test]
    fn test_read_missing_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nonexistent.wal");

        let records: Vec<ScoreRecord> = read_records(&wal_path).unwrap();
        assert!(records.is_empty());
        assert!(latest_score(&wal_path).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("scores.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_score(20, 4)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
            file.write_all(b"{ truncated\n").unwrap();
        }
        sink.append(&create_score(25, 4)).unwrap();

        let records: Vec<ScoreRecord> = read_records(&wal_path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(latest_score(&wal_path).unwrap().unwrap().score, 25);
    }
}
