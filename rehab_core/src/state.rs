//! Per-user state persistence with file locking.
//!
//! `UserRecord` holds the current level and the intake. Writes go through a
//! temp file and an atomic rename. `UserLock` serializes a user's whole
//! read-modify-write cycle across threads and processes.

use crate::{Error, Result, UserRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl UserRecord {
    /// Load user state from a file with shared locking
    ///
    /// Returns a fresh record for `user_id` if the file doesn't exist.
    /// A corrupted file is reported as an error rather than silently reset,
    /// since resetting would discard the stored intake.
    pub fn load(path: &Path, user_id: &str) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No state file for {}, starting fresh", user_id);
            return Ok(Self {
                user_id: user_id.to_string(),
                ..Self::default()
            });
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let record: UserRecord = serde_json::from_str(&contents).map_err(|e| {
            tracing::warn!("Failed to parse state file {:?}: {}", path, e);
            Error::State(format!("corrupt state file {:?}: {}", path, e))
        })?;

        if record.user_id != user_id {
            return Err(Error::State(format!(
                "state file {:?} belongs to {:?}, expected {:?}",
                path, record.user_id, user_id
            )));
        }

        tracing::debug!("Loaded user state from {:?}", path);
        Ok(record)
    }

    /// Save user state to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("state path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved user state to {:?}", path);
        Ok(())
    }
}

/// Exclusive per-user lock, released on drop
pub struct UserLock {
    file: File,
    path: PathBuf,
}

impl UserLock {
    /// Block until the lock at `path` is held
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.lock_exclusive()?;

        tracing::trace!("Acquired user lock {:?}", path);
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for UserLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release user lock {:?}: {}", self.path, e);
        }
    }
}
