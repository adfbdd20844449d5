//! Orchestration service for intake and feedback submissions.
//!
//! This is where the level calculators meet persistence:
//! - Intake: validate, reject duplicates, compute, journal the score, commit
//! - Feedback: validate, read committed level and score, compute, clamp,
//!   journal, commit
//!
//! Journals are appended before the user's state file is saved, and only the
//! state file decides what was committed. A failed append leaves the state
//! untouched so the submission can be retried.
//!
//! Every read-modify-write for a user runs under that user's exclusive lock,
//! so the previous score read is always the most recently committed one.

use crate::config::LevelConfig;
use crate::state::UserLock;
use crate::validation::validate_user_id;
use crate::wal::{self, JsonlSink, RecordSink};
use crate::{
    compute_initial_level, compute_updated_level, history, is_flare_up, report, Error,
    ExerciseReport, FeedbackEntry, FeedbackRecord, IntakeAssessment, IntakeRecord,
    IntensityTier, LevelScore, Result, ScoreRecord, ScoreSource, SymptomTrend, UserRecord,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File layout for per-user data under a data directory
#[derive(Clone, Debug)]
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into(),
        }
    }

    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("users").join(user_id)
    }

    pub fn state_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("state.json")
    }

    pub fn scores_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("scores.wal")
    }

    pub fn feedback_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("feedback.wal")
    }

    pub fn feedback_csv_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("feedback.csv")
    }

    pub fn lock_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join(".lock")
    }

    fn lock(&self, user_id: &str) -> Result<UserLock> {
        UserLock::acquire(&self.lock_path(user_id))
    }
}

/// Result of a stored intake
#[derive(Clone, Debug, Serialize)]
pub struct IntakeOutcome {
    pub level: i32,
    pub score: i32,
    pub tier: IntensityTier,
}

/// Result of a stored feedback submission
#[derive(Clone, Debug, Serialize)]
pub struct FeedbackOutcome {
    pub previous_level: i32,
    pub previous_score: i32,
    /// What the calculator returned, before clamping
    pub calculated: LevelScore,
    /// What was stored
    pub level: i32,
    pub score: i32,
    pub flare_up: bool,
    pub trend: SymptomTrend,
    pub tier: IntensityTier,
}

/// Snapshot of a user's progress
#[derive(Clone, Debug, Serialize)]
pub struct UserStatus {
    pub user_id: String,
    pub level: Option<i32>,
    pub tier: Option<IntensityTier>,
    pub latest_score: Option<i32>,
    pub has_intake: bool,
    pub feedback_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Bound a feedback-driven level before it is stored
///
/// A flare-up halt stays at 0 when `hold_halt_on_flare_up` is set; every
/// other result lands in `[min_active_level, max_level]`.
pub fn clamp_feedback_level(raw_level: i32, flare_up: bool, config: &LevelConfig) -> i32 {
    if flare_up && config.hold_halt_on_flare_up {
        return 0;
    }
    raw_level.clamp(config.min_active_level, config.max_level)
}

/// Ties calculators, validation and the user store together
pub struct RehabService {
    store: UserStore,
    levels: LevelConfig,
}

impl RehabService {
    pub fn new(store: UserStore, levels: LevelConfig) -> Self {
        Self { store, levels }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Record the one-time intake and derive the starting level
    pub fn submit_intake(
        &self,
        user_id: &str,
        intake: IntakeAssessment,
        now: DateTime<Utc>,
    ) -> Result<IntakeOutcome> {
        validate_user_id(user_id)?;
        intake.validate()?;

        let _guard = self.store.lock(user_id)?;
        let state_path = self.store.state_path(user_id);
        let mut record = UserRecord::load(&state_path, user_id)?;

        if record.intake.is_some() {
            return Err(Error::IntakeExists(user_id.to_string()));
        }

        let result = compute_initial_level(&intake, now);

        let mut scores = JsonlSink::new(self.store.scores_path(user_id));
        scores.append(&ScoreRecord {
            id: Uuid::new_v4(),
            recorded_at: now,
            score: result.score,
            level: result.level,
            source: ScoreSource::Intake,
        })?;

        record.intake = Some(IntakeRecord {
            submitted_at: now,
            assessment: intake,
        });
        record.level = Some(result.level);
        record.score = Some(result.score);
        record.updated_at = Some(now);
        record.save(&state_path)?;

        tracing::info!(
            "Initial level for {}: level {}, score {}",
            user_id,
            result.level,
            result.score
        );

        Ok(IntakeOutcome {
            level: result.level,
            score: result.score,
            tier: IntensityTier::for_level(result.level),
        })
    }

    /// Record a check-in and move the level by at most one step
    pub fn submit_feedback(
        &self,
        user_id: &str,
        feedback: FeedbackEntry,
        now: DateTime<Utc>,
    ) -> Result<FeedbackOutcome> {
        validate_user_id(user_id)?;
        feedback.validate()?;

        let _guard = self.store.lock(user_id)?;
        let state_path = self.store.state_path(user_id);
        let mut record = UserRecord::load(&state_path, user_id)?;

        let current_level = match (record.level, record.intake.is_some()) {
            (Some(level), true) => level,
            _ => return Err(Error::IntakeRequired(user_id.to_string())),
        };

        let previous_score = match record.score {
            Some(score) => score,
            // State written before scores were committed alongside the level
            None => wal::latest_score(&self.store.scores_path(user_id))?
                .map(|s| s.score)
                .ok_or_else(|| {
                    Error::State(format!("user {} has a level but no score", user_id))
                })?,
        };

        let calculated = compute_updated_level(current_level, previous_score, &feedback);
        let flare_up = is_flare_up(&feedback);
        let level = clamp_feedback_level(calculated.level, flare_up, &self.levels);
        let trend = feedback.symptom_trend();

        if level != calculated.level {
            tracing::debug!(
                "Clamped feedback level for {} from {} to {}",
                user_id,
                calculated.level,
                level
            );
        }

        let mut scores = JsonlSink::new(self.store.scores_path(user_id));
        scores.append(&ScoreRecord {
            id: Uuid::new_v4(),
            recorded_at: now,
            score: calculated.score,
            level,
            source: ScoreSource::Feedback,
        })?;

        let mut journal = JsonlSink::new(self.store.feedback_path(user_id));
        journal.append(&FeedbackRecord {
            id: Uuid::new_v4(),
            submitted_at: now,
            entry: feedback,
            level,
            score: calculated.score,
            trend,
        })?;

        record.level = Some(level);
        record.score = Some(calculated.score);
        record.updated_at = Some(now);
        record.save(&state_path)?;

        if flare_up {
            tracing::warn!("Flare-up reported by {}, level set to {}", user_id, level);
        } else {
            tracing::info!(
                "Level for {}: {} -> {} (score {} -> {})",
                user_id,
                current_level,
                level,
                previous_score,
                calculated.score
            );
        }

        Ok(FeedbackOutcome {
            previous_level: current_level,
            previous_score,
            calculated,
            level,
            score: calculated.score,
            flare_up,
            trend,
            tier: IntensityTier::for_level(level),
        })
    }

    /// Current level, latest score and submission counts
    pub fn status(&self, user_id: &str) -> Result<UserStatus> {
        validate_user_id(user_id)?;
        let record = UserRecord::load(&self.store.state_path(user_id), user_id)?;
        let feedback_count = history::load_all_feedback(
            &self.store.feedback_path(user_id),
            &self.store.feedback_csv_path(user_id),
        )?
        .len();

        Ok(UserStatus {
            user_id: record.user_id,
            level: record.level,
            tier: record.level.map(IntensityTier::for_level),
            latest_score: record.score,
            has_intake: record.intake.is_some(),
            feedback_count,
            updated_at: record.updated_at,
        })
    }

    /// Exercise report over the last `window_days` days
    pub fn report(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        window_days: i64,
    ) -> Result<ExerciseReport> {
        validate_user_id(user_id)?;
        let records = history::load_recent_feedback(
            &self.store.feedback_path(user_id),
            &self.store.feedback_csv_path(user_id),
            now,
            window_days,
        )?;
        Ok(report::build_report(&records, window_days))
    }

    /// Archive the feedback journal to CSV; returns (archived, cleaned)
    pub fn rollup(&self, user_id: &str, cleanup: bool) -> Result<(usize, usize)> {
        validate_user_id(user_id)?;
        let _guard = self.store.lock(user_id)?;

        let wal_path = self.store.feedback_path(user_id);
        let archived = if wal_path.exists() {
            crate::csv_rollup::feedback_to_csv_and_archive(
                &wal_path,
                &self.store.feedback_csv_path(user_id),
            )?
        } else {
            0
        };

        let cleaned = if cleanup {
            crate::csv_rollup::cleanup_processed_wals(&self.store.user_dir(user_id))?
        } else {
            0
        };

        Ok((archived, cleaned))
    }
}
