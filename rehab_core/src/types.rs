//! Core domain types for the rehab level tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Intake assessments and their enumerations
//! - Periodic feedback entries
//! - Level/score results and the records persisted per user

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Intake Types
// ============================================================================

/// Injured body part
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InjuryType {
    Shoulder,
    Knee,
}

/// How long ago the injury happened, as answered on the intake form
///
/// Unrecognized literals deserialize to `Unknown`, which scores as 0 days.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum TimeSinceInjury {
    LessThan2Weeks,
    TwoWeeksTo1Month,
    OneTo3Months,
    ThreeTo6Months,
    SixPlusMonths,
    Unknown,
}

impl TimeSinceInjury {
    /// Wire literal used when persisting
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSinceInjury::LessThan2Weeks => "LESS_THAN_2_WEEKS",
            TimeSinceInjury::TwoWeeksTo1Month => "TWO_WEEKS_TO_1_MONTH",
            TimeSinceInjury::OneTo3Months => "ONE_TO_3_MONTHS",
            TimeSinceInjury::ThreeTo6Months => "THREE_TO_6_MONTHS",
            TimeSinceInjury::SixPlusMonths => "SIX_PLUS_MONTHS",
            TimeSinceInjury::Unknown => "UNKNOWN",
        }
    }

    /// Parse either the upper-case wire literal or the lower-case bucket name
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "LESS_THAN_2_WEEKS" | "under_2_weeks" | "less_than_2_weeks" => {
                TimeSinceInjury::LessThan2Weeks
            }
            "TWO_WEEKS_TO_1_MONTH" | "two_weeks_to_1_month" => TimeSinceInjury::TwoWeeksTo1Month,
            "ONE_TO_3_MONTHS" | "1_to_3_months" | "one_to_3_months" => {
                TimeSinceInjury::OneTo3Months
            }
            "THREE_TO_6_MONTHS" | "3_to_6_months" | "three_to_6_months" => {
                TimeSinceInjury::ThreeTo6Months
            }
            "SIX_PLUS_MONTHS" | "over_6_months" | "six_plus_months" => {
                TimeSinceInjury::SixPlusMonths
            }
            _ => TimeSinceInjury::Unknown,
        }
    }
}

impl From<String> for TimeSinceInjury {
    fn from(s: String) -> Self {
        TimeSinceInjury::parse(&s)
    }
}

impl From<TimeSinceInjury> for String {
    fn from(t: TimeSinceInjury) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TimeSinceInjury {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-time intake questionnaire
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntakeAssessment {
    pub injury_type: InjuryType,
    pub time_since_injury: TimeSinceInjury,
    pub diagnosed_by_professional: bool,
    pub pain_level: i32,
    pub stiffness: i32,
    pub swelling: i32,
    pub has_daily_activity_pain: bool,
    pub had_surgery: bool,
    #[serde(default)]
    pub surgery_date: Option<NaiveDate>,
    pub had_prior_physiotherapy: bool,
    #[serde(default)]
    pub prior_physiotherapy_completed: Option<bool>,
    #[serde(default)]
    pub physiotherapy_description: Option<String>,
}

// ============================================================================
// Feedback Types
// ============================================================================

/// Periodic symptom and progress check-in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub pain_level: i32,
    pub stiffness: i32,
    pub fatigue_level: i32,
    pub swelling: i32,
    pub strength_perception: i32,
    pub functional_improvement: i32,
    pub exercise_tolerance: i32,
}

/// Direction of reported symptoms in a single check-in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SymptomTrend {
    Flaring,
    Steady,
    Improving,
}

impl SymptomTrend {
    /// Signed indicator: -1 flaring, 0 steady, 1 improving
    pub fn signum(&self) -> i32 {
        match self {
            SymptomTrend::Flaring => -1,
            SymptomTrend::Steady => 0,
            SymptomTrend::Improving => 1,
        }
    }
}

// ============================================================================
// Level and Score Types
// ============================================================================

/// Output of either level calculator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelScore {
    pub level: i32,
    pub score: i32,
}

impl LevelScore {
    pub const HALT: LevelScore = LevelScore { level: 0, score: 0 };

    pub fn new(level: i32, score: i32) -> Self {
        Self { level, score }
    }
}

/// Exercise intensity recommendation for a level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntensityTier {
    NoExercise,
    Low,
    Mid,
    High,
}

impl IntensityTier {
    pub fn for_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => IntensityTier::NoExercise,
            1..=3 => IntensityTier::Low,
            4..=6 => IntensityTier::Mid,
            _ => IntensityTier::High,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IntensityTier::NoExercise => "No exercise recommended.",
            IntensityTier::Low => "Low-Level exercise recommended.",
            IntensityTier::Mid => "Mid-Level exercise recommended.",
            IntensityTier::High => "High-Level exercise recommended.",
        }
    }
}

// ============================================================================
// Persisted Records
// ============================================================================

/// Stored intake with its submission time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub submitted_at: DateTime<Utc>,
    pub assessment: IntakeAssessment,
}

/// Mutable per-user state: current level plus the immutable intake
///
/// Saving this record commits a submission. `score` is the baseline for the
/// next feedback; the score journal is history only.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UserRecord {
    pub user_id: String,
    pub level: Option<i32>,
    #[serde(default)]
    pub score: Option<i32>,
    pub intake: Option<IntakeRecord>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which calculation produced a score
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Intake,
    Feedback,
}

/// One row of score history (append-only)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub score: i32,
    pub level: i32,
    pub source: ScoreSource,
}

/// One submitted feedback with the level it produced (append-only)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: FeedbackEntry,
    pub level: i32,
    pub score: i32,
    pub trend: SymptomTrend,
}

