//! Initial level calculation from the intake questionnaire.
//!
//! Three gates run first and each forces level 0 (no exercise):
//! 1. Any of pain, swelling or stiffness rated 7 or higher
//! 2. Injury 30 days old or less
//! 3. Surgery 90 days ago or less
//!
//! Otherwise seven independent factors are summed into a score and the score
//! is mapped to a level 1-10 in 5-point bands.

use crate::bands::{self, SEVERE_SYMPTOM, SYMPTOM_POINTS, TIME_SINCE_INJURY_POINTS};
use crate::{IntakeAssessment, LevelScore};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Compute the starting level and score for an intake
///
/// `now` is the instant the surgery date is measured against.
pub fn compute_initial_level(intake: &IntakeAssessment, now: DateTime<Utc>) -> LevelScore {
    if intake.pain_level >= SEVERE_SYMPTOM
        || intake.swelling >= SEVERE_SYMPTOM
        || intake.stiffness >= SEVERE_SYMPTOM
    {
        tracing::debug!("Intake severity gate tripped");
        return LevelScore::HALT;
    }

    let days_since_injury = bands::days_for_bucket(intake.time_since_injury);
    if days_since_injury <= bands::MIN_DAYS_SINCE_INJURY {
        tracing::debug!(
            "Intake recency gate tripped ({} days since injury)",
            days_since_injury
        );
        return LevelScore::HALT;
    }

    let days_since_surgery = if intake.had_surgery {
        intake.surgery_date.map(|date| days_since(date, now))
    } else {
        None
    };

    if let Some(days) = days_since_surgery {
        if days <= bands::MIN_DAYS_SINCE_SURGERY {
            tracing::debug!("Intake post-surgical gate tripped ({:.1} days)", days);
            return LevelScore::HALT;
        }
    }

    let score = bands::points(TIME_SINCE_INJURY_POINTS, days_since_injury)
        + diagnosis_points(intake.diagnosed_by_professional)
        + bands::points(SYMPTOM_POINTS, intake.pain_level)
        + daily_activity_points(intake.has_daily_activity_pain)
        + surgery_points(intake.had_surgery, days_since_surgery)
        + physiotherapy_points(
            intake.had_prior_physiotherapy,
            intake.prior_physiotherapy_completed.unwrap_or(false),
        )
        + bands::points(SYMPTOM_POINTS, intake.swelling);

    match bands::level_for_score(score) {
        Some(level) => LevelScore::new(level, score),
        None => LevelScore::new(0, score),
    }
}

/// Fractional days between midnight UTC on `date` and `now`
fn days_since(date: NaiveDate, now: DateTime<Utc>) -> f64 {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (now - start).num_seconds() as f64 / 86_400.0
}

fn diagnosis_points(diagnosed: bool) -> i32 {
    if diagnosed {
        2
    } else {
        1
    }
}

fn daily_activity_points(has_pain: bool) -> i32 {
    if has_pain {
        1
    } else {
        3
    }
}

/// No surgery scores highest; a surgery without a date scores nothing
fn surgery_points(had_surgery: bool, days_since_surgery: Option<f64>) -> i32 {
    if !had_surgery {
        return 5;
    }
    match days_since_surgery {
        Some(days) if days > bands::SURGERY_RECOVERED_DAYS => 4,
        Some(days) if days > bands::MIN_DAYS_SINCE_SURGERY => 3,
        _ => 0,
    }
}

fn physiotherapy_points(had_before: bool, completed: bool) -> i32 {
    match (had_before, completed) {
        (true, true) => 5,
        (true, false) => 3,
        (false, _) => 2,
    }
}
