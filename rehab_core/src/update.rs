//! Level adjustment from periodic feedback.
//!
//! A new score is built from the check-in and compared against the previous
//! score. A swing of 5 or more points moves the level by one step in that
//! direction; anything smaller keeps the level where it is.
//!
//! This function never clamps. Callers bound the result before persisting
//! (see [`crate::service::clamp_feedback_level`]).

use crate::bands::{self, LEVEL_STEP_THRESHOLD, PERCEPTION_POINTS, SEVERE_SYMPTOM, SYMPTOM_POINTS};
use crate::{FeedbackEntry, LevelScore};

/// True when any symptom rating forces a full stop
pub fn is_flare_up(feedback: &FeedbackEntry) -> bool {
    [
        feedback.pain_level,
        feedback.stiffness,
        feedback.swelling,
        feedback.fatigue_level,
    ]
    .iter()
    .any(|&v| v >= SEVERE_SYMPTOM)
}

/// Score a check-in on its own, without any level comparison
pub fn feedback_score(feedback: &FeedbackEntry) -> i32 {
    let symptoms = [
        feedback.pain_level,
        feedback.stiffness,
        feedback.fatigue_level,
        feedback.swelling,
    ]
    .iter()
    .map(|&v| bands::points(SYMPTOM_POINTS, v))
    .sum::<i32>();

    let perceptions = [
        feedback.strength_perception,
        feedback.functional_improvement,
        feedback.exercise_tolerance,
    ]
    .iter()
    .map(|&v| bands::points(PERCEPTION_POINTS, v))
    .sum::<i32>();

    symptoms + perceptions
}

/// Compute the next level and score from feedback
pub fn compute_updated_level(
    current_level: i32,
    previous_score: i32,
    feedback: &FeedbackEntry,
) -> LevelScore {
    if is_flare_up(feedback) {
        tracing::debug!("Feedback flare-up gate tripped");
        return LevelScore::HALT;
    }

    let score = feedback_score(feedback);
    let delta = score.saturating_sub(previous_score);

    let level = if delta >= LEVEL_STEP_THRESHOLD {
        current_level.saturating_add(1)
    } else if delta <= -LEVEL_STEP_THRESHOLD {
        current_level.saturating_sub(1)
    } else {
        current_level
    };

    tracing::debug!(
        "Feedback score {} vs previous {} (delta {}): level {} -> {}",
        score,
        previous_score,
        delta,
        current_level,
        level
    );

    LevelScore::new(level, score)
}
