//! Symptom trend classification for a single check-in.
//!
//! Looks only at the four symptom ratings (pain, swelling, stiffness,
//! fatigue). The result is stored alongside feedback for display and
//! reporting; level calculation does not depend on it.

use crate::bands::SEVERE_SYMPTOM;
use crate::{FeedbackEntry, SymptomTrend};

/// Classify symptom ratings as flaring, steady or improving
pub fn classify_symptoms(pain: i32, swelling: i32, stiffness: i32, fatigue: i32) -> SymptomTrend {
    let values = [pain, swelling, stiffness, fatigue];

    if values.iter().any(|&v| v >= SEVERE_SYMPTOM) {
        SymptomTrend::Flaring
    } else if values.iter().all(|v| (3..=6).contains(v)) {
        SymptomTrend::Steady
    } else if values.iter().all(|&v| v < 4) {
        SymptomTrend::Improving
    } else {
        SymptomTrend::Steady
    }
}

impl FeedbackEntry {
    pub fn symptom_trend(&self) -> SymptomTrend {
        classify_symptoms(
            self.pain_level,
            self.swelling,
            self.stiffness,
            self.fatigue_level,
        )
    }
}
