//! Input validation performed before anything reaches the calculators.
//!
//! The calculators accept any integers and degrade to low scores on bad
//! input. These checks are what keep out-of-domain values from being
//! persisted in the first place.

use crate::{Error, FeedbackEntry, IntakeAssessment, Result, TimeSinceInjury};
use std::ops::RangeInclusive;

/// Allowed range for every 1-10 rating
pub const RATING_RANGE: RangeInclusive<i32> = 1..=10;

const MAX_USER_ID_LEN: usize = 64;

fn check_rating(field: &str, value: i32) -> Result<()> {
    if RATING_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "\"{}\" must be between {} and {}, got {}",
            field,
            RATING_RANGE.start(),
            RATING_RANGE.end(),
            value
        )))
    }
}

impl IntakeAssessment {
    /// Check field domains and conditionally required fields
    pub fn validate(&self) -> Result<()> {
        if self.time_since_injury == TimeSinceInjury::Unknown {
            return Err(Error::Validation(
                "\"time_since_injury\" must be one of LESS_THAN_2_WEEKS, TWO_WEEKS_TO_1_MONTH, \
                 ONE_TO_3_MONTHS, THREE_TO_6_MONTHS, SIX_PLUS_MONTHS"
                    .into(),
            ));
        }

        check_rating("pain_level", self.pain_level)?;
        check_rating("stiffness", self.stiffness)?;
        check_rating("swelling", self.swelling)?;

        if self.had_surgery && self.surgery_date.is_none() {
            return Err(Error::Validation(
                "\"surgery_date\" is required when \"had_surgery\" is true".into(),
            ));
        }

        if self.had_prior_physiotherapy {
            if self.prior_physiotherapy_completed.is_none() {
                return Err(Error::Validation(
                    "\"prior_physiotherapy_completed\" is required when \
                     \"had_prior_physiotherapy\" is true"
                        .into(),
                ));
            }
            let described = self
                .physiotherapy_description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty());
            if !described {
                return Err(Error::Validation(
                    "\"physiotherapy_description\" is required when \
                     \"had_prior_physiotherapy\" is true"
                        .into(),
                ));
            }
        }

        Ok(())
    }
}

impl FeedbackEntry {
    /// Check that every rating is within 1-10
    pub fn validate(&self) -> Result<()> {
        check_rating("pain_level", self.pain_level)?;
        check_rating("swelling", self.swelling)?;
        check_rating("stiffness", self.stiffness)?;
        check_rating("fatigue_level", self.fatigue_level)?;
        check_rating("strength_perception", self.strength_perception)?;
        check_rating("functional_improvement", self.functional_improvement)?;
        check_rating("exercise_tolerance", self.exercise_tolerance)?;
        Ok(())
    }
}

/// User ids become directory names, so keep them to a safe alphabet
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(Error::Validation(format!(
            "user id must be 1-{} characters",
            MAX_USER_ID_LEN
        )));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Validation(format!(
            "user id {:?} may only contain letters, digits, '_' and '-'",
            user_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InjuryType;
    use chrono::NaiveDate;

    fn intake() -> IntakeAssessment {
        IntakeAssessment {
            injury_type: InjuryType::Shoulder,
            time_since_injury: TimeSinceInjury::OneTo3Months,
            diagnosed_by_professional: false,
            pain_level: 4,
            stiffness: 3,
            swelling: 2,
            has_daily_activity_pain: true,
            had_surgery: false,
            surgery_date: None,
            had_prior_physiotherapy: false,
            prior_physiotherapy_completed: None,
            physiotherapy_description: None,
        }
    }

    fn feedback() -> FeedbackEntry {
        FeedbackEntry {
            pain_level: 3,
            stiffness: 3,
            fatigue_level: 3,
            swelling: 3,
            strength_perception: 5,
            functional_improvement: 5,
            exercise_tolerance: 5,
        }
    }

    fn validation_message(result: Result<()>) -> String {
        match result {
            Err(Error::Validation(msg)) => msg,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_intake() {
        assert!(intake().validate().is_ok());
    }

    #[test]
    fn test_intake_rating_out_of_range() {
        let bad = IntakeAssessment {
            pain_level: 11,
            ..intake()
        };
        assert!(validation_message(bad.validate()).contains("pain_level"));

        let bad = IntakeAssessment {
            swelling: 0,
            ..intake()
        };
        assert!(validation_message(bad.validate()).contains("swelling"));
    }

    #[test]
    fn test_unknown_bucket_rejected() {
        let bad = IntakeAssessment {
            time_since_injury: TimeSinceInjury::Unknown,
            ..intake()
        };
        assert!(validation_message(bad.validate()).contains("time_since_injury"));
    }

    #[test]
    fn test_surgery_requires_date() {
        let bad = IntakeAssessment {
            had_surgery: true,
            ..intake()
        };
        assert!(validation_message(bad.validate()).contains("surgery_date"));

        let good = IntakeAssessment {
            had_surgery: true,
            surgery_date: NaiveDate::from_ymd_opt(2023, 1, 10),
            ..intake()
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_prior_physio_requires_details() {
        let missing_completion = IntakeAssessment {
            had_prior_physiotherapy: true,
            physiotherapy_description: Some("Six sessions".into()),
            ..intake()
        };
        assert!(validation_message(missing_completion.validate())
            .contains("prior_physiotherapy_completed"));

        let blank_description = IntakeAssessment {
            had_prior_physiotherapy: true,
            prior_physiotherapy_completed: Some(false),
            physiotherapy_description: Some("  ".into()),
            ..intake()
        };
        assert!(validation_message(blank_description.validate())
            .contains("physiotherapy_description"));
    }

    #[test]
    fn test_feedback_ratings() {
        assert!(feedback().validate().is_ok());

        let bad = FeedbackEntry {
            exercise_tolerance: 12,
            ..feedback()
        };
        assert!(validation_message(bad.validate()).contains("exercise_tolerance"));
    }

    #[test]
    fn test_user_ids() {
        assert!(validate_user_id("alice_01").is_ok());
        assert!(validate_user_id("knee-rehab").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id(&"x".repeat(65)).is_err());
    }
}
