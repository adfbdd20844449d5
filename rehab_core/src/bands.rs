//! Static lookup tables used by the level calculators.
//!
//! Every threshold the calculators branch on lives here as data so the
//! tables can be audited and tested on their own.

use crate::TimeSinceInjury;
use std::ops::RangeInclusive;

/// Inclusive value range worth a fixed number of points
#[derive(Debug)]
pub struct Band {
    pub range: RangeInclusive<i32>,
    pub points: i32,
}

const fn band(start: i32, end: i32, points: i32) -> Band {
    Band {
        range: RangeInclusive::new(start, end),
        points,
    }
}

/// Representative day count for each intake bucket
pub const INJURY_BUCKET_DAYS: &[(TimeSinceInjury, i32)] = &[
    (TimeSinceInjury::LessThan2Weeks, 7),
    (TimeSinceInjury::TwoWeeksTo1Month, 30),
    (TimeSinceInjury::OneTo3Months, 90),
    (TimeSinceInjury::ThreeTo6Months, 180),
    (TimeSinceInjury::SixPlusMonths, 365),
];

/// Points for days since injury
pub const TIME_SINCE_INJURY_POINTS: &[Band] = &[
    band(i32::MIN, 13, 1),
    band(14, 30, 2),
    band(31, 90, 3),
    band(91, 180, 4),
    band(181, i32::MAX, 5),
];

/// Points for pain, stiffness, fatigue and swelling ratings (lower is better)
pub const SYMPTOM_POINTS: &[Band] = &[band(1, 3, 5), band(4, 6, 3)];

/// Points for strength, function and tolerance ratings (higher is better)
pub const PERCEPTION_POINTS: &[Band] = &[band(1, 3, 1), band(4, 6, 3), band(7, 10, 5)];

/// Score-to-level mapping in 5-point steps
pub const SCORE_LEVELS: &[Band] = &[
    band(i32::MIN, 10, 1),
    band(11, 15, 2),
    band(16, 20, 3),
    band(21, 25, 4),
    band(26, 30, 5),
    band(31, 35, 6),
    band(36, 40, 7),
    band(41, 45, 8),
    band(46, 50, 9),
    band(51, i32::MAX, 10),
];

/// Symptom rating at or above which exercise stops
pub const SEVERE_SYMPTOM: i32 = 7;

/// Injuries this recent (in days) are too fresh for a program
pub const MIN_DAYS_SINCE_INJURY: i32 = 30;

/// Surgeries this recent (in days) bar exercise
pub const MIN_DAYS_SINCE_SURGERY: f64 = 90.0;

/// Surgeries older than this (in days) score the higher surgery band
pub const SURGERY_RECOVERED_DAYS: f64 = 180.0;

/// Score change needed to move one level
pub const LEVEL_STEP_THRESHOLD: i32 = 5;

/// Points for `value`, or 0 when no band contains it
pub fn points(table: &[Band], value: i32) -> i32 {
    table
        .iter()
        .find(|b| b.range.contains(&value))
        .map_or(0, |b| b.points)
}

/// Representative day count for a bucket (0 when unknown)
pub fn days_for_bucket(bucket: TimeSinceInjury) -> i32 {
    INJURY_BUCKET_DAYS
        .iter()
        .find(|(b, _)| *b == bucket)
        .map_or(0, |(_, days)| *days)
}

/// Level for an accumulated score, if any band matches
pub fn level_for_score(score: i32) -> Option<i32> {
    SCORE_LEVELS
        .iter()
        .find(|b| b.range.contains(&score))
        .map(|b| b.points)
}
