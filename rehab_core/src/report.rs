//! Exercise report over recent feedback.
//!
//! Feedback is submitted after each exercise session, so feedback counts
//! double as an exercise log.

use crate::FeedbackRecord;
use chrono::{NaiveDate, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

/// Part of the day a session fell in (UTC)
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 3] = [DayPeriod::Morning, DayPeriod::Afternoon, DayPeriod::Evening];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            _ => DayPeriod::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "morning",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PeriodShare {
    pub period: DayPeriod,
    pub percentage: f64,
}

/// Sessions per day and their spread across the day
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExerciseReport {
    pub window_days: i64,
    pub by_date: Vec<DateCount>,
    pub by_period: Vec<PeriodShare>,
}

/// Build a report from feedback already filtered to the window
pub fn build_report(records: &[FeedbackRecord], window_days: i64) -> ExerciseReport {
    let mut per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut per_period: BTreeMap<DayPeriod, usize> = BTreeMap::new();

    for record in records {
        *per_date.entry(record.submitted_at.date_naive()).or_default() += 1;
        *per_period
            .entry(DayPeriod::from_hour(record.submitted_at.hour()))
            .or_default() += 1;
    }

    let total = records.len();
    let by_period = DayPeriod::ALL
        .iter()
        .map(|&period| {
            let count = per_period.get(&period).copied().unwrap_or(0);
            PeriodShare {
                period,
                percentage: percentage(count, total),
            }
        })
        .collect();

    ExerciseReport {
        window_days,
        by_date: per_date
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect(),
        by_period,
    }
}

/// Share of `total`, rounded to two decimals (0.0 for an empty total)
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}
