#![forbid(unsafe_code)]

//! Core domain model and business logic for the rehab level tracker.
//!
//! This crate provides:
//! - Domain types (intake assessments, feedback entries, level/score records)
//! - Level calculators (initial intake scoring, feedback-driven updates)
//! - Symptom trend classification and input validation
//! - Persistence (per-user state, JSONL journals, CSV archive)
//! - The orchestration service tying it together

pub mod types;
pub mod error;
pub mod bands;
pub mod initial;
pub mod update;
pub mod trend;
pub mod validation;
pub mod config;
pub mod logging;
pub mod wal;
pub mod csv_rollup;
pub mod state;
pub mod history;
pub mod report;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use initial::compute_initial_level;
pub use update::{compute_updated_level, is_flare_up};
pub use trend::classify_symptoms;
pub use wal::{JsonlSink, RecordSink};
pub use history::load_recent_feedback;
pub use report::{build_report, ExerciseReport};
pub use service::{clamp_feedback_level, RehabService, UserStore};
