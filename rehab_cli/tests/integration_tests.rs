//! Integration tests for the rehab binary.
//!
//! These tests verify end-to-end behavior including:
//! - Intake scoring and the one-intake-per-user rule
//! - Feedback-driven level changes and flare-up halts
//! - Status, report and CSV rollup output

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI bound to `data_dir`, isolated from any real user config
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rehab"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env("RUST_LOG", "warn")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// Intake scoring 26 (level 5)
fn reference_intake(data_dir: &Path, user: &str) -> Command {
    let mut cmd = cli(data_dir);
    cmd.args([
        "intake",
        "--user",
        user,
        "--injury-type",
        "knee",
        "--time-since-injury",
        "3_to_6_months",
        "--pain",
        "2",
        "--stiffness",
        "2",
        "--swelling",
        "2",
        "--diagnosed",
    ]);
    cmd
}

fn feedback(data_dir: &Path, user: &str, ratings: [i32; 7]) -> Command {
    let flags = [
        "--pain",
        "--stiffness",
        "--fatigue",
        "--swelling",
        "--strength",
        "--function",
        "--tolerance",
    ];
    let mut cmd = cli(data_dir);
    cmd.args(["feedback", "--user", user]);
    for (flag, value) in flags.iter().zip(ratings) {
        cmd.arg(flag).arg(value.to_string());
    }
    cmd
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("rehab"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rehabilitation level tracker"));
}

#[test]
fn test_intake_reports_starting_level() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    reference_intake(data_dir, "alice")
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 5"))
        .stdout(predicate::str::contains("Score: 26"))
        .stdout(predicate::str::contains("Mid-Level exercise"));

    let state_path = data_dir.join("users/alice/state.json");
    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(state_path).unwrap()).unwrap();
    assert_eq!(state["level"], 5);
    assert_eq!(
        state["intake"]["assessment"]["time_since_injury"],
        "THREE_TO_6_MONTHS"
    );
}

#[test]
fn test_second_intake_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    reference_intake(data_dir, "alice").assert().success();
    reference_intake(data_dir, "alice")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already added"));
}

#[test]
fn test_recent_injury_halts() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args([
            "intake",
            "--user",
            "bob",
            "--injury-type",
            "shoulder",
            "--time-since-injury",
            "two_weeks_to_1_month",
            "--pain",
            "2",
            "--stiffness",
            "2",
            "--swelling",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 0"))
        .stdout(predicate::str::contains("No exercise"));
}

#[test]
fn test_recent_surgery_halts() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let surgery = (Utc::now() - Duration::days(10)).date_naive().to_string();

    reference_intake(data_dir, "carol")
        .args(["--surgery-date", &surgery])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 0"));
}

#[test]
fn test_old_surgery_scores() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // Surgery over 180 days ago scores 4 instead of 5
    reference_intake(data_dir, "carol")
        .args(["--surgery-date", "2000-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 25"))
        .stdout(predicate::str::contains("Level: 4"));
}

#[test]
fn test_invalid_surgery_date_rejected() {
    let temp_dir = setup_test_dir();

    reference_intake(temp_dir.path(), "carol")
        .args(["--surgery-date", "01/02/2020"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn test_unknown_bucket_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "intake",
            "--user",
            "dan",
            "--injury-type",
            "knee",
            "--time-since-injury",
            "yesterday",
            "--pain",
            "2",
            "--stiffness",
            "2",
            "--swelling",
            "2",
        ])
        .assert()
        .failure();
    assert!(!temp_dir.path().join("users/dan").exists());
}

#[test]
fn test_out_of_range_rating_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    reference_intake(data_dir, "alice").assert().success();
    feedback(data_dir, "alice", [2, 2, 2, 2, 8, 8, 11])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exercise_tolerance"));
}

#[test]
fn test_feedback_requires_intake() {
    let temp_dir = setup_test_dir();

    feedback(temp_dir.path(), "erin", [2, 2, 2, 2, 8, 8, 8])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No initial assessment"));
}

#[test]
fn test_feedback_steps_level() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    reference_intake(data_dir, "alice").assert().success();

    feedback(data_dir, "alice", [2, 2, 2, 2, 8, 8, 8])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 5 -> 6"))
        .stdout(predicate::str::contains("Score: 26 -> 35"))
        .stdout(predicate::str::contains("Improving"));

    // 19 vs 35 steps back down
    feedback(data_dir, "alice", [5, 5, 5, 5, 8, 2, 2])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 6 -> 5"));

    cli(data_dir)
        .args(["status", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 5"))
        .stdout(predicate::str::contains("Latest score: 19"))
        .stdout(predicate::str::contains("Feedback entries: 2"));
}

#[test]
fn test_flare_up_pauses_exercise() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    reference_intake(data_dir, "alice").assert().success();
    feedback(data_dir, "alice", [2, 2, 9, 2, 8, 8, 8])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flare-up"))
        .stdout(predicate::str::contains("Level: 5 -> 0"))
        .stdout(predicate::str::contains("Flaring"));
}

#[test]
fn test_flare_up_floor_from_config() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let config_dir = data_dir.join("config/rehab");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[levels]\nhold_halt_on_flare_up = false\n",
    )
    .unwrap();

    reference_intake(data_dir, "alice").assert().success();
    feedback(data_dir, "alice", [8, 2, 2, 2, 8, 8, 8])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level: 5 -> 1"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let config_dir = data_dir.join("config/rehab");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[levels]\nmin_active_level = 8\nmax_level = 3\n",
    )
    .unwrap();

    cli(data_dir)
        .args(["status", "--user", "alice"])
        .assert()
        .failure();
}

#[test]
fn test_status_without_intake() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["status", "--user", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intake not recorded"))
        .stdout(predicate::str::contains("Feedback entries: 0"));
}

#[test]
fn test_report_counts_todays_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let today = Utc::now().date_naive().to_string();

    reference_intake(data_dir, "alice").assert().success();
    for _ in 0..2 {
        feedback(data_dir, "alice", [2, 2, 2, 2, 8, 8, 8])
            .assert()
            .success();
    }

    cli(data_dir)
        .args(["report", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last 14 days"))
        .stdout(predicate::str::contains(format!("{}  2 session(s)", today)))
        .stdout(predicate::str::contains("100.00%"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    reference_intake(data_dir, "alice").assert().success();
    for _ in 0..3 {
        feedback(data_dir, "alice", [3, 3, 3, 3, 5, 5, 5])
            .assert()
            .success();
    }

    cli(data_dir)
        .args(["rollup", "--user", "alice", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 feedback entries"))
        .stdout(predicate::str::contains("Cleaned up 1 processed journal"));

    let user_dir = data_dir.join("users/alice");
    let csv_content = fs::read_to_string(user_dir.join("feedback.csv")).unwrap();
    assert!(csv_content.starts_with("id,submitted_at,pain_level"));
    assert!(!user_dir.join("feedback.wal").exists());
    assert!(!user_dir.join("feedback.wal.processed").exists());

    // History survives the rollup
    cli(data_dir)
        .args(["status", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Feedback entries: 3"));
}

#[test]
fn test_rollup_without_journal() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["rollup", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_path_like_user_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["status", "--user", "../etc"])
        .assert()
        .failure();
}

#[test]
fn test_verbose_logs_to_stderr() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .env_remove("RUST_LOG")
        .args(["--verbose", "status", "--user", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEBUG").not())
        .stderr(predicate::str::contains("starting fresh"));
}
