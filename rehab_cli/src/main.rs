use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rehab_core::service::{FeedbackOutcome, IntakeOutcome, UserStatus};
use rehab_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rehab")]
#[command(about = "Rehabilitation level tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the one-time intake assessment and get a starting level
    Intake {
        #[arg(long)]
        user: String,

        #[arg(long, value_enum)]
        injury_type: InjuryArg,

        #[arg(long, value_enum)]
        time_since_injury: BucketArg,

        /// Pain rating (1-10)
        #[arg(long)]
        pain: i32,

        /// Stiffness rating (1-10)
        #[arg(long)]
        stiffness: i32,

        /// Swelling rating (1-10)
        #[arg(long)]
        swelling: i32,

        /// Injury was diagnosed by a professional
        #[arg(long)]
        diagnosed: bool,

        /// Pain during daily activities
        #[arg(long)]
        daily_activity_pain: bool,

        /// Date of surgery (YYYY-MM-DD), implies surgery
        #[arg(long, value_parser = parse_date)]
        surgery_date: Option<NaiveDate>,

        /// Had physiotherapy for this injury before
        #[arg(long)]
        prior_physio: bool,

        /// Prior physiotherapy was completed
        #[arg(long, requires = "prior_physio")]
        prior_physio_completed: bool,

        /// What the prior physiotherapy involved
        #[arg(long, requires = "prior_physio")]
        physio_description: Option<String>,
    },

    /// Submit post-exercise feedback and update the level
    Feedback {
        #[arg(long)]
        user: String,

        #[arg(long)]
        pain: i32,

        #[arg(long)]
        stiffness: i32,

        #[arg(long)]
        fatigue: i32,

        #[arg(long)]
        swelling: i32,

        /// Perceived strength (1-10)
        #[arg(long)]
        strength: i32,

        /// Functional improvement (1-10)
        #[arg(long)]
        function: i32,

        /// Exercise tolerance (1-10)
        #[arg(long)]
        tolerance: i32,
    },

    /// Show the current level and history counts
    Status {
        #[arg(long)]
        user: String,
    },

    /// Exercise report over the configured window
    Report {
        #[arg(long)]
        user: String,
    },

    /// Roll up the feedback journal to CSV
    Rollup {
        #[arg(long)]
        user: String,

        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InjuryArg {
    Shoulder,
    Knee,
}

impl From<InjuryArg> for InjuryType {
    fn from(arg: InjuryArg) -> Self {
        match arg {
            InjuryArg::Shoulder => InjuryType::Shoulder,
            InjuryArg::Knee => InjuryType::Knee,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BucketArg {
    #[value(name = "under_2_weeks")]
    Under2Weeks,
    #[value(name = "two_weeks_to_1_month")]
    TwoWeeksTo1Month,
    #[value(name = "1_to_3_months")]
    OneTo3Months,
    #[value(name = "3_to_6_months")]
    ThreeTo6Months,
    #[value(name = "over_6_months")]
    Over6Months,
}

impl From<BucketArg> for TimeSinceInjury {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Under2Weeks => TimeSinceInjury::LessThan2Weeks,
            BucketArg::TwoWeeksTo1Month => TimeSinceInjury::TwoWeeksTo1Month,
            BucketArg::OneTo3Months => TimeSinceInjury::OneTo3Months,
            BucketArg::ThreeTo6Months => TimeSinceInjury::ThreeTo6Months,
            BucketArg::Over6Months => TimeSinceInjury::SixPlusMonths,
        }
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        rehab_core::logging::init_with_level("debug");
    } else {
        rehab_core::logging::init();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let service = RehabService::new(UserStore::new(data_dir), config.levels.clone());

    match cli.command {
        Commands::Intake {
            user,
            injury_type,
            time_since_injury,
            pain,
            stiffness,
            swelling,
            diagnosed,
            daily_activity_pain,
            surgery_date,
            prior_physio,
            prior_physio_completed,
            physio_description,
        } => {
            let intake = IntakeAssessment {
                injury_type: injury_type.into(),
                time_since_injury: time_since_injury.into(),
                diagnosed_by_professional: diagnosed,
                pain_level: pain,
                stiffness,
                swelling,
                has_daily_activity_pain: daily_activity_pain,
                had_surgery: surgery_date.is_some(),
                surgery_date,
                had_prior_physiotherapy: prior_physio,
                prior_physiotherapy_completed: prior_physio.then_some(prior_physio_completed),
                physiotherapy_description: physio_description,
            };
            let outcome = service.submit_intake(&user, intake, Utc::now())?;
            display_intake(&user, &outcome);
        }

        Commands::Feedback {
            user,
            pain,
            stiffness,
            fatigue,
            swelling,
            strength,
            function,
            tolerance,
        } => {
            let entry = FeedbackEntry {
                pain_level: pain,
                stiffness,
                fatigue_level: fatigue,
                swelling,
                strength_perception: strength,
                functional_improvement: function,
                exercise_tolerance: tolerance,
            };
            let outcome = service.submit_feedback(&user, entry, Utc::now())?;
            display_feedback(&outcome);
        }

        Commands::Status { user } => {
            let status = service.status(&user)?;
            display_status(&status);
        }

        Commands::Report { user } => {
            let report = service.report(&user, Utc::now(), config.report.window_days)?;
            display_report(&user, &report);
        }

        Commands::Rollup { user, cleanup } => {
            let (archived, cleaned) = service.rollup(&user, cleanup)?;
            if archived == 0 {
                println!("No feedback journal found - nothing to roll up.");
            } else {
                println!("✓ Rolled up {} feedback entries to CSV", archived);
                println!(
                    "  CSV: {}",
                    service.store().feedback_csv_path(&user).display()
                );
            }
            if cleaned > 0 {
                println!("✓ Cleaned up {} processed journal files", cleaned);
            }
        }
    }

    Ok(())
}

fn display_intake(user: &str, outcome: &IntakeOutcome) {
    println!("✓ Intake recorded for {}", user);
    println!("  Level: {}", outcome.level);
    println!("  Score: {}", outcome.score);
    println!("  Intensity: {}", outcome.tier.description());
}

fn display_feedback(outcome: &FeedbackOutcome) {
    if outcome.flare_up {
        println!("⚠ Flare-up reported - exercise paused");
    } else {
        println!("✓ Feedback recorded");
    }
    println!("  Level: {} -> {}", outcome.previous_level, outcome.level);
    println!("  Score: {} -> {}", outcome.previous_score, outcome.score);
    println!("  Symptoms: {:?}", outcome.trend);
    println!("  Intensity: {}", outcome.tier.description());
}

fn display_status(status: &UserStatus) {
    println!("User: {}", status.user_id);
    match (status.level, status.tier) {
        (Some(level), Some(tier)) => {
            println!("  Level: {}", level);
            println!("  Intensity: {}", tier.description());
        }
        _ => println!("  Level: none (intake not recorded)"),
    }
    if let Some(score) = status.latest_score {
        println!("  Latest score: {}", score);
    }
    println!("  Feedback entries: {}", status.feedback_count);
}

fn display_report(user: &str, report: &ExerciseReport) {
    println!("Exercise report for {} (last {} days)", user, report.window_days);
    println!();
    if report.by_date.is_empty() {
        println!("  No sessions recorded");
    }
    for day in &report.by_date {
        println!("  {}  {} session(s)", day.date, day.count);
    }
    println!();
    for share in &report.by_period {
        println!("  {:<10} {:>6.2}%", share.period.as_str(), share.percentage);
    }
}
