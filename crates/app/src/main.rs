use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pace_core::model::{Plan, PlanId};
use pace_core::pace::{DEFAULT_WINDOW_DAYS, PaceMetrics, PaceStatus};
use services::{Clock, PaceService, PlanOverview, PlanService};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPlanId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidWindow { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPlanId { raw } => write!(f, "invalid --plan-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidWindow { raw } => write!(f, "invalid --window value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    plan_id: Option<PlanId>,
    window_days: u32,
    now: Option<DateTime<Utc>>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--plan-id <id>] [--window <days>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --plan-id <id>      Show one plan instead of every stored plan");
    eprintln!("  --window <days>     Trailing window for the daily average (default: 7)");
    eprintln!("  --now <rfc3339>     Fixed current time, for reproducible output");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PACE_DB_URL, PACE_PLAN_ID");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PACE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut plan_id = std::env::var("PACE_PLAN_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(PlanId::new);
        let mut window_days = DEFAULT_WINDOW_DAYS;
        let mut now: Option<DateTime<Utc>> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--plan-id" => {
                    let value = require_value(args, "--plan-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPlanId { raw: value.clone() })?;
                    plan_id = Some(PlanId::new(parsed));
                }
                "--window" => {
                    let value = require_value(args, "--window")?;
                    window_days = value
                        .parse::<u32>()
                        .ok()
                        .filter(|w| *w > 0)
                        .ok_or(ArgsError::InvalidWindow { raw: value })?;
                }
                "--now" => {
                    let value = require_value(args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            plan_id,
            window_days,
            now,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Render raw minutes as "Xh Ym"; the core refuses to own string formatting.
fn fmt_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn status_label(status: PaceStatus) -> &'static str {
    match status {
        PaceStatus::Completed => "completed",
        PaceStatus::OnTrack => "on track",
        PaceStatus::Attention => "needs attention",
        PaceStatus::AtRisk => "at risk",
    }
}

fn print_dashboard(plan: &Plan, metrics: &PaceMetrics) {
    println!(
        "[{}] {} :: {} ({}%)",
        plan.id(),
        plan.title(),
        status_label(metrics.status),
        metrics.progress_percent
    );
    println!(
        "  progress   {} of {} done, {} remaining",
        fmt_minutes(plan.completed_minutes()),
        fmt_minutes(plan.total_effort_minutes()),
        fmt_minutes(metrics.remaining_minutes)
    );
    println!(
        "  schedule   day {} of {}, {} days left (target {})",
        metrics.days_elapsed, metrics.days_total, metrics.days_remaining,
        plan.target_date()
    );
    println!(
        "  pace       need {}/day ({}/week), averaging {:.0}m/day over {} study days",
        fmt_minutes(metrics.required_minutes_per_day),
        fmt_minutes(metrics.required_minutes_per_week),
        metrics.current_daily_avg_minutes,
        metrics.study_days_in_window
    );
    match metrics.projected_finish_date {
        Some(date) => println!("  projection finishing around {date}"),
        None => println!("  projection none (no recent study activity)"),
    }
    if metrics.extra_minutes_needed_today > 0.0 {
        println!(
            "  nudge      add {:.0}m today to get back on pace",
            metrics.extra_minutes_needed_today
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    // The only place system time may enter; everything below takes the clock as given.
    let clock = args.now.map_or_else(Clock::default_clock, Clock::fixed);
    let plans = PlanService::new(
        clock,
        Arc::clone(&storage.plans),
        Arc::clone(&storage.sessions),
    );
    let pace = PaceService::with_window(
        clock,
        args.window_days,
        Arc::clone(&storage.plans),
        Arc::clone(&storage.sessions),
    )?;

    let overviews: Vec<PlanOverview> = match args.plan_id {
        Some(id) => {
            let plan = plans.get_plan(id).await?;
            let metrics = pace.metrics_for_plan(id).await?;
            vec![PlanOverview { plan, metrics }]
        }
        None => pace.overview(64).await?,
    };

    if overviews.is_empty() {
        println!("No plans stored yet. Seed one with: cargo run -p storage --bin seed");
        return Ok(());
    }

    for overview in &overviews {
        print_dashboard(&overview.plan, &overview.metrics);
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
