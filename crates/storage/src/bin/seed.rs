use std::fmt;

use chrono::{DateTime, Duration, Utc};
use pace_core::model::{Plan, PlanId, StudySession};
use storage::repository::{PlanRepository, Storage, StudySessionRepository};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    plan_id: PlanId,
    title: String,
    total_minutes: u32,
    days: u32,
    minutes_per_day: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPlanId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPlanId { raw } => write!(f, "invalid --plan-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
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

fn parse_u32(flag: &'static str, raw: String) -> Result<u32, ArgsError> {
    raw.parse::<u32>()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("PACE_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut plan_id = std::env::var("PACE_PLAN_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| PlanId::new(1), PlanId::new);
        let mut title = std::env::var("PACE_PLAN_TITLE").unwrap_or_else(|_| "Rust track".into());
        let mut total_minutes = 6000;
        let mut days = 7;
        let mut minutes_per_day = 60;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--plan-id" => {
                    let value = require_value(&mut args, "--plan-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPlanId { raw: value.clone() })?;
                    plan_id = PlanId::new(parsed);
                }
                "--title" => {
                    title = require_value(&mut args, "--title")?;
                }
                "--total-minutes" => {
                    let value = require_value(&mut args, "--total-minutes")?;
                    total_minutes = parse_u32("--total-minutes", value)?;
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = parse_u32("--days", value)?;
                }
                "--minutes-per-day" => {
                    let value = require_value(&mut args, "--minutes-per-day")?;
                    minutes_per_day = parse_u32("--minutes-per-day", value)?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
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
            title,
            total_minutes,
            days,
            minutes_per_day,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --plan-id <id>            Plan id to upsert (default: 1)");
    eprintln!("  --title <name>            Plan title (default: Rust track)");
    eprintln!("  --total-minutes <n>       Total estimated effort (default: 6000)");
    eprintln!("  --days <n>                Trailing days of study history to log (default: 7)");
    eprintln!("  --minutes-per-day <n>     Minutes logged per history day (default: 60)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  PACE_DB_URL, PACE_PLAN_ID, PACE_PLAN_TITLE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let today = now.date_naive();

    // Place the schedule so the seeded history sits three weeks in.
    let start_date = today - Duration::days(21);
    let target_date = today + Duration::days(61);

    let mut plan = Plan::new(
        args.plan_id,
        args.title.clone(),
        args.total_minutes,
        start_date,
        target_date,
        now,
    )?;

    for i in 0..args.days {
        let studied_on = today - Duration::days(i64::from(i));
        let session = StudySession::new(plan.id(), studied_on, args.minutes_per_day);
        storage.sessions.append_session(&session).await?;
        plan.record_study(args.minutes_per_day);
    }

    storage.plans.upsert_plan(&plan).await?;

    println!(
        "Seeded plan {} (\"{}\") with {} study days into {}",
        plan.id().value(),
        plan.title(),
        args.days,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
