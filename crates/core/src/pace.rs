use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::calendar;
use crate::model::{Plan, StudySession};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaceError {
    #[error("trailing window must be at least 1 day, got {provided}")]
    InvalidWindow { provided: u32 },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Traffic-light classification of a plan's study pace.
///
/// Derived by comparing the user's recent daily average against the pace
/// required to finish on time. A finished plan is `Completed` regardless of
/// what the session log says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    /// All estimated effort has been completed.
    Completed,
    /// Current pace meets or beats the required pace.
    OnTrack,
    /// Current pace covers at least 70% of the required pace.
    Attention,
    /// Current pace covers less than 70% of the required pace.
    AtRisk,
}

impl PaceStatus {
    /// Stable snake_case name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PaceStatus::Completed => "completed",
            PaceStatus::OnTrack => "on_track",
            PaceStatus::Attention => "attention",
            PaceStatus::AtRisk => "at_risk",
        }
    }

    /// True for `Completed` and `OnTrack`.
    #[must_use]
    pub fn is_on_track(self) -> bool {
        matches!(self, PaceStatus::Completed | PaceStatus::OnTrack)
    }
}

//
// ─── METRICS ───────────────────────────────────────────────────────────────────
//

/// Derived pace snapshot for one plan.
///
/// Never persisted; recomputed on demand from `{Plan, session log, today}`.
/// All quantities are raw units (minutes, whole days) so rendering stays a
/// presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceMetrics {
    pub progress_percent: u32,
    pub remaining_minutes: u32,
    pub days_total: u32,
    pub days_elapsed: u32,
    pub days_remaining: u32,
    pub required_minutes_per_day: u32,
    pub required_minutes_per_week: u32,
    pub current_daily_avg_minutes: f64,
    pub study_days_in_window: u32,
    pub current_weekly_hours: f64,
    pub pace_ratio: f64,
    pub status: PaceStatus,
    pub on_track: bool,
    pub projected_finish_date: Option<NaiveDate>,
    pub extra_minutes_needed_today: f64,
}

//
// ─── CALCULATOR ────────────────────────────────────────────────────────────────
//

/// Trailing-window length used when none is configured, in calendar days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Computes progress, pace, and completion projections for a plan.
///
/// This is the single implementation every surface calls; it owns all the
/// rounding and clamping rules so no two dashboards can disagree. It is pure:
/// identical `{plan, sessions, today}` inputs always produce identical
/// metrics, and malformed inputs (inverted dates, overshooting progress)
/// clamp to pessimistic-but-defined values instead of failing.
///
/// # Examples
///
/// ```
/// # use pace_core::pace::{PaceCalculator, PaceStatus};
/// # use pace_core::model::{Plan, PlanId};
/// # use pace_core::time::fixed_now;
/// # use chrono::NaiveDate;
/// let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let target = NaiveDate::from_ymd_opt(2026, 3, 24).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 1, 24).unwrap();
/// let plan = Plan::from_persisted(
///     PlanId::new(1), "Rust track", 6000, 2520, start, target, fixed_now(),
/// )?;
///
/// let metrics = PaceCalculator::new().metrics(&plan, &[], today);
/// assert_eq!(metrics.progress_percent, 42);
/// assert_eq!(metrics.required_minutes_per_day, 59);
/// assert_eq!(metrics.status, PaceStatus::AtRisk);
/// # Ok::<(), pace_core::model::PlanError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceCalculator {
    window_days: u32,
}

impl PaceCalculator {
    /// Create a calculator with the default 7-day trailing window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Create a calculator with a custom trailing-window length.
    ///
    /// # Errors
    ///
    /// Returns `PaceError::InvalidWindow` if `window_days` is 0; the daily
    /// average divides by the window length.
    pub fn try_with_window(window_days: u32) -> Result<Self, PaceError> {
        if window_days == 0 {
            return Err(PaceError::InvalidWindow {
                provided: window_days,
            });
        }
        Ok(Self { window_days })
    }

    #[must_use]
    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Effort still outstanding, in minutes.
    #[must_use]
    pub fn remaining_minutes(plan: &Plan) -> u32 {
        plan.total_effort_minutes()
            .saturating_sub(plan.completed_minutes())
    }

    /// Completion ratio as a whole percentage in `[0, 100]`.
    ///
    /// An unsized plan (`total == 0`) reads as 0% rather than erroring.
    #[must_use]
    pub fn progress_percent(plan: &Plan) -> u32 {
        let total = plan.total_effort_minutes();
        if total == 0 {
            return 0;
        }
        let percent =
            (100.0 * f64::from(plan.completed_minutes()) / f64::from(total)).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = percent as u32;
        percent.min(100)
    }

    /// Pace needed to close `remaining` minutes by the target date.
    ///
    /// The divisor is floored at 1, so an overdue plan owes its entire
    /// remainder "today".
    #[must_use]
    pub fn required_minutes_per_day(remaining: u32, days_remaining: u32) -> u32 {
        if remaining == 0 {
            return 0;
        }
        remaining.div_ceil(days_remaining.max(1))
    }

    /// Average minutes per day over the trailing window ending `today`.
    ///
    /// The sum divides by the window length, not by the count of active
    /// days, so rest days pull the average down; a two-day burst rates
    /// below the same effort spread across the week.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn current_daily_avg_minutes(&self, sessions: &[StudySession], today: NaiveDate) -> f64 {
        let sum = window_sum(sessions, self.window_start(today), today);
        sum as f64 / f64::from(self.window_days)
    }

    /// Count of distinct days in the window with any recorded study.
    #[must_use]
    pub fn study_days_in_window(&self, sessions: &[StudySession], today: NaiveDate) -> u32 {
        let start = self.window_start(today);
        let days: HashSet<NaiveDate> = sessions
            .iter()
            .filter(|s| s.minutes_studied > 0 && s.date >= start && s.date <= today)
            .map(|s| s.date)
            .collect();
        u32::try_from(days.len()).unwrap_or(u32::MAX)
    }

    /// Hours studied over the most recent 7 days.
    ///
    /// Always a 7-day figure, independent of the configured window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn current_weekly_hours(sessions: &[StudySession], today: NaiveDate) -> f64 {
        let start = today - Duration::days(i64::from(DEFAULT_WINDOW_DAYS) - 1);
        window_sum(sessions, start, today) as f64 / 60.0
    }

    /// Ratio of current pace to required pace; 1 when nothing is required.
    #[must_use]
    pub fn pace_ratio(current_daily_avg: f64, required_per_day: u32) -> f64 {
        if required_per_day == 0 {
            return 1.0;
        }
        current_daily_avg / f64::from(required_per_day)
    }

    /// Classify a plan's pace. Completion wins over any pace reading.
    #[must_use]
    pub fn classify(progress_percent: u32, pace_ratio: f64) -> PaceStatus {
        if progress_percent >= 100 {
            PaceStatus::Completed
        } else if pace_ratio >= 1.0 {
            PaceStatus::OnTrack
        } else if pace_ratio >= 0.7 {
            PaceStatus::Attention
        } else {
            PaceStatus::AtRisk
        }
    }

    /// Extrapolated finish date assuming the current pace continues.
    ///
    /// A finished plan projects to `today`. Remaining work with zero
    /// observed pace has no finite projection and yields `None`.
    #[must_use]
    pub fn projected_finish_date(
        remaining: u32,
        current_daily_avg: f64,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        if remaining == 0 {
            return Some(today);
        }
        if current_daily_avg <= 0.0 {
            return None;
        }
        let days_to_finish = (f64::from(remaining) / current_daily_avg).ceil();
        #[allow(clippy::cast_possible_truncation)]
        let days_to_finish = days_to_finish as i64;
        today.checked_add_signed(Duration::days(days_to_finish))
    }

    /// Compute the full derived snapshot for one plan.
    #[must_use]
    pub fn metrics(
        &self,
        plan: &Plan,
        sessions: &[StudySession],
        today: NaiveDate,
    ) -> PaceMetrics {
        let days_total = calendar::days_total(plan.start_date(), plan.target_date());
        let days_elapsed = calendar::days_elapsed(plan.start_date(), today, days_total);
        let days_remaining = calendar::days_remaining(days_total, days_elapsed);

        let remaining_minutes = Self::remaining_minutes(plan);
        let progress_percent = Self::progress_percent(plan);

        let required_minutes_per_day =
            Self::required_minutes_per_day(remaining_minutes, days_remaining);
        let required_minutes_per_week = required_minutes_per_day.saturating_mul(7);

        let current_daily_avg_minutes = self.current_daily_avg_minutes(sessions, today);
        let study_days_in_window = self.study_days_in_window(sessions, today);
        let current_weekly_hours = Self::current_weekly_hours(sessions, today);

        let pace_ratio = Self::pace_ratio(current_daily_avg_minutes, required_minutes_per_day);
        let status = Self::classify(progress_percent, pace_ratio);

        let projected_finish_date =
            Self::projected_finish_date(remaining_minutes, current_daily_avg_minutes, today);
        let extra_minutes_needed_today =
            (f64::from(required_minutes_per_day) - current_daily_avg_minutes).max(0.0);

        PaceMetrics {
            progress_percent,
            remaining_minutes,
            days_total,
            days_elapsed,
            days_remaining,
            required_minutes_per_day,
            required_minutes_per_week,
            current_daily_avg_minutes,
            study_days_in_window,
            current_weekly_hours,
            pace_ratio,
            status,
            on_track: status.is_on_track(),
            projected_finish_date,
            extra_minutes_needed_today,
        }
    }

    fn window_start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.window_days) - 1)
    }
}

impl Default for PaceCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Total minutes across sessions dated within `[start, end]`.
///
/// Same-day sessions are additive; ordering of the log is irrelevant.
fn window_sum(sessions: &[StudySession], start: NaiveDate, end: NaiveDate) -> u64 {
    sessions
        .iter()
        .filter(|s| s.date >= start && s.date <= end)
        .map(|s| u64::from(s.minutes_studied))
        .sum()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
