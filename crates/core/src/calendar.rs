use chrono::NaiveDate;

/// Signed whole-day difference `b - a`.
#[must_use]
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Length of a plan's schedule in days, floored at 1.
///
/// The floor keeps every downstream per-day division well-defined, including
/// same-day and inverted date ranges.
#[must_use]
pub fn days_total(start: NaiveDate, target: NaiveDate) -> u32 {
    let days = days_between(start, target).max(1);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Days spent inside the schedule so far, clamped into `[0, days_total]`.
///
/// Before the start date this is 0; past the target it stops at `days_total`.
#[must_use]
pub fn days_elapsed(start: NaiveDate, now: NaiveDate, days_total: u32) -> u32 {
    let elapsed = days_between(start, now).clamp(0, i64::from(days_total));
    u32::try_from(elapsed).unwrap_or(u32::MAX)
}

/// Days left until the target date; 0 once the target has passed.
#[must_use]
pub fn days_remaining(days_total: u32, days_elapsed: u32) -> u32 {
    days_total.saturating_sub(days_elapsed)
}
