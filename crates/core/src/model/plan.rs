use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::PlanId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlanError {
    #[error("plan title cannot be empty")]
    EmptyTitle,
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

/// A goal, track, or program whose study effort is tracked against a deadline.
///
/// Two shapes of bad data are tolerated rather than rejected:
/// - `completed_minutes` may drift above `total_effort_minutes` in storage
///   (e.g. after a plan is resized down); readers always see the clamped value.
/// - an inverted date range (`target_date < start_date`) is kept as written;
///   the pace engine treats such a plan as already overdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    id: PlanId,
    title: String,
    total_effort_minutes: u32,
    completed_minutes: u32,
    start_date: NaiveDate,
    target_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl Plan {
    /// Create a freshly adopted plan with no recorded progress.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::EmptyTitle` if the title is blank.
    pub fn new(
        id: PlanId,
        title: impl Into<String>,
        total_effort_minutes: u32,
        start_date: NaiveDate,
        target_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        Self::from_persisted(
            id,
            title,
            total_effort_minutes,
            0,
            start_date,
            target_date,
            created_at,
        )
    }

    /// Rehydrate a plan from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::EmptyTitle` if the title is blank.
    pub fn from_persisted(
        id: PlanId,
        title: impl Into<String>,
        total_effort_minutes: u32,
        completed_minutes: u32,
        start_date: NaiveDate,
        target_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PlanError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            total_effort_minutes,
            completed_minutes,
            start_date,
            target_date,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> PlanId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn total_effort_minutes(&self) -> u32 {
        self.total_effort_minutes
    }

    /// Minutes of completed effort, clamped to the plan total.
    #[must_use]
    pub fn completed_minutes(&self) -> u32 {
        self.completed_minutes.min(self.total_effort_minutes)
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record a completed study activity against this plan.
    pub fn record_study(&mut self, minutes: u32) {
        self.completed_minutes = self.completed_minutes.saturating_add(minutes);
    }

    /// Replace the plan's date range.
    ///
    /// An inverted range is accepted; the engine reads it as overdue.
    pub fn set_dates(&mut self, start_date: NaiveDate, target_date: NaiveDate) {
        self.start_date = start_date;
        self.target_date = target_date;
    }

    /// Zero out recorded progress, e.g. when a plan is restarted.
    pub fn reset_progress(&mut self) {
        self.completed_minutes = 0;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
