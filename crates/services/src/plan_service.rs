use std::sync::Arc;

use chrono::NaiveDate;
use pace_core::model::{Plan, PlanId, StudySession};
use storage::repository::{PlanRepository, StorageError, StudySessionRepository};

use crate::Clock;
use crate::error::PlanServiceError;

/// Orchestrates plan lifecycle and study logging.
///
/// Study completions go through here so the session log and the plan's
/// progress counter always move together.
#[derive(Clone)]
pub struct PlanService {
    clock: Clock,
    plans: Arc<dyn PlanRepository>,
    sessions: Arc<dyn StudySessionRepository>,
}

impl PlanService {
    #[must_use]
    pub fn new(
        clock: Clock,
        plans: Arc<dyn PlanRepository>,
        sessions: Arc<dyn StudySessionRepository>,
    ) -> Self {
        Self {
            clock,
            plans,
            sessions,
        }
    }

    /// Adopt a new plan and persist it with zero recorded progress.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Plan` for validation failures.
    /// Returns `PlanServiceError::Storage` if persistence fails.
    pub async fn adopt_plan(
        &self,
        id: PlanId,
        title: impl Into<String> + Send,
        total_effort_minutes: u32,
        start_date: NaiveDate,
        target_date: NaiveDate,
    ) -> Result<Plan, PlanServiceError> {
        let plan = Plan::new(
            id,
            title,
            total_effort_minutes,
            start_date,
            target_date,
            self.clock.now(),
        )?;
        self.plans.upsert_plan(&plan).await?;
        Ok(plan)
    }

    /// Fetch a plan by id.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` with `NotFound` if missing, or on
    /// repository failures.
    pub async fn get_plan(&self, id: PlanId) -> Result<Plan, PlanServiceError> {
        let plan = self
            .plans
            .get_plan(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(plan)
    }

    /// Record a completed study activity dated today.
    ///
    /// Appends a session row and advances the plan's completed minutes in one
    /// step; quizzes, guided sessions, and manual logs all land here.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the plan is missing or
    /// persistence fails.
    pub async fn record_study(&self, id: PlanId, minutes: u32) -> Result<Plan, PlanServiceError> {
        self.log_session(id, self.clock.today(), minutes).await
    }

    /// Record a study session with an explicit date (backfill logging).
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the plan is missing or
    /// persistence fails.
    pub async fn log_session(
        &self,
        id: PlanId,
        date: NaiveDate,
        minutes: u32,
    ) -> Result<Plan, PlanServiceError> {
        let mut plan = self.get_plan(id).await?;

        let session = StudySession::new(id, date, minutes);
        self.sessions.append_session(&session).await?;

        plan.record_study(minutes);
        self.plans.upsert_plan(&plan).await?;
        Ok(plan)
    }

    /// Replace a plan's schedule dates.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the plan is missing or
    /// persistence fails.
    pub async fn set_dates(
        &self,
        id: PlanId,
        start_date: NaiveDate,
        target_date: NaiveDate,
    ) -> Result<Plan, PlanServiceError> {
        let mut plan = self.get_plan(id).await?;
        plan.set_dates(start_date, target_date);
        self.plans.upsert_plan(&plan).await?;
        Ok(plan)
    }

    /// Restart a plan: zero its progress and drop its session log.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the plan is missing or
    /// persistence fails.
    pub async fn reset_plan(&self, id: PlanId) -> Result<Plan, PlanServiceError> {
        let mut plan = self.get_plan(id).await?;
        plan.reset_progress();
        self.sessions.delete_sessions_for_plan(id).await?;
        self.plans.upsert_plan(&plan).await?;
        Ok(plan)
    }
}
