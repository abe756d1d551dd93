use std::sync::Arc;

use chrono::Duration;
use pace_core::model::{Plan, PlanId, StudySession};
use pace_core::pace::{DEFAULT_WINDOW_DAYS, PaceCalculator, PaceMetrics};
use storage::repository::{PlanRepository, StorageError, StudySessionRepository};

use crate::Clock;
use crate::error::PaceServiceError;

/// One plan with its derived pace snapshot, for dashboard surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOverview {
    pub plan: Plan,
    pub metrics: PaceMetrics,
}

/// Storage-backed pace queries.
///
/// Loads a plan and its session log, then hands both to the pure
/// `PaceCalculator` at the clock's current date. Metrics are recomputed per
/// call; the engine is cheap enough that no caching layer sits here.
#[derive(Clone)]
pub struct PaceService {
    clock: Clock,
    calculator: PaceCalculator,
    plans: Arc<dyn PlanRepository>,
    sessions: Arc<dyn StudySessionRepository>,
}

impl PaceService {
    /// Create a service using the default 7-day trailing window.
    #[must_use]
    pub fn new(
        clock: Clock,
        plans: Arc<dyn PlanRepository>,
        sessions: Arc<dyn StudySessionRepository>,
    ) -> Self {
        Self {
            clock,
            calculator: PaceCalculator::new(),
            plans,
            sessions,
        }
    }

    /// Create a service with a custom trailing-window length.
    ///
    /// # Errors
    ///
    /// Returns `PaceServiceError::Pace` if the window is 0 days.
    pub fn with_window(
        clock: Clock,
        window_days: u32,
        plans: Arc<dyn PlanRepository>,
        sessions: Arc<dyn StudySessionRepository>,
    ) -> Result<Self, PaceServiceError> {
        let calculator = PaceCalculator::try_with_window(window_days)?;
        Ok(Self {
            clock,
            calculator,
            plans,
            sessions,
        })
    }

    #[must_use]
    pub fn calculator(&self) -> &PaceCalculator {
        &self.calculator
    }

    /// Compute the pace snapshot for one plan.
    ///
    /// # Errors
    ///
    /// Returns `PaceServiceError::Storage` with `NotFound` if the plan is
    /// missing, or on repository failures.
    pub async fn metrics_for_plan(&self, id: PlanId) -> Result<PaceMetrics, PaceServiceError> {
        let plan = self
            .plans
            .get_plan(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        let sessions = self.recent_sessions(id).await?;
        Ok(self
            .calculator
            .metrics(&plan, &sessions, self.clock.today()))
    }

    /// Compute pace snapshots for every stored plan, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PaceServiceError::Storage` if repository access fails.
    pub async fn overview(&self, limit: u32) -> Result<Vec<PlanOverview>, PaceServiceError> {
        let plans = self.plans.list_plans(limit).await?;
        let today = self.clock.today();

        let mut out = Vec::with_capacity(plans.len());
        for plan in plans {
            let sessions = self.recent_sessions(plan.id()).await?;
            let metrics = self.calculator.metrics(&plan, &sessions, today);
            out.push(PlanOverview { plan, metrics });
        }
        Ok(out)
    }

    /// Sessions young enough to matter to any window the calculator reads.
    ///
    /// The weekly figure is always 7 days, so the fetch horizon is the wider
    /// of the configured window and 7. The engine re-filters precisely.
    async fn recent_sessions(&self, id: PlanId) -> Result<Vec<StudySession>, StorageError> {
        let horizon = self.calculator.window_days().max(DEFAULT_WINDOW_DAYS);
        let from = self.clock.today() - Duration::days(i64::from(horizon) - 1);
        self.sessions.list_sessions_since(id, from).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pace_core::pace::PaceStatus;
    use pace_core::time::fixed_clock;
    use storage::repository::Storage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_plan(storage: &Storage, total: u32) -> PlanId {
        let today = fixed_clock().today();
        let plan = pace_core::model::Plan::new(
            PlanId::new(1),
            "Rust track",
            total,
            today - Duration::days(23),
            today + Duration::days(59),
            fixed_clock().now(),
        )
        .unwrap();
        storage.plans.upsert_plan(&plan).await.unwrap();
        plan.id()
    }

    #[tokio::test]
    async fn metrics_for_missing_plan_is_not_found() {
        let storage = Storage::in_memory();
        let service = PaceService::new(
            fixed_clock(),
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        );

        let err = service.metrics_for_plan(PlanId::new(42)).await.unwrap_err();
        assert!(matches!(
            err,
            PaceServiceError::Storage(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn empty_log_degrades_to_at_risk() {
        let storage = Storage::in_memory();
        let id = seed_plan(&storage, 6000).await;
        let service = PaceService::new(
            fixed_clock(),
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        );

        let metrics = service.metrics_for_plan(id).await.unwrap();
        assert_eq!(metrics.current_daily_avg_minutes, 0.0);
        assert_eq!(metrics.status, PaceStatus::AtRisk);
        assert_eq!(metrics.projected_finish_date, None);
    }

    #[tokio::test]
    async fn logged_week_reaches_on_track() {
        let storage = Storage::in_memory();
        let id = seed_plan(&storage, 6000).await;
        let today = fixed_clock().today();

        for i in 0..7 {
            let session =
                StudySession::new(id, today - Duration::days(i), 60);
            storage.sessions.append_session(&session).await.unwrap();
        }

        let service = PaceService::new(
            fixed_clock(),
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        );

        let metrics = service.metrics_for_plan(id).await.unwrap();
        assert_eq!(metrics.current_daily_avg_minutes, 60.0);
        assert_eq!(metrics.study_days_in_window, 7);
        assert_eq!(metrics.status, PaceStatus::OnTrack);
    }

    #[tokio::test]
    async fn custom_window_widens_the_average() {
        let storage = Storage::in_memory();
        let id = seed_plan(&storage, 6000).await;
        let today = fixed_clock().today();

        // One heavy day inside the last fortnight but outside the last week.
        let session = StudySession::new(id, today - Duration::days(10), 840);
        storage.sessions.append_session(&session).await.unwrap();

        let weekly = PaceService::new(
            fixed_clock(),
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        );
        let fortnightly = PaceService::with_window(
            fixed_clock(),
            14,
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        )
        .unwrap();

        assert_eq!(
            weekly
                .metrics_for_plan(id)
                .await
                .unwrap()
                .current_daily_avg_minutes,
            0.0
        );
        assert_eq!(
            fortnightly
                .metrics_for_plan(id)
                .await
                .unwrap()
                .current_daily_avg_minutes,
            60.0
        );
    }

    #[tokio::test]
    async fn zero_window_is_rejected() {
        let storage = Storage::in_memory();
        let err = PaceService::with_window(
            fixed_clock(),
            0,
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        )
        .err()
        .unwrap();
        assert!(matches!(err, PaceServiceError::Pace(_)));
    }

    #[tokio::test]
    async fn overview_covers_every_plan() {
        let storage = Storage::in_memory();
        let today = fixed_clock().today();

        for (id, completed) in [(1_u64, 0_u32), (2, 600)] {
            let mut plan = pace_core::model::Plan::new(
                PlanId::new(id),
                format!("Plan {id}"),
                600,
                date(2023, 10, 1),
                today + Duration::days(30),
                fixed_clock().now(),
            )
            .unwrap();
            plan.record_study(completed);
            storage.plans.upsert_plan(&plan).await.unwrap();
        }

        let service = PaceService::new(
            fixed_clock(),
            Arc::clone(&storage.plans),
            Arc::clone(&storage.sessions),
        );

        let overview = service.overview(10).await.unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].metrics.status, PaceStatus::AtRisk);
        assert_eq!(overview[1].metrics.status, PaceStatus::Completed);
        assert_eq!(overview[1].metrics.progress_percent, 100);
    }
}
