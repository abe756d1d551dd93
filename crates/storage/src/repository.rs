use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pace_core::model::{Plan, PlanError, PlanId, StudySession};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a plan.
///
/// This mirrors the domain `Plan` so repositories can serialize/deserialize
/// without leaking storage concerns into the domain layer. The raw
/// `completed_minutes` is carried as stored; clamping stays a read-side
/// domain rule.
#[derive(Debug, Clone)]
pub struct PlanRecord {
    pub id: PlanId,
    pub title: String,
    pub total_effort_minutes: u32,
    pub completed_minutes: u32,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    #[must_use]
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            id: plan.id(),
            title: plan.title().to_owned(),
            total_effort_minutes: plan.total_effort_minutes(),
            completed_minutes: plan.completed_minutes(),
            start_date: plan.start_date(),
            target_date: plan.target_date(),
            created_at: plan.created_at(),
        }
    }

    /// Convert the record back into a domain `Plan`.
    ///
    /// # Errors
    ///
    /// Returns `PlanError` if the stored title fails validation.
    pub fn into_plan(self) -> Result<Plan, PlanError> {
        Plan::from_persisted(
            self.id,
            self.title,
            self.total_effort_minutes,
            self.completed_minutes,
            self.start_date,
            self.target_date,
            self.created_at,
        )
    }
}

/// Repository contract for plans.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Persist or update a plan.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the plan cannot be stored.
    async fn upsert_plan(&self, plan: &Plan) -> Result<(), StorageError>;

    /// Fetch a plan by ID, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_plan(&self, id: PlanId) -> Result<Option<Plan>, StorageError>;

    /// List plans up to the given limit, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_plans(&self, limit: u32) -> Result<Vec<Plan>, StorageError>;
}

/// Repository contract for the append-only study session log.
#[async_trait]
pub trait StudySessionRepository: Send + Sync {
    /// Append one session row and return its storage id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn append_session(&self, session: &StudySession) -> Result<i64, StorageError>;

    /// All sessions for a plan, ordered by date then insertion.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sessions(&self, plan_id: PlanId) -> Result<Vec<StudySession>, StorageError>;

    /// Sessions for a plan dated `from` or later.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sessions_since(
        &self,
        plan_id: PlanId,
        from: NaiveDate,
    ) -> Result<Vec<StudySession>, StorageError>;

    /// Remove a plan's entire session log; returns the number of rows removed.
    ///
    /// Used only when a plan is reset.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn delete_sessions_for_plan(&self, plan_id: PlanId) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    plans: Arc<Mutex<HashMap<PlanId, Plan>>>,
    sessions: Arc<Mutex<Vec<(i64, StudySession)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            plans: Arc::new(Mutex::new(HashMap::new())),
            sessions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl PlanRepository for InMemoryRepository {
    async fn upsert_plan(&self, plan: &Plan) -> Result<(), StorageError> {
        let mut guard = self
            .plans
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(plan.id(), plan.clone());
        Ok(())
    }

    async fn get_plan(&self, id: PlanId) -> Result<Option<Plan>, StorageError> {
        let guard = self
            .plans
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_plans(&self, limit: u32) -> Result<Vec<Plan>, StorageError> {
        let guard = self
            .plans
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut plans: Vec<Plan> = guard.values().cloned().collect();
        plans.sort_by_key(|p| (p.created_at(), p.id().value()));
        plans.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(plans)
    }
}

#[async_trait]
impl StudySessionRepository for InMemoryRepository {
    async fn append_session(&self, session: &StudySession) -> Result<i64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("session id overflow".into()))?
            + 1;
        guard.push((id, session.clone()));
        Ok(id)
    }

    async fn list_sessions(&self, plan_id: PlanId) -> Result<Vec<StudySession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<(i64, StudySession)> = guard
            .iter()
            .filter(|(_, s)| s.plan_id == plan_id)
            .cloned()
            .collect();
        rows.sort_by_key(|(id, s)| (s.date, *id));
        Ok(rows.into_iter().map(|(_, s)| s).collect())
    }

    async fn list_sessions_since(
        &self,
        plan_id: PlanId,
        from: NaiveDate,
    ) -> Result<Vec<StudySession>, StorageError> {
        let sessions = self.list_sessions(plan_id).await?;
        Ok(sessions.into_iter().filter(|s| s.date >= from).collect())
    }

    async fn delete_sessions_for_plan(&self, plan_id: PlanId) -> Result<u64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.len();
        guard.retain(|(_, s)| s.plan_id != plan_id);
        Ok(u64::try_from(before - guard.len())
            .map_err(|_| StorageError::Serialization("removed count overflow".into()))?)
    }
}

/// Aggregates plan and session repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub plans: Arc<dyn PlanRepository>,
    pub sessions: Arc<dyn StudySessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let plans: Arc<dyn PlanRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn StudySessionRepository> = Arc::new(repo);
        Self { plans, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pace_core::time::fixed_now;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build_plan(id: u64) -> Plan {
        Plan::new(
            PlanId::new(id),
            format!("Plan {id}"),
            6000,
            date(2026, 1, 1),
            date(2026, 3, 24),
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn round_trips_plan_progress() {
        let repo = InMemoryRepository::new();
        let mut plan = build_plan(1);
        plan.record_study(45);
        repo.upsert_plan(&plan).await.unwrap();

        let fetched = repo.get_plan(plan.id()).await.unwrap().unwrap();
        assert_eq!(fetched.completed_minutes(), 45);
        assert!(repo.get_plan(PlanId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_log_filters_by_plan_and_date() {
        let repo = InMemoryRepository::new();
        let day = date(2026, 1, 24);

        for (plan, offset, minutes) in [(1_u64, 0_i64, 30_u32), (1, 1, 45), (2, 0, 60)] {
            let session = StudySession::new(
                PlanId::new(plan),
                day + chrono::Duration::days(offset),
                minutes,
            );
            repo.append_session(&session).await.unwrap();
        }

        let all = repo.list_sessions(PlanId::new(1)).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].minutes_studied, 30);

        let recent = repo
            .list_sessions_since(PlanId::new(1), day + chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].minutes_studied, 45);

        let removed = repo
            .delete_sessions_for_plan(PlanId::new(1))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(repo.list_sessions(PlanId::new(1)).await.unwrap().is_empty());
        assert_eq!(repo.list_sessions(PlanId::new(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn plan_record_round_trips_overshoot() {
        let plan = Plan::from_persisted(
            PlanId::new(7),
            "Resized plan",
            600,
            900,
            date(2026, 1, 1),
            date(2026, 2, 1),
            fixed_now(),
        )
        .unwrap();

        let record = PlanRecord::from_plan(&plan);
        // from_plan reads through the clamped accessor.
        assert_eq!(record.completed_minutes, 600);
        let back = record.into_plan().unwrap();
        assert_eq!(back.completed_minutes(), 600);
    }
}
