use chrono::NaiveDate;
use pace_core::model::{PlanId, StudySession};

use super::SqliteRepository;
use super::mapping::{map_session_row, plan_id_to_i64};
use crate::repository::{StorageError, StudySessionRepository};

#[async_trait::async_trait]
impl StudySessionRepository for SqliteRepository {
    async fn append_session(&self, session: &StudySession) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO study_sessions (plan_id, studied_on, minutes_studied)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(plan_id_to_i64(session.plan_id)?)
        .bind(session.date)
        .bind(i64::from(session.minutes_studied))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn list_sessions(&self, plan_id: PlanId) -> Result<Vec<StudySession>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT plan_id, studied_on, minutes_studied
                FROM study_sessions
                WHERE plan_id = ?1
                ORDER BY studied_on ASC, id ASC
            ",
        )
        .bind(plan_id_to_i64(plan_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }

    async fn list_sessions_since(
        &self,
        plan_id: PlanId,
        from: NaiveDate,
    ) -> Result<Vec<StudySession>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT plan_id, studied_on, minutes_studied
                FROM study_sessions
                WHERE plan_id = ?1 AND studied_on >= ?2
                ORDER BY studied_on ASC, id ASC
            ",
        )
        .bind(plan_id_to_i64(plan_id)?)
        .bind(from)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }

    async fn delete_sessions_for_plan(&self, plan_id: PlanId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM study_sessions WHERE plan_id = ?1")
            .bind(plan_id_to_i64(plan_id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected())
    }
}
