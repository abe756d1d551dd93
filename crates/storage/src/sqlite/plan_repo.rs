use pace_core::model::{Plan, PlanId};

use super::SqliteRepository;
use super::mapping::{map_plan_row, plan_id_to_i64};
use crate::repository::{PlanRecord, PlanRepository, StorageError};

#[async_trait::async_trait]
impl PlanRepository for SqliteRepository {
    async fn upsert_plan(&self, plan: &Plan) -> Result<(), StorageError> {
        let record = PlanRecord::from_plan(plan);

        sqlx::query(
            r"
                INSERT INTO plans (
                    id, title, total_effort_minutes, completed_minutes,
                    start_date, target_date, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    total_effort_minutes = excluded.total_effort_minutes,
                    completed_minutes = excluded.completed_minutes,
                    start_date = excluded.start_date,
                    target_date = excluded.target_date
            ",
        )
        .bind(plan_id_to_i64(record.id)?)
        .bind(record.title)
        .bind(i64::from(record.total_effort_minutes))
        .bind(i64::from(record.completed_minutes))
        .bind(record.start_date)
        .bind(record.target_date)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_plan(&self, id: PlanId) -> Result<Option<Plan>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    id, title, total_effort_minutes, completed_minutes,
                    start_date, target_date, created_at
                FROM plans
                WHERE id = ?1
            ",
        )
        .bind(plan_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|row| map_plan_row(&row)).transpose()
    }

    async fn list_plans(&self, limit: u32) -> Result<Vec<Plan>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, title, total_effort_minutes, completed_minutes,
                    start_date, target_date, created_at
                FROM plans
                ORDER BY created_at ASC, id ASC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_plan_row(&row)?);
        }
        Ok(out)
    }
}
