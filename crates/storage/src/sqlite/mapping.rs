use pace_core::model::{Plan, PlanId, StudySession};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn plan_id_from_i64(v: i64) -> Result<PlanId, StorageError> {
    Ok(PlanId::new(i64_to_u64("plan_id", v)?))
}

pub(crate) fn plan_id_to_i64(id: PlanId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("plan_id overflow".into()))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_plan_row(row: &sqlx::sqlite::SqliteRow) -> Result<Plan, StorageError> {
    let id = plan_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let total = u32_from_i64(
        "total_effort_minutes",
        row.try_get::<i64, _>("total_effort_minutes").map_err(ser)?,
    )?;
    let completed = u32_from_i64(
        "completed_minutes",
        row.try_get::<i64, _>("completed_minutes").map_err(ser)?,
    )?;

    Plan::from_persisted(
        id,
        title,
        total,
        completed,
        row.try_get("start_date").map_err(ser)?,
        row.try_get("target_date").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_session_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<StudySession, StorageError> {
    Ok(StudySession {
        plan_id: plan_id_from_i64(row.try_get::<i64, _>("plan_id").map_err(ser)?)?,
        date: row.try_get("studied_on").map_err(ser)?,
        minutes_studied: u32_from_i64(
            "minutes_studied",
            row.try_get::<i64, _>("minutes_studied").map_err(ser)?,
        )?,
    })
}
