use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ids::PlanId;

/// Record of one dated unit of study activity.
///
/// Appended whenever a study activity (quiz, guided session, manual log)
/// completes; immutable once written. Several sessions may share a date and
/// are summed by the pace engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub plan_id: PlanId,
    pub date: NaiveDate,
    pub minutes_studied: u32,
}

impl StudySession {
    #[must_use]
    pub fn new(plan_id: PlanId, date: NaiveDate, minutes_studied: u32) -> Self {
        Self {
            plan_id,
            date,
            minutes_studied,
        }
    }
}
