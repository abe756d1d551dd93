mod ids;
mod plan;
mod study_session;

pub use ids::{ParseIdError, PlanId};
pub use plan::{Plan, PlanError};
pub use study_session::StudySession;
