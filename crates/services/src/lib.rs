#![forbid(unsafe_code)]

pub mod error;
pub mod pace_service;
pub mod plan_service;

pub use pace_core::Clock;

pub use error::{PaceServiceError, PlanServiceError};
pub use pace_service::{PaceService, PlanOverview};
pub use plan_service::PlanService;
