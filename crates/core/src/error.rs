use thiserror::Error;

use crate::model::PlanError;
use crate::pace::PaceError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Pace(#[from] PaceError),
}
