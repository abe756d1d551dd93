#![forbid(unsafe_code)]

pub mod calendar;
pub mod error;
pub mod model;
pub mod pace;
pub mod time;

pub use error::Error;
pub use pace::{PaceCalculator, PaceMetrics, PaceStatus};
pub use time::Clock;
