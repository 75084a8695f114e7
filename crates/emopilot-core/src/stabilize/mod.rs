//! The three-step calming protocol entered after a distress card.

mod breath;
mod pressure;
pub mod report;
mod steps;

pub use breath::{BreathCycle, BreathPhase};
pub use pressure::{PressureGauge, PRESSURE_MAX};
pub use report::{ReportOption, ReportSelection, EMOTIONS, NEEDS};
pub use steps::{first_enabled_step, next_enabled_step, StabilizeStep};
