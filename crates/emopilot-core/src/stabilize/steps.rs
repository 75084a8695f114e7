use serde::{Deserialize, Serialize};

use crate::mission::MissionConfig;

/// Sub-phase of the stabilizing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilizeStep {
    Pressure = 1,
    Breath = 2,
    Report = 3,
}

impl StabilizeStep {
    pub const ORDER: [StabilizeStep; 3] = [
        StabilizeStep::Pressure,
        StabilizeStep::Breath,
        StabilizeStep::Report,
    ];

    /// 1-based step number shown to the player.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn is_enabled(&self, config: &MissionConfig) -> bool {
        match self {
            StabilizeStep::Pressure => config.enable_pressure,
            StabilizeStep::Breath => config.enable_breath,
            StabilizeStep::Report => config.enable_report,
        }
    }
}

/// First step the protocol should open on, or `None` when every step is off.
pub fn first_enabled_step(config: &MissionConfig) -> Option<StabilizeStep> {
    StabilizeStep::ORDER
        .into_iter()
        .find(|step| step.is_enabled(config))
}

/// Step after `current`, or `None` when the protocol is finished.
pub fn next_enabled_step(config: &MissionConfig, current: StabilizeStep) -> Option<StabilizeStep> {
    StabilizeStep::ORDER
        .into_iter()
        .filter(|step| *step > current)
        .find(|step| step.is_enabled(config))
}
