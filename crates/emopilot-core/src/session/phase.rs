use serde::{Deserialize, Serialize};

/// Top-level screen the session is on.
///
/// ```text
/// Splash -> Routing -> Ready -> Picking <-> Playing -> Stabilizing -> Picking
///                                  \                                  /
///                                   `------------> Result <----------'
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Splash,
    Routing,
    Ready,
    Picking,
    Playing,
    Stabilizing,
    Result,
}

impl Phase {
    /// Phases in which a card is being decided or resolved.
    pub fn has_active_card(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Stabilizing)
    }

    /// Phases in which mission settings may still change.
    pub fn allows_config_edit(&self) -> bool {
        matches!(self, Phase::Splash | Phase::Routing | Phase::Ready)
    }

    /// Phases that belong to a mission in progress.
    pub fn is_mid_mission(&self) -> bool {
        !matches!(self, Phase::Splash | Phase::Result)
    }
}
