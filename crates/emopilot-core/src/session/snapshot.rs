use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Phase;
use crate::deck::{Card, Location};
use crate::history::LogEntry;
use crate::mission::MissionConfig;
use crate::stabilize::{BreathPhase, ReportSelection, StabilizeStep};

/// Everything the presentation layer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub score: u32,
    pub xp: u32,
    pub round: u32,
    pub total_rounds: u32,
    pub deck_remaining: usize,
    pub active_card: Option<Card>,
    /// Only set while stabilizing.
    pub stabilize_step: Option<StabilizeStep>,
    pub location: Option<Location>,
    pub mission_id: Option<Uuid>,
    pub mission: MissionConfig,
    pub history: Vec<LogEntry>,

    pub is_drawing: bool,
    pub is_scanning: bool,
    pub is_revealed: bool,
    pub pressure: f64,
    pub is_pressing: bool,
    pub is_decompressing: bool,
    pub breath_phase: BreathPhase,
    pub breath_count: u32,
    pub can_confirm_breath: bool,
    pub report: ReportSelection,
    pub can_confirm_report: bool,
}
