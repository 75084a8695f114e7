use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deck::{EmotionZone, Location};
use crate::mission::MissionConfig;
use crate::session::Phase;
use crate::stabilize::{BreathPhase, StabilizeStep};

/// Every state change in a session produces an Event.
/// The presentation layer re-renders from them (or from a fresh snapshot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    MissionStarted {
        at: DateTime<Utc>,
    },
    LocationSelected {
        location: Location,
        at: DateTime<Utc>,
    },
    DeckCommitted {
        mission_id: Uuid,
        location: Location,
        requested: u32,
        effective: u32,
        at: DateTime<Utc>,
    },
    CardDrawStarted {
        index: usize,
        at: DateTime<Utc>,
    },
    CardDrawn {
        card_id: String,
        round: u32,
        total_rounds: u32,
        at: DateTime<Utc>,
    },
    CardScanStarted {
        at: DateTime<Utc>,
    },
    CardRevealed {
        card_id: String,
        at: DateTime<Utc>,
    },
    DecisionMade {
        card_id: String,
        chosen: EmotionZone,
        actual: EmotionZone,
        correct: bool,
        score: u32,
        xp: u32,
        at: DateTime<Utc>,
    },
    StabilizeEntered {
        step: StabilizeStep,
        at: DateTime<Utc>,
    },
    PressureHeld {
        value: f64,
        at: DateTime<Utc>,
    },
    PressureChanged {
        value: f64,
        at: DateTime<Utc>,
    },
    PressureFull {
        at: DateTime<Utc>,
    },
    PressureReleased {
        value: f64,
        at: DateTime<Utc>,
    },
    DecompressStarted {
        at: DateTime<Utc>,
    },
    BreathPhaseChanged {
        phase: BreathPhase,
        count: u32,
        at: DateTime<Utc>,
    },
    /// All configured breathing cycles are done; the player may move on.
    BreathCompleted {
        cycles: u32,
        at: DateTime<Utc>,
    },
    ReportSelectionChanged {
        emotion: Option<String>,
        need: Option<String>,
        at: DateTime<Utc>,
    },
    ReportConfirmed {
        emotion: String,
        need: String,
        xp: u32,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from: StabilizeStep,
        to: StabilizeStep,
        at: DateTime<Utc>,
    },
    TurnAdvanced {
        phase: Phase,
        remaining: usize,
        at: DateTime<Utc>,
    },
    MissionCompleted {
        score: u32,
        xp: u32,
        rounds: u32,
        at: DateTime<Utc>,
    },
    MissionAborted {
        round: u32,
        at: DateTime<Utc>,
    },
    ReturnedToSplash {
        at: DateTime<Utc>,
    },
    ProgressReset {
        at: DateTime<Utc>,
    },
    MissionConfigUpdated {
        config: MissionConfig,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Serde tag of this event, e.g. `"CardDrawn"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MissionStarted { .. } => "MissionStarted",
            Event::LocationSelected { .. } => "LocationSelected",
            Event::DeckCommitted { .. } => "DeckCommitted",
            Event::CardDrawStarted { .. } => "CardDrawStarted",
            Event::CardDrawn { .. } => "CardDrawn",
            Event::CardScanStarted { .. } => "CardScanStarted",
            Event::CardRevealed { .. } => "CardRevealed",
            Event::DecisionMade { .. } => "DecisionMade",
            Event::StabilizeEntered { .. } => "StabilizeEntered",
            Event::PressureHeld { .. } => "PressureHeld",
            Event::PressureChanged { .. } => "PressureChanged",
            Event::PressureFull { .. } => "PressureFull",
            Event::PressureReleased { .. } => "PressureReleased",
            Event::DecompressStarted { .. } => "DecompressStarted",
            Event::BreathPhaseChanged { .. } => "BreathPhaseChanged",
            Event::BreathCompleted { .. } => "BreathCompleted",
            Event::ReportSelectionChanged { .. } => "ReportSelectionChanged",
            Event::ReportConfirmed { .. } => "ReportConfirmed",
            Event::StepAdvanced { .. } => "StepAdvanced",
            Event::TurnAdvanced { .. } => "TurnAdvanced",
            Event::MissionCompleted { .. } => "MissionCompleted",
            Event::MissionAborted { .. } => "MissionAborted",
            Event::ReturnedToSplash { .. } => "ReturnedToSplash",
            Event::ProgressReset { .. } => "ProgressReset",
            Event::MissionConfigUpdated { .. } => "MissionConfigUpdated",
        }
    }
}
