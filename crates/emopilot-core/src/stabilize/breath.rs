//! Guided breathing cycle.
//!
//! ```text
//! Ready -> Inhale -> Hold -> Exhale -> (Inhale | Done)
//! ```
//!
//! Each full inhale/hold/exhale pass bumps the cycle counter. Every phase
//! instance owns at most one pending transition timer.

use serde::{Deserialize, Serialize};

use crate::mission::{MissionConfig, TimingConfig};
use crate::timer::TimerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Ready,
    Inhale,
    Hold,
    Exhale,
    Done,
}

#[derive(Debug, Clone)]
pub struct BreathCycle {
    phase: BreathPhase,
    count: u32,
    pub(crate) pending: Option<TimerHandle>,
}

impl Default for BreathCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathCycle {
    pub fn new() -> Self {
        Self {
            phase: BreathPhase::Ready,
            count: 0,
            pending: None,
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    /// Completed inhale/hold/exhale passes.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_complete(&self, cycles: u32) -> bool {
        self.count >= cycles
    }

    /// How long the current phase lasts, or `None` once breathing is done.
    pub fn phase_duration_ms(&self, mission: &MissionConfig, timing: &TimingConfig) -> Option<u64> {
        let secs = |s: u32| u64::from(s) * 1000;
        match self.phase {
            BreathPhase::Ready => Some(timing.breath_ready_ms),
            BreathPhase::Inhale => Some(secs(mission.inhale_secs)),
            BreathPhase::Hold => Some(secs(mission.hold_secs)),
            BreathPhase::Exhale => Some(secs(mission.exhale_secs)),
            BreathPhase::Done => None,
        }
    }

    /// Move to the next phase after the current one has elapsed.
    pub(crate) fn step(&mut self, cycles: u32) -> BreathPhase {
        self.phase = match self.phase {
            BreathPhase::Ready => BreathPhase::Inhale,
            BreathPhase::Inhale => BreathPhase::Hold,
            BreathPhase::Hold => BreathPhase::Exhale,
            BreathPhase::Exhale => {
                self.count += 1;
                if self.count < cycles {
                    BreathPhase::Inhale
                } else {
                    BreathPhase::Done
                }
            }
            BreathPhase::Done => BreathPhase::Done,
        };
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_through_cycles_then_done() {
        let mut breath = BreathCycle::new();
        let mut seen = Vec::new();
        while breath.phase() != BreathPhase::Done {
            seen.push(breath.step(2));
        }
        assert_eq!(
            seen,
            vec![
                BreathPhase::Inhale,
                BreathPhase::Hold,
                BreathPhase::Exhale,
                BreathPhase::Inhale,
                BreathPhase::Hold,
                BreathPhase::Exhale,
                BreathPhase::Done,
            ]
        );
        assert_eq!(breath.count(), 2);
        assert!(breath.is_complete(2));
    }

    #[test]
    fn durations_follow_config() {
        let mission = MissionConfig::default();
        let timing = TimingConfig::default();
        let mut breath = BreathCycle::new();
        assert_eq!(breath.phase_duration_ms(&mission, &timing), Some(800));
        breath.step(3);
        assert_eq!(breath.phase_duration_ms(&mission, &timing), Some(4000));
        breath.step(3);
        breath.step(3);
        assert_eq!(breath.phase_duration_ms(&mission, &timing), Some(8000));
    }
}
