//! Mission configuration.
//!
//! `MissionConfig` is what the player tunes before a mission (deck size and the
//! calming steps). `TimingConfig` holds the fixed animation delays and tick
//! rates; it is only exposed through the config file.

use serde::{Deserialize, Serialize};

use crate::deck::DeckBuilder;

pub const PRESSURE_SECS_RANGE: (u32, u32) = (1, 30);
pub const BREATH_CYCLES_RANGE: (u32, u32) = (1, 10);
pub const PHASE_SECS_RANGE: (u32, u32) = (1, 20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default = "default_card_count")]
    pub card_count: u32,
    #[serde(default = "default_true")]
    pub enable_pressure: bool,
    #[serde(default = "default_true")]
    pub enable_breath: bool,
    #[serde(default = "default_true")]
    pub enable_report: bool,
    #[serde(default = "default_pressure_duration")]
    pub pressure_duration_secs: u32,
    #[serde(default = "default_breath_cycles")]
    pub breath_cycles: u32,
    #[serde(default = "default_inhale")]
    pub inhale_secs: u32,
    #[serde(default = "default_hold")]
    pub hold_secs: u32,
    #[serde(default = "default_exhale")]
    pub exhale_secs: u32,
}

fn default_card_count() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_pressure_duration() -> u32 {
    5
}
fn default_breath_cycles() -> u32 {
    3
}
fn default_inhale() -> u32 {
    4
}
fn default_hold() -> u32 {
    4
}
fn default_exhale() -> u32 {
    8
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            card_count: default_card_count(),
            enable_pressure: true,
            enable_breath: true,
            enable_report: true,
            pressure_duration_secs: default_pressure_duration(),
            breath_cycles: default_breath_cycles(),
            inhale_secs: default_inhale(),
            hold_secs: default_hold(),
            exhale_secs: default_exhale(),
        }
    }
}

impl MissionConfig {
    /// Copy with every numeric field pulled into its supported range.
    pub fn clamped(mut self) -> Self {
        self.card_count = DeckBuilder::clamp_count(self.card_count);
        self.pressure_duration_secs = clamp(self.pressure_duration_secs, PRESSURE_SECS_RANGE);
        self.breath_cycles = clamp(self.breath_cycles, BREATH_CYCLES_RANGE);
        self.inhale_secs = clamp(self.inhale_secs, PHASE_SECS_RANGE);
        self.hold_secs = clamp(self.hold_secs, PHASE_SECS_RANGE);
        self.exhale_secs = clamp(self.exhale_secs, PHASE_SECS_RANGE);
        self
    }

    /// Number of calming steps switched on.
    pub fn enabled_step_count(&self) -> usize {
        [self.enable_pressure, self.enable_breath, self.enable_report]
            .iter()
            .filter(|on| **on)
            .count()
    }

    pub fn apply(&mut self, setting: MissionSetting) {
        match setting {
            MissionSetting::CardCount(n) => self.card_count = n,
            MissionSetting::EnablePressure(on) => self.enable_pressure = on,
            MissionSetting::EnableBreath(on) => self.enable_breath = on,
            MissionSetting::EnableReport(on) => self.enable_report = on,
            MissionSetting::PressureDurationSecs(n) => self.pressure_duration_secs = n,
            MissionSetting::BreathCycles(n) => self.breath_cycles = n,
            MissionSetting::InhaleSecs(n) => self.inhale_secs = n,
            MissionSetting::HoldSecs(n) => self.hold_secs = n,
            MissionSetting::ExhaleSecs(n) => self.exhale_secs = n,
        }
        *self = self.clamped();
    }
}

fn clamp(value: u32, (lo, hi): (u32, u32)) -> u32 {
    value.clamp(lo, hi)
}

/// One editable mission field with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum MissionSetting {
    CardCount(u32),
    EnablePressure(bool),
    EnableBreath(bool),
    EnableReport(bool),
    PressureDurationSecs(u32),
    BreathCycles(u32),
    InhaleSecs(u32),
    HoldSecs(u32),
    ExhaleSecs(u32),
}

impl MissionSetting {
    /// Parse a `key` / `value` pair as typed by a user.
    pub fn parse(key: &str, value: &str) -> Result<Self, String> {
        let flag = || {
            value
                .parse::<bool>()
                .map_err(|_| format!("expected true/false for '{key}', got '{value}'"))
        };
        let number = || {
            value
                .parse::<u32>()
                .map_err(|_| format!("expected a number for '{key}', got '{value}'"))
        };
        Ok(match key {
            "card_count" => MissionSetting::CardCount(number()?),
            "enable_pressure" => MissionSetting::EnablePressure(flag()?),
            "enable_breath" => MissionSetting::EnableBreath(flag()?),
            "enable_report" => MissionSetting::EnableReport(flag()?),
            "pressure_duration_secs" => MissionSetting::PressureDurationSecs(number()?),
            "breath_cycles" => MissionSetting::BreathCycles(number()?),
            "inhale_secs" => MissionSetting::InhaleSecs(number()?),
            "hold_secs" => MissionSetting::HoldSecs(number()?),
            "exhale_secs" => MissionSetting::ExhaleSecs(number()?),
            other => return Err(format!("unknown mission setting: {other}")),
        })
    }
}

/// Animation delays and tick rates, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_draw_delay")]
    pub draw_delay_ms: u64,
    #[serde(default = "default_scan_delay")]
    pub scan_delay_ms: u64,
    #[serde(default = "default_decompress_delay")]
    pub decompress_delay_ms: u64,
    #[serde(default = "default_breath_ready")]
    pub breath_ready_ms: u64,
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
    #[serde(default = "default_decay")]
    pub pressure_decay_per_tick: f64,
}

fn default_draw_delay() -> u64 {
    800
}
fn default_scan_delay() -> u64 {
    1200
}
fn default_decompress_delay() -> u64 {
    1500
}
fn default_breath_ready() -> u64 {
    800
}
fn default_tick() -> u64 {
    40
}
fn default_decay() -> f64 {
    1.5
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            draw_delay_ms: default_draw_delay(),
            scan_delay_ms: default_scan_delay(),
            decompress_delay_ms: default_decompress_delay(),
            breath_ready_ms: default_breath_ready(),
            tick_ms: default_tick(),
            pressure_decay_per_tick: default_decay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{MAX_CARD_COUNT, MIN_CARD_COUNT};

    #[test]
    fn defaults_match_mission_briefing() {
        let cfg = MissionConfig::default();
        assert_eq!(cfg.card_count, 5);
        assert_eq!(cfg.enabled_step_count(), 3);
        assert_eq!(
            (cfg.pressure_duration_secs, cfg.breath_cycles),
            (5, 3)
        );
        assert_eq!((cfg.inhale_secs, cfg.hold_secs, cfg.exhale_secs), (4, 4, 8));
    }

    #[test]
    fn apply_clamps_values() {
        let mut cfg = MissionConfig::default();
        cfg.apply(MissionSetting::CardCount(0));
        assert_eq!(cfg.card_count, MIN_CARD_COUNT);
        cfg.apply(MissionSetting::CardCount(500));
        assert_eq!(cfg.card_count, MAX_CARD_COUNT);
        cfg.apply(MissionSetting::BreathCycles(0));
        assert_eq!(cfg.breath_cycles, 1);
    }

    #[test]
    fn parse_setting_from_strings() {
        assert_eq!(
            MissionSetting::parse("enable_breath", "false"),
            Ok(MissionSetting::EnableBreath(false))
        );
        assert_eq!(
            MissionSetting::parse("card_count", "7"),
            Ok(MissionSetting::CardCount(7))
        );
        assert!(MissionSetting::parse("card_count", "many").is_err());
        assert!(MissionSetting::parse("volume", "3").is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: MissionConfig = toml::from_str("card_count = 9\nenable_report = false").unwrap();
        assert_eq!(cfg.card_count, 9);
        assert!(!cfg.enable_report);
        assert_eq!(cfg.exhale_secs, 8);
    }
}
