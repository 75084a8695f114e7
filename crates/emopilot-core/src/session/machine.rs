//! Session state machine implementation.
//!
//! Every intent returns the events it produced. An empty vector means the
//! intent was not valid for the current state and nothing changed.
//!
//! Timed work (card draw and reveal animations, pressure ticks, the
//! decompression delay, breathing phases) goes through the session's
//! [`TimerRegistry`]. The caller drives the clock with [`Session::advance`],
//! the same way a timer engine is ticked.
//!
//! Leaving a phase always cancels every pending timer before any state is
//! touched, so a callback scheduled for the old phase can never run against
//! the new one.

use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use uuid::Uuid;

use super::phase::Phase;
use super::snapshot::SessionSnapshot;
use crate::audio::{AudioCue, AudioCuePort};
use crate::deck::{Card, DeckBuilder, EmotionZone, Location};
use crate::events::Event;
use crate::history::{HistoryLog, LogEntry, LogKind};
use crate::mission::{MissionConfig, MissionSetting, TimingConfig};
use crate::stabilize::report::{find_emotion, find_need};
use crate::stabilize::{
    first_enabled_step, next_enabled_step, BreathCycle, BreathPhase, PressureGauge,
    ReportSelection, StabilizeStep, PRESSURE_MAX,
};
use crate::storage::{Config, XpStore};
use crate::timer::{TimerHandle, TimerRegistry};

const CORRECT_XP: u32 = 5;
const REPORT_XP: u32 = 10;
const MISS_PENALTY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    DrawComplete { index: usize },
    ScanComplete,
    PressureTick,
    DecayTick,
    DecompressDone,
    BreathElapsed,
}

pub struct Session {
    score: u32,
    xp: u32,
    round: u32,
    total_rounds: u32,
    deck: Vec<Card>,
    active_card: Option<Card>,
    phase: Phase,
    stabilize_step: StabilizeStep,
    location: Option<Location>,
    mission_id: Option<Uuid>,
    mission: MissionConfig,
    /// Settings restored by a full reset.
    baseline_mission: MissionConfig,
    timing: TimingConfig,
    history: HistoryLog,

    drawing: bool,
    scanning: bool,
    revealed: bool,
    pressure: PressureGauge,
    breath: BreathCycle,
    report: ReportSelection,

    timers: TimerRegistry<TimerAction>,
    store: Box<dyn XpStore>,
    audio: Arc<dyn AudioCuePort>,
    rng: Mcg128Xsl64,
}

impl Session {
    /// Fresh session on the splash screen, with XP read from `store`.
    pub fn new(store: Box<dyn XpStore>, audio: Arc<dyn AudioCuePort>) -> Self {
        let xp = match store.load_xp() {
            Ok(xp) => xp.unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "xp store unavailable, starting from 0");
                0
            }
        };
        Self {
            score: 0,
            xp,
            round: 0,
            total_rounds: 0,
            deck: Vec::new(),
            active_card: None,
            phase: Phase::Splash,
            stabilize_step: StabilizeStep::Pressure,
            location: None,
            mission_id: None,
            mission: MissionConfig::default(),
            baseline_mission: MissionConfig::default(),
            timing: TimingConfig::default(),
            history: HistoryLog::new(),
            drawing: false,
            scanning: false,
            revealed: false,
            pressure: PressureGauge::new(),
            breath: BreathCycle::new(),
            report: ReportSelection::default(),
            timers: TimerRegistry::new(),
            store,
            audio,
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Session using the mission defaults and timings from `config`.
    pub fn from_config(config: &Config, store: Box<dyn XpStore>, audio: Arc<dyn AudioCuePort>) -> Self {
        Self::new(store, audio)
            .with_mission(config.mission)
            .with_timing(config.timing)
    }

    pub fn with_mission(mut self, mission: MissionConfig) -> Self {
        let mission = mission.clamped();
        self.mission = mission;
        self.baseline_mission = mission;
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Make deck shuffles reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mcg128Xsl64::seed_from_u64(seed);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Cards not yet drawn, in deck order.
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn active_card(&self) -> Option<&Card> {
        self.active_card.as_ref()
    }

    /// Current calming step; only meaningful while stabilizing.
    pub fn stabilize_step(&self) -> Option<StabilizeStep> {
        (self.phase == Phase::Stabilizing).then_some(self.stabilize_step)
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn mission(&self) -> &MissionConfig {
        &self.mission
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn pressure(&self) -> &PressureGauge {
        &self.pressure
    }

    pub fn breath(&self) -> &BreathCycle {
        &self.breath
    }

    pub fn report(&self) -> &ReportSelection {
        &self.report
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Virtual milliseconds elapsed since the session was created.
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    pub fn can_confirm_breath(&self) -> bool {
        self.in_step(StabilizeStep::Breath) && self.breath.is_complete(self.mission.breath_cycles)
    }

    pub fn can_confirm_report(&self) -> bool {
        self.in_step(StabilizeStep::Report) && self.report.labels().is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            score: self.score,
            xp: self.xp,
            round: self.round,
            total_rounds: self.total_rounds,
            deck_remaining: self.deck.len(),
            active_card: self.active_card.clone(),
            stabilize_step: self.stabilize_step(),
            location: self.location,
            mission_id: self.mission_id,
            mission: self.mission,
            history: self.history.to_vec(),
            is_drawing: self.drawing,
            is_scanning: self.scanning,
            is_revealed: self.revealed,
            pressure: self.pressure.value(),
            is_pressing: self.pressure.is_pressing(),
            is_decompressing: self.pressure.is_decompressing(),
            breath_phase: self.breath.phase(),
            breath_count: self.breath.count(),
            can_confirm_breath: self.can_confirm_breath(),
            report: self.report.clone(),
            can_confirm_report: self.can_confirm_report(),
        }
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Let `elapsed_ms` of virtual time pass, running every timer that comes
    /// due, one at a time and in order.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<Event> {
        let target = self.timers.now_ms().saturating_add(elapsed_ms);
        let mut events = Vec::new();
        while let Some((handle, action)) = self.timers.pop_due(target) {
            self.fire(handle, action, &mut events);
        }
        self.timers.settle(target);
        events
    }

    // ── Intents: mission flow ────────────────────────────────────────

    pub fn start_mission(&mut self) -> Vec<Event> {
        if !matches!(self.phase, Phase::Splash | Phase::Result) {
            return self.reject("start_mission");
        }
        self.cue(AudioCue::Click, None);
        self.cancel_timers();
        self.clear_mission();
        self.phase = Phase::Routing;
        tracing::info!("mission started");
        vec![Event::MissionStarted { at: Utc::now() }]
    }

    pub fn select_location(&mut self, location: Location) -> Vec<Event> {
        if self.phase != Phase::Routing {
            return self.reject("select_location");
        }
        self.cue(AudioCue::Click, None);
        self.location = Some(location);
        self.phase = Phase::Ready;
        vec![Event::LocationSelected {
            location,
            at: Utc::now(),
        }]
    }

    /// Freeze the mission settings and deal the deck.
    pub fn confirm_ready_and_build_deck(&mut self) -> Vec<Event> {
        let Some(location) = self.location.filter(|_| self.phase == Phase::Ready) else {
            return self.reject("confirm_ready_and_build_deck");
        };
        let built = match DeckBuilder::for_location(location).build(self.mission.card_count, &mut self.rng) {
            Ok(built) => built,
            Err(e) => {
                tracing::warn!(error = %e, "deck build failed");
                return Vec::new();
            }
        };
        self.cue(AudioCue::Click, None);

        let mission_id = Uuid::new_v4();
        self.total_rounds = built.cards.len() as u32;
        self.round = 0;
        self.deck = built.cards;
        self.mission_id = Some(mission_id);
        self.phase = Phase::Picking;
        tracing::info!(%mission_id, %location, cards = self.total_rounds, "deck committed");
        vec![Event::DeckCommitted {
            mission_id,
            location,
            requested: built.requested,
            effective: built.effective,
            at: Utc::now(),
        }]
    }

    /// Start drawing the card at `index`; it lands after the draw animation.
    pub fn pick_card(&mut self, index: usize) -> Vec<Event> {
        if self.phase != Phase::Picking || self.drawing || index >= self.deck.len() {
            return self.reject("pick_card");
        }
        self.cue(AudioCue::Draw, None);
        self.drawing = true;
        self.timers
            .schedule(self.timing.draw_delay_ms, TimerAction::DrawComplete { index });
        vec![Event::CardDrawStarted {
            index,
            at: Utc::now(),
        }]
    }

    /// Scan the face-down card; it flips after the scan animation.
    pub fn reveal_card(&mut self) -> Vec<Event> {
        if self.phase != Phase::Playing || self.revealed || self.scanning {
            return self.reject("reveal_card");
        }
        self.cue(AudioCue::Scan, None);
        self.scanning = true;
        self.timers
            .schedule(self.timing.scan_delay_ms, TimerAction::ScanComplete);
        vec![Event::CardScanStarted { at: Utc::now() }]
    }

    /// Classify the revealed card.
    pub fn decide(&mut self, choice: EmotionZone) -> Vec<Event> {
        if self.phase != Phase::Playing || !self.revealed {
            return self.reject("decide");
        }
        let Some(card) = self.active_card.clone() else {
            return self.reject("decide");
        };

        let correct = card.zone == choice;
        if correct {
            self.cue(AudioCue::Correct, None);
            self.score = self.score.saturating_add(card.reward());
            self.add_xp(CORRECT_XP);
            self.log(LogKind::Decision, format!("Locked on {choice}: {}", card.label));
        } else {
            self.cue(AudioCue::Wrong, None);
            self.score = self.score.saturating_sub(MISS_PENALTY);
            self.log(
                LogKind::Decision,
                format!("Missed: read {choice}, was {}: {}", card.zone, card.label),
            );
        }

        let mut events = vec![Event::DecisionMade {
            card_id: card.id.clone(),
            chosen: choice,
            actual: card.zone,
            correct,
            score: self.score,
            xp: self.xp,
            at: Utc::now(),
        }];
        if card.zone.is_distress() {
            self.enter_stabilizing(&mut events);
        } else {
            self.advance_turn(&mut events);
        }
        events
    }

    // ── Intents: pressure step ───────────────────────────────────────

    pub fn pressure_hold(&mut self) -> Vec<Event> {
        if !self.in_step(StabilizeStep::Pressure)
            || self.pressure.is_full()
            || self.pressure.is_decompressing()
            || self.pressure.is_pressing()
        {
            return self.reject("pressure_hold");
        }
        if let Some(decay) = self.pressure.decay_timer.take() {
            self.timers.cancel(decay);
        }
        self.pressure.set_pressing(true);
        self.cue(
            AudioCue::PressureLoop,
            Some(f64::from(self.mission.pressure_duration_secs)),
        );
        let hold = self
            .timers
            .schedule_repeating(self.timing.tick_ms, TimerAction::PressureTick);
        self.pressure.hold_timer = Some(hold);
        vec![Event::PressureHeld {
            value: self.pressure.value(),
            at: Utc::now(),
        }]
    }

    pub fn pressure_release(&mut self) -> Vec<Event> {
        if !self.in_step(StabilizeStep::Pressure) || !self.pressure.is_pressing() {
            return self.reject("pressure_release");
        }
        self.pressure.set_pressing(false);
        if let Some(hold) = self.pressure.hold_timer.take() {
            self.timers.cancel(hold);
        }
        let value = self.pressure.value();
        if value > 0.0 && value < PRESSURE_MAX {
            let decay = self
                .timers
                .schedule_repeating(self.timing.tick_ms, TimerAction::DecayTick);
            self.pressure.decay_timer = Some(decay);
        }
        vec![Event::PressureReleased {
            value,
            at: Utc::now(),
        }]
    }

    /// Let the pressure out once the gauge is full.
    pub fn confirm_pressure_done(&mut self) -> Vec<Event> {
        if !self.in_step(StabilizeStep::Pressure)
            || !self.pressure.is_full()
            || self.pressure.is_decompressing()
        {
            return self.reject("confirm_pressure_done");
        }
        self.cue(AudioCue::Click, None);
        self.cue(AudioCue::Hiss, None);
        for stray in [self.pressure.hold_timer.take(), self.pressure.decay_timer.take()]
            .into_iter()
            .flatten()
        {
            self.timers.cancel(stray);
        }
        self.pressure.set_pressing(false);
        self.pressure.set_decompressing(true);
        self.timers
            .schedule(self.timing.decompress_delay_ms, TimerAction::DecompressDone);
        vec![Event::DecompressStarted { at: Utc::now() }]
    }

    // ── Intents: breath step ─────────────────────────────────────────

    /// Move on once every breathing cycle is done.
    pub fn advance_breath_step(&mut self) -> Vec<Event> {
        if !self.can_confirm_breath() {
            return self.reject("advance_breath_step");
        }
        self.cue(AudioCue::Click, None);
        let mut events = Vec::new();
        self.advance_step(&mut events);
        events
    }

    // ── Intents: report step ─────────────────────────────────────────

    pub fn select_emotion(&mut self, id: &str) -> Vec<Event> {
        if !self.in_step(StabilizeStep::Report) || find_emotion(id).is_none() {
            return self.reject("select_emotion");
        }
        self.cue(AudioCue::Click, None);
        self.report.emotion = Some(id.to_string());
        vec![self.report_changed()]
    }

    pub fn select_need(&mut self, id: &str) -> Vec<Event> {
        if !self.in_step(StabilizeStep::Report) || find_need(id).is_none() {
            return self.reject("select_need");
        }
        self.cue(AudioCue::Click, None);
        self.report.need = Some(id.to_string());
        vec![self.report_changed()]
    }

    pub fn confirm_report(&mut self) -> Vec<Event> {
        if !self.in_step(StabilizeStep::Report) {
            return self.reject("confirm_report");
        }
        let (Some((emotion_label, need_label)), Some(emotion), Some(need)) = (
            self.report.labels(),
            self.report.emotion.clone(),
            self.report.need.clone(),
        ) else {
            return self.reject("confirm_report");
        };

        self.cue(AudioCue::Correct, None);
        self.log(
            LogKind::Report,
            format!("Feeling {emotion_label}, chose {need_label}"),
        );
        self.add_xp(REPORT_XP);
        self.report = ReportSelection::default();

        let mut events = vec![Event::ReportConfirmed {
            emotion,
            need,
            xp: self.xp,
            at: Utc::now(),
        }];
        self.advance_step(&mut events);
        events
    }

    // ── Intents: leaving ─────────────────────────────────────────────

    /// Give up the current mission. XP and history are kept.
    pub fn abort_mission(&mut self) -> Vec<Event> {
        if !self.phase.is_mid_mission() {
            return self.reject("abort_mission");
        }
        self.cue(AudioCue::Click, None);
        self.cancel_timers();
        let round = self.round;
        self.clear_mission();
        self.phase = Phase::Splash;
        tracing::info!(round, "mission aborted");
        vec![Event::MissionAborted {
            round,
            at: Utc::now(),
        }]
    }

    /// Go back to the splash screen from anywhere, dropping mission progress.
    pub fn return_to_splash(&mut self) -> Vec<Event> {
        if self.phase == Phase::Splash {
            return self.reject("return_to_splash");
        }
        self.cue(AudioCue::Click, None);
        self.cancel_timers();
        self.clear_mission();
        self.phase = Phase::Splash;
        vec![Event::ReturnedToSplash { at: Utc::now() }]
    }

    /// Wipe everything, including XP in the store and the history log.
    pub fn reset_all_progress(&mut self) -> Vec<Event> {
        self.cue(AudioCue::Click, None);
        self.cancel_timers();
        if let Err(e) = self.store.clear_xp() {
            tracing::warn!(error = %e, "failed to clear stored xp");
        }
        self.xp = 0;
        self.clear_mission();
        self.history.clear();
        self.mission = self.baseline_mission;
        self.phase = Phase::Splash;
        self.cue(AudioCue::Wrong, None);
        tracing::info!("all progress reset");
        vec![Event::ProgressReset { at: Utc::now() }]
    }

    pub fn update_mission_config(&mut self, setting: MissionSetting) -> Vec<Event> {
        if !self.phase.allows_config_edit() {
            return self.reject("update_mission_config");
        }
        self.mission.apply(setting);
        vec![Event::MissionConfigUpdated {
            config: self.mission,
            at: Utc::now(),
        }]
    }

    /// Cancel everything pending, as when the view owning the session goes
    /// away. Returns how many timers were cancelled.
    pub fn teardown(&mut self) -> usize {
        self.cancel_timers()
    }

    // ── Timer firings ────────────────────────────────────────────────

    fn fire(&mut self, handle: TimerHandle, action: TimerAction, events: &mut Vec<Event>) {
        tracing::trace!(?action, now_ms = self.timers.now_ms(), "timer fired");
        match action {
            TimerAction::DrawComplete { index } => self.finish_draw(index, events),
            TimerAction::ScanComplete => self.finish_scan(events),
            TimerAction::PressureTick => self.on_pressure_tick(events),
            TimerAction::DecayTick => self.on_decay_tick(events),
            TimerAction::DecompressDone => self.finish_decompress(events),
            TimerAction::BreathElapsed => self.on_breath_elapsed(handle, events),
        }
    }

    fn finish_draw(&mut self, index: usize, events: &mut Vec<Event>) {
        self.drawing = false;
        if self.phase != Phase::Picking || index >= self.deck.len() {
            tracing::debug!(index, "stale draw ignored");
            return;
        }
        let card = self.deck.remove(index);
        self.round += 1;
        self.revealed = false;
        self.scanning = false;
        self.log(LogKind::Card, format!("Drew: {}", card.label));
        events.push(Event::CardDrawn {
            card_id: card.id.clone(),
            round: self.round,
            total_rounds: self.total_rounds,
            at: Utc::now(),
        });
        self.active_card = Some(card);
        self.phase = Phase::Playing;
    }

    fn finish_scan(&mut self, events: &mut Vec<Event>) {
        self.scanning = false;
        let Some(card_id) = self
            .active_card
            .as_ref()
            .filter(|_| self.phase == Phase::Playing)
            .map(|c| c.id.clone())
        else {
            return;
        };
        self.revealed = true;
        self.cue(AudioCue::Correct, None);
        events.push(Event::CardRevealed {
            card_id,
            at: Utc::now(),
        });
    }

    fn on_pressure_tick(&mut self, events: &mut Vec<Event>) {
        if !self.in_step(StabilizeStep::Pressure) || !self.pressure.is_pressing() {
            return;
        }
        let increment =
            PressureGauge::hold_increment(self.mission.pressure_duration_secs, self.timing.tick_ms);
        let full = self.pressure.rise(increment);
        events.push(Event::PressureChanged {
            value: self.pressure.value(),
            at: Utc::now(),
        });
        if full {
            if let Some(hold) = self.pressure.hold_timer.take() {
                self.timers.cancel(hold);
            }
            events.push(Event::PressureFull { at: Utc::now() });
        }
    }

    fn on_decay_tick(&mut self, events: &mut Vec<Event>) {
        if !self.in_step(StabilizeStep::Pressure) {
            return;
        }
        let empty = self.pressure.sink(self.timing.pressure_decay_per_tick);
        events.push(Event::PressureChanged {
            value: self.pressure.value(),
            at: Utc::now(),
        });
        if empty {
            if let Some(decay) = self.pressure.decay_timer.take() {
                self.timers.cancel(decay);
            }
        }
    }

    fn finish_decompress(&mut self, events: &mut Vec<Event>) {
        if !self.in_step(StabilizeStep::Pressure) {
            return;
        }
        self.pressure.set_decompressing(false);
        self.advance_step(events);
    }

    fn on_breath_elapsed(&mut self, handle: TimerHandle, events: &mut Vec<Event>) {
        if !self.in_step(StabilizeStep::Breath) || self.breath.pending != Some(handle) {
            tracing::debug!("stale breath transition ignored");
            return;
        }
        self.breath.pending = None;
        let phase = self.breath.step(self.mission.breath_cycles);
        match phase {
            BreathPhase::Inhale => {
                self.cue(AudioCue::Inhale, Some(f64::from(self.mission.inhale_secs)))
            }
            BreathPhase::Exhale => {
                self.cue(AudioCue::Exhale, Some(f64::from(self.mission.exhale_secs)))
            }
            _ => {}
        }
        events.push(Event::BreathPhaseChanged {
            phase,
            count: self.breath.count(),
            at: Utc::now(),
        });
        if phase == BreathPhase::Done {
            events.push(Event::BreathCompleted {
                cycles: self.breath.count(),
                at: Utc::now(),
            });
        } else {
            self.schedule_breath();
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn enter_stabilizing(&mut self, events: &mut Vec<Event>) {
        self.cancel_timers();
        match first_enabled_step(&self.mission) {
            None => self.advance_turn(events),
            Some(step) => {
                self.phase = Phase::Stabilizing;
                self.open_step(step);
                tracing::debug!(?step, "stabilizing");
                events.push(Event::StabilizeEntered {
                    step,
                    at: Utc::now(),
                });
            }
        }
    }

    fn advance_step(&mut self, events: &mut Vec<Event>) {
        self.cancel_timers();
        let from = self.stabilize_step;
        match next_enabled_step(&self.mission, from) {
            None => self.advance_turn(events),
            Some(to) => {
                self.open_step(to);
                events.push(Event::StepAdvanced {
                    from,
                    to,
                    at: Utc::now(),
                });
            }
        }
    }

    fn open_step(&mut self, step: StabilizeStep) {
        self.stabilize_step = step;
        self.pressure = PressureGauge::new();
        self.breath = BreathCycle::new();
        self.report = ReportSelection::default();
        if step == StabilizeStep::Breath {
            self.schedule_breath();
        }
    }

    /// Arm the transition out of the current breathing phase, unless one is
    /// already pending for it.
    fn schedule_breath(&mut self) {
        if self.breath.pending.is_some() {
            tracing::trace!("breath transition already pending");
            return;
        }
        let Some(delay) = self.breath.phase_duration_ms(&self.mission, &self.timing) else {
            return;
        };
        let handle = self.timers.schedule(delay, TimerAction::BreathElapsed);
        self.breath.pending = Some(handle);
    }

    fn advance_turn(&mut self, events: &mut Vec<Event>) {
        self.cancel_timers();
        self.active_card = None;
        self.revealed = false;
        self.stabilize_step = StabilizeStep::Pressure;
        self.pressure = PressureGauge::new();
        self.breath = BreathCycle::new();
        self.report = ReportSelection::default();

        if self.deck.is_empty() {
            self.phase = Phase::Result;
            tracing::info!(score = self.score, xp = self.xp, "mission complete");
            events.push(Event::MissionCompleted {
                score: self.score,
                xp: self.xp,
                rounds: self.round,
                at: Utc::now(),
            });
        } else {
            self.phase = Phase::Picking;
            events.push(Event::TurnAdvanced {
                phase: self.phase,
                remaining: self.deck.len(),
                at: Utc::now(),
            });
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Cancel every pending timer and drop the flags that were waiting on one.
    fn cancel_timers(&mut self) -> usize {
        let cancelled = self.timers.cancel_all();
        self.pressure.forget_timers();
        self.pressure.set_pressing(false);
        self.pressure.set_decompressing(false);
        self.breath.pending = None;
        self.drawing = false;
        self.scanning = false;
        cancelled
    }

    fn clear_mission(&mut self) {
        self.score = 0;
        self.round = 0;
        self.total_rounds = 0;
        self.deck.clear();
        self.active_card = None;
        self.location = None;
        self.mission_id = None;
        self.stabilize_step = StabilizeStep::Pressure;
        self.revealed = false;
        self.pressure = PressureGauge::new();
        self.breath = BreathCycle::new();
        self.report = ReportSelection::default();
    }

    fn in_step(&self, step: StabilizeStep) -> bool {
        self.phase == Phase::Stabilizing && self.stabilize_step == step
    }

    fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
        if let Err(e) = self.store.save_xp(self.xp) {
            tracing::warn!(error = %e, xp = self.xp, "failed to persist xp");
        }
    }

    fn log(&mut self, kind: LogKind, content: String) {
        self.history.append(LogEntry::new(kind, content));
    }

    fn cue(&self, cue: AudioCue, duration_hint: Option<f64>) {
        self.audio.play(cue, duration_hint);
    }

    fn report_changed(&self) -> Event {
        Event::ReportSelectionChanged {
            emotion: self.report.emotion.clone(),
            need: self.report.need.clone(),
            at: Utc::now(),
        }
    }

    fn reject(&self, intent: &'static str) -> Vec<Event> {
        tracing::debug!(intent, phase = ?self.phase, "intent rejected");
        Vec::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.timers.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueRecorder;
    use crate::storage::MemoryXpStore;

    fn session_with(mission: MissionConfig) -> (Session, MemoryXpStore, CueRecorder) {
        let store = MemoryXpStore::new();
        let audio = CueRecorder::new();
        let session = Session::new(Box::new(store.clone()), Arc::new(audio.clone()))
            .with_mission(mission)
            .with_seed(11);
        (session, store, audio)
    }

    fn session() -> (Session, MemoryXpStore, CueRecorder) {
        session_with(MissionConfig::default())
    }

    fn to_picking(session: &mut Session) {
        session.start_mission();
        session.select_location(Location::School);
        session.confirm_ready_and_build_deck();
        assert_eq!(session.phase(), Phase::Picking);
    }

    /// Draw and reveal the first card of the requested zone.
    fn play_card(session: &mut Session, zone: EmotionZone, boss: bool) -> Card {
        let index = session
            .deck()
            .iter()
            .position(|c| c.zone == zone && c.is_boss == boss)
            .expect("deck has a matching card");
        session.pick_card(index);
        session.advance(session.timing().draw_delay_ms);
        session.reveal_card();
        session.advance(session.timing().scan_delay_ms);
        assert!(session.is_revealed());
        session.active_card().cloned().unwrap()
    }

    #[test]
    fn starts_on_splash_with_stored_xp() {
        let store = MemoryXpStore::with_value("42");
        let session = Session::new(Box::new(store), Arc::new(CueRecorder::new()));
        assert_eq!(session.phase(), Phase::Splash);
        assert_eq!(session.xp(), 42);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn unavailable_store_starts_from_zero() {
        let mut session = Session::new(
            Box::new(MemoryXpStore::unavailable()),
            Arc::new(CueRecorder::new()),
        );
        assert_eq!(session.xp(), 0);
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Happy, false);
        session.decide(EmotionZone::Happy);
        assert_eq!(session.xp(), 5);
    }

    #[test]
    fn deck_committed_with_round_invariant() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        assert_eq!(session.total_rounds(), 5);
        assert_eq!(session.deck().len() as u32 + session.round(), session.total_rounds());
        play_card(&mut session, EmotionZone::Happy, false);
        assert_eq!(session.round(), 1);
        assert_eq!(session.deck().len() as u32 + session.round(), session.total_rounds());
    }

    #[test]
    fn pick_card_waits_for_draw_animation() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        assert!(!session.pick_card(0).is_empty());
        assert!(session.is_drawing());
        assert!(session.pick_card(1).is_empty());
        assert_eq!(session.phase(), Phase::Picking);
        assert!(session.active_card().is_none());
        session.advance(799);
        assert_eq!(session.phase(), Phase::Picking);
        session.advance(1);
        assert_eq!(session.phase(), Phase::Playing);
        assert!(session.active_card().is_some());
    }

    #[test]
    fn out_of_range_pick_is_noop() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        assert!(session.pick_card(99).is_empty());
        assert!(!session.is_drawing());
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn decide_requires_revealed_card() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        session.pick_card(0);
        session.advance(800);
        assert!(session.decide(EmotionZone::Happy).is_empty());
        session.reveal_card();
        assert!(session.reveal_card().is_empty());
        session.advance(1200);
        assert!(!session.decide(EmotionZone::Happy).is_empty());
    }

    #[test]
    fn correct_happy_card_scores_and_returns_to_picking() {
        let (mut session, store, _) = session();
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Happy, false);
        session.decide(EmotionZone::Happy);
        assert_eq!(session.score(), 20);
        assert_eq!(session.xp(), 5);
        assert_eq!(session.phase(), Phase::Picking);
        assert!(session.active_card().is_none());
        assert_eq!(store.raw().as_deref(), Some("5"));
        assert_eq!(session.history().latest().unwrap().kind, LogKind::Decision);
    }

    #[test]
    fn correct_boss_card_scores_fifty() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Unhappy, true);
        session.decide(EmotionZone::Unhappy);
        assert_eq!(session.score(), 50);
        assert_eq!(session.phase(), Phase::Stabilizing);
        assert_eq!(session.stabilize_step(), Some(StabilizeStep::Pressure));
    }

    #[test]
    fn wrong_answer_on_distress_card_still_stabilizes() {
        let (mut session, _, audio) = session();
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Unhappy, false);
        session.decide(EmotionZone::Happy);
        assert_eq!(session.score(), 0);
        assert_eq!(session.xp(), 0);
        assert_eq!(session.phase(), Phase::Stabilizing);
        assert!(session.active_card().is_some());
        assert_eq!(audio.count(AudioCue::Wrong), 1);
    }

    #[test]
    fn wrong_answer_on_happy_card_moves_on() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Happy, false);
        session.decide(EmotionZone::Unhappy);
        assert_eq!(session.phase(), Phase::Picking);
    }

    #[test]
    fn score_floor_is_zero() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Happy, false);
        session.score = 5;
        let events = session.decide(EmotionZone::Unhappy);
        assert_eq!(session.score(), 0);
        assert!(matches!(events[0], Event::DecisionMade { score: 0, correct: false, .. }));
    }

    #[test]
    fn stabilizing_starts_at_first_enabled_step() {
        let mission = MissionConfig {
            enable_pressure: false,
            ..MissionConfig::default()
        };
        let (mut session, _, _) = session_with(mission);
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Unhappy, false);
        session.decide(EmotionZone::Unhappy);
        assert_eq!(session.stabilize_step(), Some(StabilizeStep::Breath));
        assert_eq!(session.pending_timers(), 1);
    }

    #[test]
    fn all_steps_disabled_skips_stabilizing() {
        let mission = MissionConfig {
            enable_pressure: false,
            enable_breath: false,
            enable_report: false,
            ..MissionConfig::default()
        };
        let (mut session, _, _) = session_with(mission);
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Unhappy, false);
        session.decide(EmotionZone::Unhappy);
        assert_eq!(session.phase(), Phase::Picking);
        assert!(session.active_card().is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let store = MemoryXpStore::with_value("80");
        let mut session =
            Session::new(Box::new(store.clone()), Arc::new(CueRecorder::new())).with_seed(3);
        assert_eq!(session.xp(), 80);
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Happy, false);
        session.decide(EmotionZone::Happy);
        session.score = 120;
        session.xp = 85;
        assert!(!session.history().is_empty());

        session.reset_all_progress();
        assert_eq!(session.score(), 0);
        assert_eq!(session.xp(), 0);
        assert!(session.history().is_empty());
        assert_eq!(session.phase(), Phase::Splash);
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn reset_restores_baseline_mission() {
        let mission = MissionConfig {
            card_count: 8,
            ..MissionConfig::default()
        };
        let (mut session, _, _) = session_with(mission);
        session.update_mission_config(MissionSetting::CardCount(2));
        assert_eq!(session.mission().card_count, 2);
        session.reset_all_progress();
        assert_eq!(session.mission().card_count, 8);
    }

    #[test]
    fn config_is_frozen_once_deck_is_committed() {
        let (mut session, _, _) = session();
        session.start_mission();
        assert!(!session.update_mission_config(MissionSetting::CardCount(3)).is_empty());
        session.select_location(Location::Home);
        session.confirm_ready_and_build_deck();
        assert!(session
            .update_mission_config(MissionSetting::CardCount(9))
            .is_empty());
        assert_eq!(session.mission().card_count, 3);
        assert_eq!(session.total_rounds(), 3);
    }

    #[test]
    fn abort_keeps_xp_and_history() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        play_card(&mut session, EmotionZone::Happy, false);
        session.decide(EmotionZone::Happy);
        let history_len = session.history().len();
        session.abort_mission();
        assert_eq!(session.phase(), Phase::Splash);
        assert_eq!(session.xp(), 5);
        assert_eq!(session.score(), 0);
        assert_eq!(session.round(), 0);
        assert!(session.deck().is_empty());
        assert_eq!(session.history().len(), history_len);
    }

    #[test]
    fn abort_mid_draw_cancels_pending_draw() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        session.pick_card(0);
        session.abort_mission();
        assert_eq!(session.pending_timers(), 0);
        assert!(session.advance(5_000).is_empty());
        assert!(session.active_card().is_none());
    }

    #[test]
    fn invalid_intents_leave_state_untouched() {
        let (mut session, _, _) = session();
        let before = session.snapshot();
        assert!(session.select_location(Location::Home).is_empty());
        assert!(session.pick_card(0).is_empty());
        assert!(session.decide(EmotionZone::Happy).is_empty());
        assert!(session.pressure_hold().is_empty());
        assert!(session.confirm_report().is_empty());
        assert!(session.abort_mission().is_empty());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn result_after_last_card() {
        let mission = MissionConfig {
            card_count: 1,
            enable_pressure: false,
            enable_breath: false,
            enable_report: false,
            ..MissionConfig::default()
        };
        let (mut session, _, _) = session_with(mission);
        to_picking(&mut session);
        let card = play_card(&mut session, EmotionZone::Unhappy, true);
        assert!(card.is_boss);
        let events = session.decide(EmotionZone::Unhappy);
        assert_eq!(session.phase(), Phase::Result);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::MissionCompleted { score: 50, .. })));
        assert!(!session.start_mission().is_empty());
        assert_eq!(session.phase(), Phase::Routing);
    }

    #[test]
    fn snapshot_hides_step_outside_stabilizing() {
        let (session, _, _) = session();
        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::Splash);
        assert_eq!(snap.stabilize_step, None);
        assert!(!snap.can_confirm_breath);
        assert!(!snap.can_confirm_report);
    }

    #[test]
    fn teardown_cancels_pending_timers() {
        let (mut session, _, _) = session();
        to_picking(&mut session);
        session.pick_card(0);
        assert_eq!(session.teardown(), 1);
        assert_eq!(session.teardown(), 0);
        assert!(!session.is_drawing());
    }
}
