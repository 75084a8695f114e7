//! Scripted mission runs.
//!
//! The CLI has no player, so a run plays itself: it picks cards at random,
//! answers correctly with the given accuracy, and completes every calming step
//! it is sent to. Time is virtual; a full mission finishes instantly.

use std::sync::Arc;

use clap::Subcommand;
use emopilot_core::stabilize::{EMOTIONS, NEEDS};
use emopilot_core::storage::Database;
use emopilot_core::{
    Config, EmotionZone, Event, GlobalAudio, Location, MemoryXpStore, MissionSetting, Phase, Session,
    SharedAudio, StabilizeStep, XpStore,
};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::Serialize;

/// Upper bound on intents per mission; a stuck run fails instead of looping.
const MAX_STEPS: usize = 10_000;
/// Clock step while waiting for the breathing exercise.
const BREATH_POLL_MS: u64 = 100;

#[derive(Subcommand)]
pub enum MissionAction {
    /// Play one mission to the end and print what happened
    Run {
        /// Scenario location (school, home, playground)
        #[arg(long, default_value = "school")]
        location: Location,
        /// Seed for the deck shuffle and the scripted choices
        #[arg(long)]
        seed: Option<u64>,
        /// Chance of classifying a card correctly, 0.0 to 1.0
        #[arg(long, default_value_t = 1.0)]
        accuracy: f64,
        /// Deck size for this run only
        #[arg(long)]
        count: Option<u32>,
        /// Mission setting for this run only, as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
        /// Do not read or write stored experience points
        #[arg(long)]
        ephemeral: bool,
        /// Print every event as a JSON line
        #[arg(long)]
        events: bool,
    },
    /// Print the mission settings a new run would use
    Show,
}

#[derive(Serialize)]
struct RunSummary {
    location: Location,
    rounds: u32,
    score: u32,
    xp: u32,
    correct: u32,
    missed: u32,
    reports: u32,
    elapsed_ms: u64,
}

fn parse_setting(raw: &str) -> Result<MissionSetting, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    MissionSetting::parse(key.trim(), value.trim())
}

fn other_zone(zone: EmotionZone) -> EmotionZone {
    match zone {
        EmotionZone::Happy => EmotionZone::Unhappy,
        EmotionZone::Unhappy => EmotionZone::Happy,
    }
}

struct Runner {
    session: Session,
    rng: Mcg128Xsl64,
    accuracy: f64,
    print_events: bool,
    correct: u32,
    missed: u32,
    reports: u32,
}

impl Runner {
    fn emit(&mut self, events: Vec<Event>) -> Result<bool, serde_json::Error> {
        for event in &events {
            match event {
                Event::DecisionMade { correct: true, .. } => self.correct += 1,
                Event::DecisionMade { correct: false, .. } => self.missed += 1,
                Event::ReportConfirmed { .. } => self.reports += 1,
                _ => {}
            }
            if self.print_events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        Ok(!events.is_empty())
    }

    fn expect(&mut self, events: Vec<Event>, intent: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.emit(events)? {
            Ok(())
        } else {
            Err(format!("{intent} was rejected in phase {:?}", self.session.phase()).into())
        }
    }

    fn tick(&mut self, ms: u64) -> Result<(), serde_json::Error> {
        let events = self.session.advance(ms);
        self.emit(events).map(|_| ())
    }

    fn play_card(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let index = self.rng.gen_range(0..self.session.deck().len());
        let events = self.session.pick_card(index);
        self.expect(events, "pick_card")?;
        self.tick(self.session.timing().draw_delay_ms)?;

        let events = self.session.reveal_card();
        self.expect(events, "reveal_card")?;
        self.tick(self.session.timing().scan_delay_ms)?;

        let actual = self
            .session
            .active_card()
            .map(|c| c.zone)
            .ok_or("no card drawn")?;
        let choice = if self.rng.gen_bool(self.accuracy) {
            actual
        } else {
            other_zone(actual)
        };
        let events = self.session.decide(choice);
        self.expect(events, "decide")
    }

    fn stabilize(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        while let Some(step) = self.session.stabilize_step() {
            match step {
                StabilizeStep::Pressure => self.pressure()?,
                StabilizeStep::Breath => self.breathe()?,
                StabilizeStep::Report => self.report()?,
            }
        }
        Ok(())
    }

    fn pressure(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let events = self.session.pressure_hold();
        self.expect(events, "pressure_hold")?;
        let hold_ms = u64::from(self.session.mission().pressure_duration_secs) * 1000;
        self.tick(hold_ms)?;

        // The gauge fills on whole ticks, which can land past the nominal hold.
        let tick_ms = self.session.timing().tick_ms.max(1);
        let mut polls = 0;
        while !self.session.pressure().is_full() {
            polls += 1;
            if polls > MAX_STEPS {
                return Err("pressure gauge never filled".into());
            }
            self.tick(tick_ms)?;
        }

        let events = self.session.confirm_pressure_done();
        self.expect(events, "confirm_pressure_done")?;
        self.tick(self.session.timing().decompress_delay_ms)?;
        Ok(())
    }

    fn breathe(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut polls = 0;
        while !self.session.can_confirm_breath() {
            polls += 1;
            if polls > MAX_STEPS {
                return Err("breathing exercise never finished".into());
            }
            self.tick(BREATH_POLL_MS)?;
        }
        let events = self.session.advance_breath_step();
        self.expect(events, "advance_breath_step")
    }

    fn report(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let suggested = self.session.active_card().and_then(|c| c.suggested.clone());
        let (emotion, need) = match suggested {
            Some(s) => (s.emotion, s.need),
            None => {
                let emotion = EMOTIONS.choose(&mut self.rng).map(|o| o.id).unwrap_or("other");
                let need = NEEDS.choose(&mut self.rng).map(|o| o.id).unwrap_or("hug");
                (emotion.to_string(), need.to_string())
            }
        };
        let events = self.session.select_emotion(&emotion);
        self.expect(events, "select_emotion")?;
        let events = self.session.select_need(&need);
        self.expect(events, "select_need")?;
        let events = self.session.confirm_report();
        self.expect(events, "confirm_report")
    }
}

pub fn run(action: MissionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        MissionAction::Show => {
            println!("{}", toml::to_string_pretty(&config.mission)?);
        }
        MissionAction::Run {
            location,
            seed,
            accuracy,
            count,
            settings,
            ephemeral,
            events,
        } => {
            if !(0.0..=1.0).contains(&accuracy) {
                return Err(format!("accuracy must be between 0 and 1, got {accuracy}").into());
            }
            tracing::debug!(%location, ?seed, accuracy, "scripted mission run");
            let mut overrides = settings
                .iter()
                .map(|raw| parse_setting(raw))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(count) = count {
                overrides.push(MissionSetting::CardCount(count));
            }

            let audio = if config.audio.enabled {
                SharedAudio::tracing()
            } else {
                SharedAudio::tracing().muted()
            };
            SharedAudio::install_global(audio);

            let store: Box<dyn XpStore> = if ephemeral {
                Box::new(MemoryXpStore::new())
            } else {
                Box::new(Database::open()?)
            };
            let mut session = Session::from_config(&config, store, Arc::new(GlobalAudio));
            let rng = match seed {
                Some(seed) => {
                    session = session.with_seed(seed);
                    Mcg128Xsl64::seed_from_u64(seed.wrapping_add(1))
                }
                None => Mcg128Xsl64::from_entropy(),
            };

            let mut runner = Runner {
                session,
                rng,
                accuracy,
                print_events: events,
                correct: 0,
                missed: 0,
                reports: 0,
            };

            let started = runner.session.start_mission();
            runner.expect(started, "start_mission")?;
            for setting in overrides {
                let applied = runner.session.update_mission_config(setting);
                runner.expect(applied, "update_mission_config")?;
            }
            let selected = runner.session.select_location(location);
            runner.expect(selected, "select_location")?;
            let committed = runner.session.confirm_ready_and_build_deck();
            runner.expect(committed, "confirm_ready_and_build_deck")?;

            let mut turns = 0;
            while runner.session.phase() != Phase::Result {
                turns += 1;
                if turns > MAX_STEPS {
                    return Err("mission did not finish".into());
                }
                runner.play_card()?;
                runner.stabilize()?;
            }

            let summary = RunSummary {
                location,
                rounds: runner.session.round(),
                score: runner.session.score(),
                xp: runner.session.xp(),
                correct: runner.correct,
                missed: runner.missed,
                reports: runner.reports,
                elapsed_ms: runner.session.now_ms(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
