//! # Emotion Pilot Core Library
//!
//! This library provides the game logic for Emotion Pilot, a card game that
//! teaches children to tell comfortable feelings from distressing ones and
//! walks them through a short calming routine after each distress card.
//!
//! The CLI binary drives the same session the graphical front end would, so
//! every rule lives here.
//!
//! ## Architecture
//!
//! - **Session**: A single-owner state machine. Player intents and timer
//!   firings are applied one at a time and each returns the [`Event`]s it
//!   produced
//! - **Timer registry**: Virtual-clock handle table for every delayed or
//!   repeating callback; the caller advances it
//! - **Deck builder**: Balanced, shuffled decks with exactly one boss card
//! - **Storage**: SQLite key-value store for career XP and TOML configuration
//! - **Audio**: Fire-and-forget cue port over one lazily created output
//!
//! ## Key Components
//!
//! - [`Session`]: Game state machine
//! - [`TimerRegistry`]: Cancellable scheduling on a virtual clock
//! - [`DeckBuilder`]: Deck construction
//! - [`Database`]: XP persistence
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod deck;
pub mod error;
pub mod events;
pub mod history;
pub mod mission;
pub mod session;
pub mod stabilize;
pub mod storage;
pub mod timer;

pub use audio::{AudioCue, AudioCuePort, CueRecorder, GlobalAudio, SharedAudio};
pub use deck::{BuiltDeck, Card, DeckBuilder, EmotionZone, Location};
pub use error::{AudioError, ConfigError, DeckError, StorageError};
pub use events::Event;
pub use history::{HistoryLog, LogEntry, LogKind};
pub use mission::{MissionConfig, MissionSetting, TimingConfig};
pub use session::{Phase, Session, SessionSnapshot};
pub use stabilize::{BreathPhase, StabilizeStep};
pub use storage::{Config, Database, MemoryXpStore, XpStore};
pub use timer::{TimerHandle, TimerRegistry};
