//! Audio cue port.
//!
//! The session fires cues and never waits on them. Behind the port sits one
//! process-wide output, created on the first cue, resumed whenever it reports
//! being suspended, and never torn down. Every failure is swallowed here.

use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Click,
    Draw,
    Scan,
    Correct,
    Wrong,
    PressureLoop,
    Inhale,
    Exhale,
    Hiss,
}

/// Fire-and-forget sound trigger.
pub trait AudioCuePort: Send + Sync {
    /// `duration_hint` is in seconds; only the sustained cues use it.
    fn play(&self, cue: AudioCue, duration_hint: Option<f64>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Running,
    Suspended,
    Closed,
}

/// Actual sound output. Implementations may fail freely.
pub trait AudioBackend: Send {
    fn state(&self) -> BackendState;

    fn resume(&mut self) -> Result<(), AudioError>;

    fn play(&mut self, cue: AudioCue, duration_hint: Option<f64>) -> Result<(), AudioError>;
}

type BackendFactory = Box<dyn Fn() -> Result<Box<dyn AudioBackend>, AudioError> + Send + Sync>;

/// Lazily created audio output shared by everything that plays cues.
pub struct SharedAudio {
    enabled: bool,
    factory: BackendFactory,
    backend: Mutex<Option<Box<dyn AudioBackend>>>,
}

static GLOBAL_AUDIO: OnceLock<SharedAudio> = OnceLock::new();

impl SharedAudio {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn AudioBackend>, AudioError> + Send + Sync + 'static,
    {
        Self {
            enabled: true,
            factory: Box::new(factory),
            backend: Mutex::new(None),
        }
    }

    /// Output that only logs cues.
    pub fn tracing() -> Self {
        Self::new(|| Ok(Box::new(TracingBackend) as Box<dyn AudioBackend>))
    }

    pub fn muted(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Install the process-wide output. Returns `false` if one already exists.
    pub fn install_global(audio: SharedAudio) -> bool {
        GLOBAL_AUDIO.set(audio).is_ok()
    }

    /// The process-wide output, defaulting to [`SharedAudio::tracing`].
    pub fn global() -> &'static SharedAudio {
        GLOBAL_AUDIO.get_or_init(SharedAudio::tracing)
    }

    pub fn is_initialized(&self) -> bool {
        self.backend
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn try_play(&self, cue: AudioCue, duration_hint: Option<f64>) -> Result<(), AudioError> {
        let mut guard = self
            .backend
            .lock()
            .map_err(|_| AudioError::Playback("audio lock poisoned".into()))?;
        if guard.is_none() {
            *guard = Some((self.factory)()?);
            tracing::debug!("audio output created");
        }
        let backend = guard.as_mut().ok_or(AudioError::Unavailable)?;
        match backend.state() {
            BackendState::Closed => return Err(AudioError::Closed),
            BackendState::Suspended => backend.resume()?,
            BackendState::Running => {}
        }
        backend.play(cue, duration_hint)
    }
}

impl AudioCuePort for SharedAudio {
    fn play(&self, cue: AudioCue, duration_hint: Option<f64>) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.try_play(cue, duration_hint) {
            tracing::debug!(?cue, error = %e, "audio cue dropped");
        }
    }
}

/// Port that forwards to [`SharedAudio::global`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAudio;

impl AudioCuePort for GlobalAudio {
    fn play(&self, cue: AudioCue, duration_hint: Option<f64>) {
        SharedAudio::global().play(cue, duration_hint);
    }
}

/// Backend that writes each cue to the log instead of a speaker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl AudioBackend for TracingBackend {
    fn state(&self) -> BackendState {
        BackendState::Running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, cue: AudioCue, duration_hint: Option<f64>) -> Result<(), AudioError> {
        tracing::debug!(?cue, ?duration_hint, "cue");
        Ok(())
    }
}

/// Port that remembers every cue it was asked to play.
#[derive(Debug, Clone, Default)]
pub struct CueRecorder {
    cues: Arc<Mutex<Vec<(AudioCue, Option<f64>)>>>,
}

impl CueRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<AudioCue> {
        self.played().into_iter().map(|(cue, _)| cue).collect()
    }

    pub fn played(&self) -> Vec<(AudioCue, Option<f64>)> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, cue: AudioCue) -> usize {
        self.cues().into_iter().filter(|c| *c == cue).count()
    }

    pub fn clear(&self) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.clear();
        }
    }
}

impl AudioCuePort for CueRecorder {
    fn play(&self, cue: AudioCue, duration_hint: Option<f64>) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push((cue, duration_hint));
        }
    }
}
