use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a scenario should make the player feel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionZone {
    Happy,
    Unhappy,
}

impl EmotionZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionZone::Happy => "happy",
            EmotionZone::Unhappy => "unhappy",
        }
    }

    /// Distress cards always lead into the stabilizing protocol.
    pub fn is_distress(&self) -> bool {
        matches!(self, EmotionZone::Unhappy)
    }
}

impl fmt::Display for EmotionZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "happy" => Ok(EmotionZone::Happy),
            "unhappy" => Ok(EmotionZone::Unhappy),
            other => Err(format!("unknown emotion zone: {other}")),
        }
    }
}

/// Where the player's scenarios take place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    School,
    Home,
    Playground,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::School, Location::Home, Location::Playground];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::School => "school",
            Location::Home => "home",
            Location::Playground => "playground",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown location: {s}"))
    }
}

/// Emotion and need a helper would suggest for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedResponse {
    pub emotion: String,
    pub need: String,
}

/// A scenario card. Built once from constant data and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub zone: EmotionZone,
    pub label: String,
    /// Icon name resolved by the presentation layer.
    pub icon: String,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested: Option<SuggestedResponse>,
}

impl Card {
    pub fn new(id: &str, zone: EmotionZone, label: &str, icon: &str) -> Self {
        Self {
            id: id.into(),
            zone,
            label: label.into(),
            icon: icon.into(),
            is_boss: false,
            suggested: None,
        }
    }

    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    pub fn suggest(mut self, emotion: &str, need: &str) -> Self {
        self.suggested = Some(SuggestedResponse {
            emotion: emotion.into(),
            need: need.into(),
        });
        self
    }

    /// Points awarded for classifying this card correctly.
    pub fn reward(&self) -> u32 {
        if self.is_boss {
            50
        } else {
            20
        }
    }
}
