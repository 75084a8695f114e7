use serde::{Deserialize, Serialize};

/// An entry in the emotion or need picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportOption {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const EMOTIONS: [ReportOption; 6] = [
    ReportOption { id: "angry", label: "Really angry", icon: "Flame" },
    ReportOption { id: "sad", label: "So sad", icon: "Frown" },
    ReportOption { id: "scared", label: "Very scared", icon: "AlertTriangle" },
    ReportOption { id: "worried", label: "Worried", icon: "Cloud" },
    ReportOption { id: "nervous", label: "Too nervous", icon: "Zap" },
    ReportOption { id: "other", label: "Not feeling good", icon: "HelpCircle" },
];

pub const NEEDS: [ReportOption; 6] = [
    ReportOption { id: "hug", label: "I want a hug", icon: "Heart" },
    ReportOption { id: "water", label: "Sip of water", icon: "Droplets" },
    ReportOption { id: "base", label: "Go to my secret base", icon: "Shield" },
    ReportOption { id: "draw", label: "Draw or write", icon: "PenTool" },
    ReportOption { id: "music", label: "Listen to calm music", icon: "Music" },
    ReportOption { id: "move", label: "Move my body", icon: "Activity" },
];

pub fn find_emotion(id: &str) -> Option<&'static ReportOption> {
    EMOTIONS.iter().find(|o| o.id == id)
}

pub fn find_need(id: &str) -> Option<&'static ReportOption> {
    NEEDS.iter().find(|o| o.id == id)
}

/// What the player has picked so far in the report step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    pub emotion: Option<String>,
    pub need: Option<String>,
}

impl ReportSelection {
    pub fn is_complete(&self) -> bool {
        self.emotion.is_some() && self.need.is_some()
    }

    /// Human-readable labels for both picks, once complete.
    pub fn labels(&self) -> Option<(&'static str, &'static str)> {
        let emotion = find_emotion(self.emotion.as_deref()?)?;
        let need = find_need(self.need.as_deref()?)?;
        Some((emotion.label, need.label))
    }
}
