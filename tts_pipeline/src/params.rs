//! Per-request voice parameters and their wire rendering.

use serde::{Deserialize, Serialize};

pub const DEFAULT_VOICE: &str = "en-US-JennyNeural";

/// A prosody adjustment: either a numeric offset, rendered with an explicit
/// sign and unit (`"+5%"`, `"-10%"`, `"+0Hz"`), or a literal string passed
/// to the service as-is (`"fast"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Prosody {
    Offset(i32),
    Literal(String),
}

impl Prosody {
    fn render(&self, suffix: &str) -> String {
        match self {
            Prosody::Offset(value) => format!("{value:+}{suffix}"),
            Prosody::Literal(text) => text.clone(),
        }
    }

    /// The numeric offset, if this is one.
    pub fn offset(&self) -> Option<i32> {
        match self {
            Prosody::Offset(value) => Some(*value),
            Prosody::Literal(_) => None,
        }
    }
}

impl Default for Prosody {
    fn default() -> Self {
        Prosody::Offset(0)
    }
}

impl From<i32> for Prosody {
    fn from(value: i32) -> Self {
        Prosody::Offset(value)
    }
}

/// Voice selection plus prosody adjustments for one synthesis request.
/// Rate and volume are percentage offsets, pitch is a Hz offset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceParams {
    pub voice: String,
    #[serde(default)]
    pub rate: Prosody,
    #[serde(default)]
    pub pitch: Prosody,
    #[serde(default)]
    pub volume: Prosody,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            rate: Prosody::default(),
            pitch: Prosody::default(),
            volume: Prosody::default(),
        }
    }
}

impl VoiceParams {
    pub fn for_voice(voice: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            ..Default::default()
        }
    }

    pub fn rate_param(&self) -> String {
        self.rate.render("%")
    }

    pub fn pitch_param(&self) -> String {
        self.pitch.render("Hz")
    }

    pub fn volume_param(&self) -> String {
        self.volume.render("%")
    }
}
