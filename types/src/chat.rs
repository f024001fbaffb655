use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Player;

pub const NARRATOR_ID: u32 = 0;
pub const NARRATOR_NAME: &str = "Narrator";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Night,
    Day,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Night => write!(f, "Night"),
            Phase::Day => write!(f, "Day"),
        }
    }
}

/// One utterance in a transcript. `id` 0 is reserved for the narrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u32,
    pub name: String,
    pub text: String,
}

impl Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.text)
    }
}

impl ChatMessage {
    pub fn narrator(text: impl Into<String>) -> Self {
        Self {
            id: NARRATOR_ID,
            name: NARRATOR_NAME.to_string(),
            text: text.into(),
        }
    }

    pub fn from_player(player: &Player, text: impl Into<String>) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            text: text.into(),
        }
    }

    /// The decorated form used when a private whisper is shown on the public channel.
    pub fn whisper(player: &Player, text: impl Into<String>) -> Self {
        Self {
            id: player.id,
            name: format!("{} (wolf whisper)", player.name),
            text: text.into(),
        }
    }

    pub fn is_narrator(&self) -> bool {
        self.id == NARRATOR_ID
    }
}
