use serde::{Deserialize, Serialize};
use types::{ChatMessage, Phase};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Public,
    WolfWhisper,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub game_id: Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub seed: Option<u64>,
    pub player_order: Vec<u32>,
    pub configuration: Option<serde_json::Value>,
}

impl GameMetadata {
    pub fn new(seed: Option<u64>, player_order: Vec<u32>) -> Self {
        Self {
            game_id: Uuid::new_v4(),
            started_at: chrono::Utc::now(),
            seed,
            player_order,
            configuration: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub game_id: Uuid,
    pub round: u32,
    pub phase: Option<Phase>,
    pub channel: Channel,
    pub sequence: usize,
    pub speaker_id: u32,
    pub speaker: String,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MessageRecord {
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            id: self.speaker_id,
            name: self.speaker.clone(),
            text: self.text.clone(),
        }
    }
}

/// One line of a JSON-lines transcript file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptLine {
    Game(GameMetadata),
    Message(MessageRecord),
}
