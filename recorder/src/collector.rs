use async_trait::async_trait;
use types::{ChatMessage, Phase};

use crate::{MessageObserver, RecorderError};

/// Keeps everything it is shown in memory.
#[derive(Debug, Clone, Default)]
pub struct TranscriptCollector {
    pub messages: Vec<ChatMessage>,
    pub whispers: Vec<ChatMessage>,
    pub phases: Vec<(u32, Phase)>,
}

impl TranscriptCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn whispers(&self) -> &[ChatMessage] {
        &self.whispers
    }

    pub fn narration(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.is_narrator())
            .map(|m| m.text.as_str())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.whispers.clear();
        self.phases.clear();
    }
}

#[async_trait]
impl MessageObserver for TranscriptCollector {
    async fn start_phase(&mut self, round: u32, phase: Phase) -> Result<(), RecorderError> {
        self.phases.push((round, phase));
        Ok(())
    }

    async fn on_message(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        self.messages.push(message.clone());
        Ok(())
    }

    async fn on_whisper(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        self.whispers.push(message.clone());
        Ok(())
    }
}
