use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use types::{ChatMessage, Phase};

use crate::models::{Channel, GameMetadata, MessageRecord, TranscriptLine};
use crate::{MessageObserver, RecorderError};

/// Streams each message to `W` as one JSON object per line, flushing as it goes.
pub struct JsonlTranscriptWriter<W> {
    out: W,
    metadata: GameMetadata,
    round: u32,
    phase: Option<Phase>,
    sequence: usize,
}

impl JsonlTranscriptWriter<tokio::fs::File> {
    pub async fn create(path: impl AsRef<Path>, metadata: GameMetadata) -> Result<Self, RecorderError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = tokio::fs::File::create(path).await?;
        tracing::info!("Writing transcript to {}", path.display());
        Self::new(file, metadata).await
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonlTranscriptWriter<W> {
    pub async fn new(out: W, metadata: GameMetadata) -> Result<Self, RecorderError> {
        let mut writer = Self {
            out,
            metadata,
            round: 0,
            phase: None,
            sequence: 0,
        };
        let header = TranscriptLine::Game(writer.metadata.clone());
        writer.write_line(&header).await?;
        Ok(writer)
    }

    pub fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    async fn write_line(&mut self, line: &TranscriptLine) -> Result<(), RecorderError> {
        let mut bytes = serde_json::to_vec(line)?;
        bytes.push(b'\n');
        self.out.write_all(&bytes).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn record(&mut self, message: &ChatMessage, channel: Channel) -> Result<(), RecorderError> {
        self.sequence += 1;
        let record = MessageRecord {
            game_id: self.metadata.game_id,
            round: self.round,
            phase: self.phase,
            channel,
            sequence: self.sequence,
            speaker_id: message.id,
            speaker: message.name.clone(),
            text: message.text.clone(),
            created_at: chrono::Utc::now(),
        };
        self.write_line(&TranscriptLine::Message(record)).await
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MessageObserver for JsonlTranscriptWriter<W> {
    async fn start_phase(&mut self, round: u32, phase: Phase) -> Result<(), RecorderError> {
        tracing::debug!("Transcript entering {phase} {round}");
        self.round = round;
        self.phase = Some(phase);
        Ok(())
    }

    async fn on_message(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        self.record(message, Channel::Public).await
    }

    async fn on_whisper(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        self.record(message, Channel::WolfWhisper).await
    }
}
