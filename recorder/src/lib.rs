pub mod collector;
pub mod error;
pub mod models;
pub mod observer;
pub mod retry;
pub mod writers;

pub use collector::TranscriptCollector;
pub use error::RecorderError;
pub use models::{Channel, GameMetadata, MessageRecord, TranscriptLine};
pub use observer::{MessageObserver, ObserverSet};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use writers::JsonlTranscriptWriter;

// NoopRecorder for when nobody is watching the transcript
pub struct NoopRecorder;

#[async_trait::async_trait]
impl MessageObserver for NoopRecorder {
    async fn on_message(&mut self, _message: &types::ChatMessage) -> Result<(), RecorderError> {
        Ok(())
    }
}
