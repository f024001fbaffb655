use async_trait::async_trait;
use types::{ChatMessage, Phase};

use crate::RecorderError;

/// Receives every message a round produces, in emission order.
///
/// Each call is awaited before the orchestrator issues its next generation call,
/// so implementations should return promptly.
#[async_trait]
pub trait MessageObserver: Send {
    async fn start_phase(&mut self, _round: u32, _phase: Phase) -> Result<(), RecorderError> {
        Ok(())
    }

    /// A message on the public channel. Everything passed here ends up in the
    /// round's returned transcript, in the same order.
    async fn on_message(&mut self, message: &ChatMessage) -> Result<(), RecorderError>;

    /// A werewolf whisper on the private channel.
    async fn on_whisper(&mut self, _message: &ChatMessage) -> Result<(), RecorderError> {
        Ok(())
    }
}

/// Forwards every call to each inner observer in turn.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn MessageObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Box<dyn MessageObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[async_trait]
impl MessageObserver for ObserverSet {
    async fn start_phase(&mut self, round: u32, phase: Phase) -> Result<(), RecorderError> {
        for observer in self.observers.iter_mut() {
            observer.start_phase(round, phase).await?;
        }
        Ok(())
    }

    async fn on_message(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        for observer in self.observers.iter_mut() {
            observer.on_message(message).await?;
        }
        Ok(())
    }

    async fn on_whisper(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        for observer in self.observers.iter_mut() {
            observer.on_whisper(message).await?;
        }
        Ok(())
    }
}
