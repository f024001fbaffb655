use rand::rngs::StdRng;
use recorder::MessageObserver;
use tokio::time::timeout;
use types::{ChatMessage, GenerationError, Player, Roster, TextGenerator, Turn};

use crate::config::{FailurePolicy, RoundSettings};
use crate::prompts::sanitize_response;
use crate::SimulationError;

/// What a night or day hands back to the caller.
#[derive(Clone, Debug)]
pub struct RoundOutcome {
    pub roster: Roster,
    /// Prior chat followed by everything the round said publicly.
    pub transcript: Vec<ChatMessage>,
    /// Tonight's private werewolf whispers. Always empty for a day.
    pub wolf_chat: Vec<ChatMessage>,
    /// Id of the player killed or lynched, if any.
    pub eliminated: Option<u32>,
}

/// Everything a round needs besides the roster and the chat.
pub struct Table<'a> {
    pub generator: &'a mut dyn TextGenerator,
    pub observer: &'a mut dyn MessageObserver,
    pub rng: &'a mut StdRng,
    pub settings: &'a RoundSettings,
}

impl<'a> Table<'a> {
    pub fn new(
        generator: &'a mut dyn TextGenerator,
        observer: &'a mut dyn MessageObserver,
        rng: &'a mut StdRng,
        settings: &'a RoundSettings,
    ) -> Self {
        Self {
            generator,
            observer,
            rng,
            settings,
        }
    }

    /// Hands a public message to the observer, then appends it to the transcript.
    pub async fn announce(
        &mut self,
        transcript: &mut Vec<ChatMessage>,
        message: ChatMessage,
    ) -> Result<(), SimulationError> {
        log::info!("{message}");
        self.observer.on_message(&message).await?;
        transcript.push(message);
        Ok(())
    }

    pub async fn narrate(
        &mut self,
        transcript: &mut Vec<ChatMessage>,
        text: impl Into<String>,
    ) -> Result<(), SimulationError> {
        self.announce(transcript, ChatMessage::narrator(text)).await
    }

    /// Asks the generator for `speaker`'s next line.
    ///
    /// The call is bounded by the configured timeout. A failed call either becomes the
    /// placeholder line or aborts the round, depending on the failure policy.
    pub async fn speak(
        &mut self,
        speaker: &Player,
        conversation: &[Turn],
    ) -> Result<String, SimulationError> {
        let limit = self.settings.timeout();
        let result = match timeout(limit, self.generator.generate(conversation)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(limit)),
        };
        match result {
            Ok(raw) => Ok(sanitize_response(
                &raw,
                self.settings.max_sentences,
                self.settings.strip_commas,
            )),
            Err(source) => match self.settings.failure_policy {
                FailurePolicy::Placeholder => {
                    log::warn!("Generation failed for {}: {source}", speaker.name);
                    Ok(self.settings.placeholder.clone())
                }
                FailurePolicy::Abort => Err(SimulationError::Generation {
                    speaker: speaker.name.clone(),
                    source,
                }),
            },
        }
    }
}
