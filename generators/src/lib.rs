pub mod http;
pub mod input_generator;
pub mod prompt_parsing;
pub mod seat;

use std::collections::VecDeque;
use std::fmt::Debug;

use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use types::{GenerationError, TextGenerator, Turn};

pub use crate::http::{extract_reply, ChatCompletionsGenerator};
pub use crate::input_generator::InputGenerator;
pub use crate::seat::HumanSeatGenerator;

const DAY_LINES: [&str; 6] = [
    "I suspect {name} is the wolf.",
    "{name} has been awfully quiet today.",
    "Something about {name} feels shady to me.",
    "I trust {name} more than the rest of you.",
    "We should vote for {name} before night falls.",
    "I was home all night and heard nothing.",
];

const WHISPER_LINES: [&str; 3] = [
    "Let us take {name} tonight.",
    "{name} is getting close to the truth.",
    "I say {name}. Nobody will miss them.",
];

const VOTE_LINES: [&str; 2] = [
    "I vote for {name}. Their story does not add up.",
    "{name}. I cannot trust them.",
];

/// Produces canned lines about random living players without calling any service.
///
/// It reads the name lists out of the system prompt, so day talk lands on living
/// players, whispers land on villagers and votes land on the accused.
#[derive(Debug)]
pub struct RandomGenerator {
    rng: StdRng,
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

#[async_trait]
impl TextGenerator for RandomGenerator {
    async fn generate(&mut self, conversation: &[Turn]) -> Result<String, GenerationError> {
        let speaker = prompt_parsing::speaker(conversation);
        let (lines, names): (&[&str], Vec<String>) = {
            let options = prompt_parsing::listed_names(conversation, "Choose ONE name from");
            let villagers = prompt_parsing::listed_names(conversation, "Villagers alive");
            if !options.is_empty() {
                (&VOTE_LINES[..], options)
            } else if !villagers.is_empty() {
                (&WHISPER_LINES[..], villagers)
            } else {
                let others = prompt_parsing::listed_names(conversation, "Alive players")
                    .into_iter()
                    .filter(|name| Some(name) != speaker.as_ref())
                    .collect();
                (&DAY_LINES[..], others)
            }
        };

        let line = lines
            .choose(&mut self.rng)
            .expect("Canned line tables are never empty");
        let reply = match names.choose(&mut self.rng) {
            Some(name) => line.replace("{name}", name),
            None => "I have nothing to add.".to_string(),
        };
        log::debug!("{} says: {reply}", speaker.as_deref().unwrap_or("someone"));
        Ok(reply)
    }
}

type Responder = Box<dyn FnMut(&[Turn]) -> Result<String, GenerationError> + Send>;

/// Replies from a fixed queue or a closure, and remembers every conversation it saw.
pub struct ScriptedGenerator {
    replies: VecDeque<String>,
    responder: Option<Responder>,
    pub calls: Vec<Vec<Turn>>,
}

impl Debug for ScriptedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedGenerator")
            .field("replies", &self.replies)
            .field("responder", &self.responder.is_some())
            .field("calls", &self.calls.len())
            .finish()
    }
}

impl ScriptedGenerator {
    pub fn from_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            responder: None,
            calls: Vec::new(),
        }
    }

    pub fn from_fn<F>(responder: F) -> Self
    where
        F: FnMut(&[Turn]) -> Result<String, GenerationError> + Send + 'static,
    {
        Self {
            replies: VecDeque::new(),
            responder: Some(Box::new(responder)),
            calls: Vec::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&mut self, conversation: &[Turn]) -> Result<String, GenerationError> {
        self.calls.push(conversation.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            return Ok(reply);
        }
        match self.responder.as_mut() {
            Some(responder) => responder(conversation),
            None => Err(GenerationError::Exhausted),
        }
    }
}
