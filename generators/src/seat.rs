use async_trait::async_trait;
use types::{GenerationError, TextGenerator, Turn};

use crate::{prompt_parsing, InputGenerator};

/// Hands one character to a person at the terminal and everyone else to another generator.
#[derive(Debug)]
pub struct HumanSeatGenerator {
    seat: String,
    human: InputGenerator,
    others: Box<dyn TextGenerator>,
}

impl HumanSeatGenerator {
    pub fn new(seat: &str, human: InputGenerator, others: Box<dyn TextGenerator>) -> Self {
        Self {
            seat: seat.to_string(),
            human,
            others,
        }
    }

    pub fn seat(&self) -> &str {
        &self.seat
    }

    fn is_seat(&self, conversation: &[Turn]) -> bool {
        prompt_parsing::speaker(conversation)
            .is_some_and(|speaker| speaker.eq_ignore_ascii_case(&self.seat))
    }
}

#[async_trait]
impl TextGenerator for HumanSeatGenerator {
    async fn generate(&mut self, conversation: &[Turn]) -> Result<String, GenerationError> {
        if self.is_seat(conversation) {
            self.human.generate(conversation).await
        } else {
            self.others.generate(conversation).await
        }
    }
}
