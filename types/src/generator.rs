use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ChatMessage;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    Assistant,
    User,
}

/// One entry of the conversation handed to a [`TextGenerator`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// Prior chat is replayed into the model's context as assistant turns.
    pub fn replay(message: &ChatMessage) -> Self {
        Self::assistant(format!("{}: {}", message.name, message.text))
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Generation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unrecognized response shape: {0}")]
    UnrecognizedResponse(String),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Input error: {0}")]
    Input(String),

    #[error("No scripted replies left")]
    Exhausted,
}

/// The boundary to whatever produces a character's words.
///
/// Calls are issued strictly one at a time; implementations may keep state between them.
#[async_trait]
pub trait TextGenerator: Debug + Send {
    async fn generate(&mut self, conversation: &[Turn]) -> Result<String, GenerationError>;
}
