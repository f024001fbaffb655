use recorder::RecorderError;
use thiserror::Error;
use types::{GenerationError, RosterError};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Generation failed for {speaker}: {source}")]
    Generation {
        speaker: String,
        #[source]
        source: GenerationError,
    },

    #[error("Observer error: {0}")]
    Recorder(#[from] RecorderError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Configuration error: {0}")]
    Config(String),
}
