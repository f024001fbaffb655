use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Transcript IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Observer rejected message: {0}")]
    Rejected(String),
}
