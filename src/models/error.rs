use thiserror::Error;

#[derive(Error, Debug)]
pub enum TierBoardError {
    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown tier code: {0}")]
    UnknownTierCode(String),

    #[error("Unknown game mode: {0}")]
    UnknownGameMode(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, TierBoardError>;
