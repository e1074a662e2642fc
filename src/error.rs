use thiserror::Error;

#[derive(Debug, Error)]
pub enum MintError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Operation already in progress: {0}")]
    Busy(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for MintError {
    fn from(err: std::io::Error) -> Self {
        MintError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MintError {
    fn from(err: serde_json::Error) -> Self {
        MintError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MintError>;
