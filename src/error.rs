use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageinatorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("HTTP status error: {status}")]
    HttpStatusError { status: u16 },
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<serde_json::Error> for ImageinatorError {
    fn from(e: serde_json::Error) -> Self {
        ImageinatorError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for ImageinatorError {
    fn from(e: std::io::Error) -> Self {
        ImageinatorError::StorageError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImageinatorError>;
