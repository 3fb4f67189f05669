// pagekeep/src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Failed to serialize catalog: {0}")]
    SerializationError(String),

    #[error("Failed to deserialize catalog: {0}")]
    DeserializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Other error: {0}")]
    Other(String),
}

impl DomainError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context.into(), msg)),
            err => DomainError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::DeserializationError(e.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure reported by one of the host ports (tabs, downloads, storage, fetch).
///
/// The message is surfaced to the user verbatim, so every variant displays
/// only the text the host produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("{0}")]
    Tab(String),

    #[error("{0}")]
    Injection(String),

    #[error("{0}")]
    Download(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Fetch(String),
}

pub type HostResult<T> = Result<T, HostError>;
