// pagekeep/src/application/error.rs
use crate::domain::error::{DomainError, HostError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Host failures keep the host's own wording
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("No results from script execution")]
    NoExtractionResult,

    #[error("No active tab found")]
    NoActiveTab,

    #[error("No tab ID provided")]
    MissingTabId,

    #[error("Catalog entry not found: {0}")]
    EntryNotFound(usize),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl ApplicationError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            ApplicationError::Other(msg) => {
                ApplicationError::Other(format!("{}: {}", context.into(), msg))
            }
            ApplicationError::Validation(msg) => {
                ApplicationError::Validation(format!("{}: {}", context.into(), msg))
            }
            err => ApplicationError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        ApplicationError::Domain(DomainError::Io(err))
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
