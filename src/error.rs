use std::error::Error as StdError;

use thiserror::Error;

/// Voiceline's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Voiceline's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream tools aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The script source could not be turned into utterances.
    #[error("script parse error: {0}")]
    Script(String),

    /// A caller-supplied value is out of range (sample rates, frame rates, thresholds).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn script(message: impl Into<String>) -> Self {
        Self::Script(message.into())
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Other(Box::new(err.error))
    }
}
