use std::error::Error as StdError;

use thiserror::Error;

/// Captacity's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Captacity's crate-wide error type.
///
/// Only hard failures live here. Advisory layout conditions (a word wider than the frame)
/// are reported through [`crate::wrapper::LayoutEvent`] and never abort a run.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced font asset does not exist at the given path or in the search directory.
    #[error("font '{0}' not found")]
    FontNotFound(String),

    #[error("failed to parse font '{path}': {reason}")]
    FontParse { path: String, reason: String },

    #[error("invalid caption options: {0}")]
    InvalidOpts(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
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
