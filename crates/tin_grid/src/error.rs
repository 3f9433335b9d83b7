//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, unknown field selectors, shard data that cannot be read,
//! IO, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown field '{id}'")]
    UnknownField { id: String },

    #[error("shard data unavailable for {key}: {reason}")]
    DataUnavailable { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn data_unavailable(key: impl ToString, reason: impl Into<String>) -> Self {
        Error::DataUnavailable {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors caused by invalid construction parameters.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::InvalidConfig(_) | Error::UnknownField { .. })
    }

    /// Returns `true` when a shard or time step could not be located or parsed.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable { .. })
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
