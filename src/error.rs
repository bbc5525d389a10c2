//! Crate-level error type.
//!
//! Precondition violations inside the protocol (duplicate registration,
//! double publish) are programming errors and panic; everything a
//! correctly written caller can actually encounter is typed here and
//! surfaced synchronously, before any worker thread starts.

use std::io;

use crate::config::{ConfigError, MAX_PARTICIPANTS, MIN_PARTICIPANTS};

/// Error returned by the round entry points and the CLI layer.
#[derive(Debug)]
pub enum Error {
    /// The requested submitter count is outside the allowed window.
    InvalidParticipants {
        /// The rejected value.
        got: usize,
    },
    /// Configuration loading or validation failed.
    Config(ConfigError),
    /// The narration log file could not be opened.
    LogFile(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParticipants { got } => write!(
                f,
                "participant count {got} outside [{MIN_PARTICIPANTS}, {MAX_PARTICIPANTS}]"
            ),
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::LogFile(e) => write!(f, "cannot open log file: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::LogFile(e) => Some(e),
            Self::InvalidParticipants { .. } => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = Error::InvalidParticipants { got: 1001 };
        assert!(e.to_string().contains("1001"));
    }

    #[test]
    fn config_errors_are_chained() {
        use std::error::Error as _;
        let e = Error::from(ConfigError::MissingParticipants);
        assert!(e.source().is_some());
    }
}
