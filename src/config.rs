//! Round configuration with layered loading.
//!
//! Values come from three layers, later ones winning: built-in
//! defaults, an optional `key=value` config file (`N=` and `SEED=`),
//! and explicit CLI overrides. File parsing is intentionally minimal
//! and deterministic: `#` comments and blank lines are skipped, unknown
//! keys are warned about and ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Smallest allowed submitter count.
pub const MIN_PARTICIPANTS: usize = 1;
/// Largest allowed submitter count.
pub const MAX_PARTICIPANTS: usize = 1000;

/// Configuration for one rendezvous round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConfig {
    /// Number of submitters, in `[MIN_PARTICIPANTS, MAX_PARTICIPANTS]`.
    pub participants: usize,
    /// Base seed for think-time and score generation. Affects the data,
    /// never protocol correctness.
    pub seed: u32,
    /// Optional file the narration is duplicated into.
    pub log_file: Option<PathBuf>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            participants: 5,
            seed: 1,
            log_file: None,
        }
    }
}

impl RoundConfig {
    /// Validates the guardrail invariants.
    ///
    /// # Errors
    /// Returns [`ConfigError::ParticipantsOutOfRange`] when the
    /// submitter count falls outside the allowed window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&self.participants) {
            return Err(ConfigError::ParticipantsOutOfRange {
                got: self.participants,
            });
        }
        Ok(())
    }

    /// Overlays `N=` and `SEED=` values from a config file.
    ///
    /// The file must define `N`; `SEED` is optional.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for I/O failures, malformed lines,
    /// non-numeric values, or a missing `N` key.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let mut saw_participants = false;
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Malformed { line_no });
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "N" => {
                    self.participants = parse_number(key, value, line_no)?;
                    saw_participants = true;
                }
                "SEED" => {
                    self.seed = parse_number(key, value, line_no)?;
                }
                _ => {
                    tracing::warn!(key, line_no, "ignoring unknown config key");
                }
            }
        }
        if !saw_participants {
            return Err(ConfigError::MissingParticipants);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    value: &str,
    line_no: usize,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_owned(),
        line_no,
    })
}

/// Error produced while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(io::Error),
    /// A non-comment line is not of the form `key=value`.
    Malformed {
        /// 1-based line number.
        line_no: usize,
    },
    /// A known key carries a non-numeric or out-of-type value.
    InvalidNumber {
        /// The offending key.
        key: String,
        /// 1-based line number.
        line_no: usize,
    },
    /// The config file never defined `N`.
    MissingParticipants,
    /// The submitter count is outside the allowed window.
    ParticipantsOutOfRange {
        /// The rejected value.
        got: usize,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read config file: {e}"),
            Self::Malformed { line_no } => {
                write!(f, "config line {line_no}: expected key=value")
            }
            Self::InvalidNumber { key, line_no } => {
                write!(f, "config line {line_no}: invalid number for {key}")
            }
            Self::MissingParticipants => write!(f, "config file does not define N"),
            Self::ParticipantsOutOfRange { got } => write!(
                f,
                "participant count {got} outside [{MIN_PARTICIPANTS}, {MAX_PARTICIPANTS}]"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
