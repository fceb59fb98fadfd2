use std::path::PathBuf;

use crate::host::HostError;

/// Errors returned while turning raw options into container configuration.
///
/// Every variant names the option it was raised for, so the message shown to
/// the user points at the flag that has to be fixed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The text did not match any accepted shape of its mini-grammar.
    #[error("bad format for --{option}: {value}")]
    Malformed { option: &'static str, value: String },
    /// The text had the right shape but failed a domain check.
    #[error("invalid value for --{option}: {value}: {reason}")]
    InvalidValue {
        option: &'static str,
        value: String,
        reason: String,
    },
    /// Two option groups were given that cannot be combined.
    #[error("--{option}: {reason}")]
    Conflict { option: &'static str, reason: String },
    /// A referenced file could not be read.
    #[error("failed to read {path:?} for --{option}")]
    ExternalResource {
        option: &'static str,
        path: PathBuf,
        #[source]
        source: HostError,
    },
    /// A referenced file was read but its content is unusable.
    #[error("invalid content in {path:?} for --{option}: {reason}")]
    MalformedFile {
        option: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn malformed(option: &'static str, value: impl Into<String>) -> Self {
        ConfigError::Malformed {
            option,
            value: value.into(),
        }
    }

    pub(crate) fn invalid(
        option: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        ConfigError::InvalidValue {
            option,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn conflict(option: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Conflict {
            option,
            reason: reason.into(),
        }
    }

    /// Name of the option the error was raised for.
    pub fn option(&self) -> &'static str {
        match self {
            ConfigError::Malformed { option, .. }
            | ConfigError::InvalidValue { option, .. }
            | ConfigError::Conflict { option, .. }
            | ConfigError::ExternalResource { option, .. }
            | ConfigError::MalformedFile { option, .. } => option,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
