#![forbid(unsafe_code)]

//! Error types for the overlay runtime.
//!
//! Nothing here reaches the host as a failure: the overlay reports every
//! error through the status sink and carries on.

use std::path::PathBuf;

use rbar_layout::GridError;

/// A subcommand that could not be parsed or applied.
///
/// Parsing never mutates settings, so any `UsageError` leaves state as it
/// was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// Not a known subcommand; the whole usage block applies.
    #[error("unknown subcommand: {0:?}")]
    Unknown(String),
    /// A known subcommand with bad arguments.
    #[error("{reason}")]
    Invalid {
        reason: String,
        usage: &'static str,
    },
    /// A grid request the screen cannot honor.
    #[error("{0}")]
    Grid(#[from] GridError),
}

impl UsageError {
    pub(crate) fn invalid(reason: impl Into<String>, usage: &'static str) -> Self {
        Self::Invalid {
            reason: reason.into(),
            usage,
        }
    }

    /// The usage line for the offending subcommand, if there is one.
    #[must_use]
    pub fn usage(&self) -> Option<&'static str> {
        match self {
            Self::Invalid { usage, .. } => Some(usage),
            Self::Grid(_) => Some(crate::command::usage::GRID),
            Self::Unknown(_) => None,
        }
    }
}

/// Failure loading an [`OverlayConfig`](crate::settings::OverlayConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}
