//! DTE-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DteError>;

/// Top-level error type for the Dinner Table Economist client.
#[derive(Debug, Error)]
pub enum DteError {
    #[error("[DTE-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DTE-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[DTE-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DTE-1101] claim text is empty")]
    EmptyClaim,

    #[error("[DTE-2001] transport failure talking to the verdict service: {details}")]
    Transport { details: String },

    #[error("[DTE-2002] verdict service returned status {status}: {details}")]
    Service { status: u16, details: String },

    #[error("[DTE-2003] malformed verdict payload: {details}")]
    MalformedPayload { details: String },

    #[error("[DTE-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[DTE-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DTE-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[DTE-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl DteError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DTE-1001",
            Self::MissingConfig { .. } => "DTE-1002",
            Self::ConfigParse { .. } => "DTE-1003",
            Self::EmptyClaim => "DTE-1101",
            Self::Transport { .. } => "DTE-2001",
            Self::Service { .. } => "DTE-2002",
            Self::MalformedPayload { .. } => "DTE-2003",
            Self::Serialization { .. } => "DTE-2101",
            Self::Io { .. } => "DTE-3002",
            Self::ChannelClosed { .. } => "DTE-3003",
            Self::Runtime { .. } => "DTE-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Service { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Error-screen cause, for failures that end an investigation.
    ///
    /// Returns `None` for errors that never come out of a request attempt.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Transport { .. } => Some(FailureKind::TransportFailure),
            Self::Service { .. } => Some(FailureKind::ServiceError),
            Self::MalformedPayload { .. } | Self::Serialization { .. } => {
                Some(FailureKind::MalformedPayload)
            }
            _ => None,
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for normalization failures.
    #[must_use]
    pub fn malformed(details: impl Into<String>) -> Self {
        Self::MalformedPayload {
            details: details.into(),
        }
    }
}

/// Why an investigation landed on the error screen.
///
/// All three kinds render identically; the distinction is kept for the
/// activity log and the `--json` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TransportFailure,
    ServiceError,
    MalformedPayload,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransportFailure => "transport_failure",
            Self::ServiceError => "service_error",
            Self::MalformedPayload => "malformed_payload",
        }
    }
}

impl From<serde_json::Error> for DteError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for DteError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for DteError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            details: value.to_string(),
        }
    }
}
