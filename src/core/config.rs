//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment overrides.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DteError, Result};

/// Environment variable overriding `service.base_url`.
pub const ENV_API_URL: &str = "DTE_API_URL";
/// Environment variable overriding `logging.jsonl_path`.
pub const ENV_LOG_PATH: &str = "DTE_LOG_PATH";

/// Number of timed stages in the progress animation.
pub const TIMED_STAGE_COUNT: usize = 4;

/// Full client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub animation: AnimationConfig,
    pub logging: LoggingConfig,
}

/// Where and how to reach the verdict-computation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub endpoint: String,
    /// Whole-request bound. A stalled call surfaces as a transport failure
    /// once this elapses instead of leaving the session pending forever.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            endpoint: "/api/check-claim".to_string(),
            request_timeout_secs: 45,
            connect_timeout_secs: 10,
        }
    }
}

impl ServiceConfig {
    /// Fully-qualified URL of the claim-check endpoint.
    #[must_use]
    pub fn check_claim_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = self.endpoint.trim_start_matches('/');
        format!("{base}/{endpoint}")
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Timing of the investigation narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Per-stage durations, in stage order.
    pub stage_durations_ms: Vec<u64>,
    /// Pause after the last stage before the animation reports completion.
    pub grace_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            stage_durations_ms: vec![700, 1200, 500, 1800],
            grace_ms: 1200,
        }
    }
}

impl AnimationConfig {
    #[must_use]
    pub fn stage_durations(&self) -> Vec<Duration> {
        self.stage_durations_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Wall-clock time from start until the completion signal.
    #[must_use]
    pub fn total(&self) -> Duration {
        Duration::from_millis(self.stage_durations_ms.iter().sum::<u64>() + self.grace_ms)
    }
}

/// Activity log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// JSONL destination. `None` means stderr.
    pub jsonl_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_path: None,
        }
    }
}

impl Config {
    /// Default config file location (`$XDG_CONFIG_HOME/dte/config.toml`,
    /// falling back to `$HOME/.config/dte/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("dte").join("config.toml"));
        }
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("dte")
                .join("config.toml")
        })
    }

    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. Environment overrides are applied last.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(DteError::MissingConfig {
                        path: explicit.to_path_buf(),
                    });
                }
                Self::from_file(explicit)?
            }
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| DteError::io(path, source))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.service.base_url = url.trim().to_string();
        }
        if let Some(path) = lookup(ENV_LOG_PATH).filter(|v| !v.trim().is_empty()) {
            self.logging.jsonl_path = Some(PathBuf::from(path.trim()));
        }
    }

    /// Reject settings the runtime cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(DteError::InvalidConfig {
                details: "service.base_url must not be empty".to_string(),
            });
        }
        if self.service.request_timeout_secs == 0 || self.service.connect_timeout_secs == 0 {
            return Err(DteError::InvalidConfig {
                details: "service timeouts must be at least one second".to_string(),
            });
        }
        if self.animation.stage_durations_ms.len() != TIMED_STAGE_COUNT {
            return Err(DteError::InvalidConfig {
                details: format!(
                    "animation.stage_durations_ms needs {TIMED_STAGE_COUNT} entries, got {}",
                    self.animation.stage_durations_ms.len()
                ),
            });
        }
        Ok(())
    }

    /// Render as pretty TOML (used by `dte config`).
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DteError::Serialization {
            context: "toml",
            details: e.to_string(),
        })
    }
}
