//! Dispatch configuration loaded from TOML.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Dispatch-time policy knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Per-executor budget in milliseconds. Unset means no limit.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// What to do when the model calls the same tool more than once in a
    /// single turn.
    #[serde(default)]
    pub duplicate_calls: DuplicateCalls,
}

/// Handling of repeated calls to one tool within a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCalls {
    /// Dispatch each call independently.
    #[default]
    Allow,
    /// Reject the whole batch as a policy violation before dispatch.
    Reject,
}

impl DispatchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("failed to read config: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
