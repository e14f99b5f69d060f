//! Configuration types

use crate::{ConfigError, RelistResult};
use serde::{Deserialize, Serialize};

/// Default namespace count above which the memo size is reported.
pub const DEFAULT_MEMO_WARN_THRESHOLD: usize = 1024;

/// Configuration for the refreshing lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Whether stale-status detection runs at all. When disabled every
    /// call is a plain list.
    pub enabled: bool,

    /// Log detection and refresh events at info level (debug otherwise).
    pub log_refreshes: bool,

    /// Number of checked namespaces after which a warning is logged once.
    pub memo_warn_threshold: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_refreshes: true,
            memo_warn_threshold: DEFAULT_MEMO_WARN_THRESHOLD,
        }
    }
}

impl RefreshConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create RefreshConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `RELIST_REFRESH_ENABLED`: Run stale-status detection (default: true)
    /// - `RELIST_LOG_REFRESHES`: Log refreshes at info level (default: true)
    /// - `RELIST_MEMO_WARN_THRESHOLD`: Memo size warning threshold (default: 1024)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Absent or unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let enabled = lookup("RELIST_REFRESH_ENABLED")
            .map(|s| parse_flag(&s, defaults.enabled))
            .unwrap_or(defaults.enabled);

        let log_refreshes = lookup("RELIST_LOG_REFRESHES")
            .map(|s| parse_flag(&s, defaults.log_refreshes))
            .unwrap_or(defaults.log_refreshes);

        let memo_warn_threshold = lookup("RELIST_MEMO_WARN_THRESHOLD")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.memo_warn_threshold);

        Self {
            enabled,
            log_refreshes,
            memo_warn_threshold,
        }
    }

    /// Enable or disable detection.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Choose whether refresh events are logged at info level.
    pub fn with_log_refreshes(mut self, log_refreshes: bool) -> Self {
        self.log_refreshes = log_refreshes;
        self
    }

    /// Set the memo size warning threshold.
    pub fn with_memo_warn_threshold(mut self, threshold: usize) -> Self {
        self.memo_warn_threshold = threshold;
        self
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - memo_warn_threshold > 0
    pub fn validate(&self) -> RelistResult<()> {
        if self.memo_warn_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "memo_warn_threshold".to_string(),
                value: self.memo_warn_threshold.to_string(),
                reason: "memo_warn_threshold must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
