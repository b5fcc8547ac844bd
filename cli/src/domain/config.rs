//! Domain types and validators for collector configuration.
//!
//! Pure functions only; no I/O.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_ACTION: &str = "debug";
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_QUERY_ERRORS: u32 = 30;
pub const DEFAULT_APPLICATIONS: &[&str] = &["kubernetes-master", "kubernetes-worker", "etcd"];
pub const DEFAULT_CONFIG_APPLICATIONS: &[&str] = &[
    "kubernetes-master",
    "kubernetes-worker",
    "kubeapi-load-balancer",
    "etcd",
    "easyrsa",
    "flannel",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Collector configuration, read from `config.yaml` and overridden by flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CollectConfig {
    /// Applications whose units run the debug action.
    pub applications: Vec<String>,
    /// Applications whose charm config is captured.
    pub config_applications: Vec<String>,
    /// Action name started on each unit.
    pub action: String,
    /// Global run deadline in seconds.
    pub timeout_secs: u64,
    /// Delay between status queries for one action.
    pub poll_interval_ms: u64,
    /// Consecutive query errors before an action is abandoned; 0 disables.
    pub max_query_errors: u32,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            applications: to_owned(DEFAULT_APPLICATIONS),
            config_applications: to_owned(DEFAULT_CONFIG_APPLICATIONS),
            action: DEFAULT_ACTION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_query_errors: DEFAULT_MAX_QUERY_ERRORS,
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

impl CollectConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Soft cap on consecutive query errors, `None` when disabled.
    #[must_use]
    pub fn query_error_cap(&self) -> Option<u32> {
        (self.max_query_errors > 0).then_some(self.max_query_errors)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.applications.is_empty() {
            return Err(ConfigError::NoApplications);
        }
        for app in self.applications.iter().chain(&self.config_applications) {
            validate_application_name(app)?;
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.action.trim().is_empty() {
            return Err(ConfigError::EmptyAction);
        }
        Ok(())
    }
}

/// Application names are lowercase alphanumerics and hyphens.
///
/// # Errors
///
/// Returns `ConfigError::InvalidApplication` otherwise.
pub fn validate_application_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidApplication(name.to_string()))
    }
}
