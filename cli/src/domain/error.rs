//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to run configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid model '{0}': expected [<controller>:]<model>")]
    InvalidModel(String),

    #[error("No applications configured for the debug action.")]
    NoApplications,

    #[error("Invalid application name '{0}'")]
    InvalidApplication(String),

    #[error("Timeout must be at least one second.")]
    ZeroTimeout,

    #[error("Action name must not be empty.")]
    EmptyAction,
}

// ── Topology errors ───────────────────────────────────────────────────────────

/// Errors raised while reading the cluster status snapshot.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("cannot parse cluster status: {0}")]
    Parse(#[from] serde_json::Error),
}

// ── Control plane errors ──────────────────────────────────────────────────────

/// Errors raised while interpreting control plane responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlPlaneError {
    #[error("{command} exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("{command} was terminated by a signal")]
    Terminated { command: String },

    #[error("malformed response from {command}: {reason}")]
    MalformedResponse { command: String, reason: String },
}
