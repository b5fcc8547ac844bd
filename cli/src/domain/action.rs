//! Remote action types: handles, statuses, and terminal results.
//!
//! Pure functions only; no I/O.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::ControlPlaneError;
use crate::domain::topology::UnitName;

/// Key under which `juju run-action --format json` reports the queued id.
const QUEUED_ID_KEY: &str = "Action queued with id";

/// Identifier assigned by the control plane to a started action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A started action awaiting a terminal status. Consumed once by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionHandle {
    pub unit: UnitName,
    pub action_id: ActionId,
    pub dispatched_at: DateTime<Utc>,
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Status reported for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Queued,
    Pending,
    Running,
    Aborting,
    Completed,
    Failed,
    Cancelled,
    Aborted,
    Error,
    Other(String),
}

impl ActionStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => Self::Queued,
            "pending" => Self::Pending,
            "running" => Self::Running,
            "aborting" => Self::Aborting,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "aborted" => Self::Aborted,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether polling must continue.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::Pending | Self::Running | Self::Aborting
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Aborting => "aborting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `juju show-action-output --format json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub status: ActionStatus,
    /// Remote path of the produced artifact (`results.path`).
    pub artifact_path: Option<String>,
}

#[derive(Deserialize)]
struct RawActionOutput {
    status: String,
    #[serde(default)]
    results: Option<RawResults>,
}

#[derive(Deserialize)]
struct RawResults {
    #[serde(default)]
    path: Option<String>,
}

impl ActionReport {
    /// # Errors
    ///
    /// Returns `ControlPlaneError::MalformedResponse` if `status` is missing.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ControlPlaneError> {
        let raw: RawActionOutput =
            serde_json::from_slice(bytes).map_err(|e| ControlPlaneError::MalformedResponse {
                command: "show-action-output".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            status: ActionStatus::parse(&raw.status),
            artifact_path: raw.results.and_then(|r| r.path).filter(|p| !p.is_empty()),
        })
    }
}

/// Extract the action id from `juju run-action --format json` output.
///
/// Accepts the flat `{"Action queued with id": "<id>"}` form and the
/// per-unit `{"<unit>": {"id": "<id>"}}` form.
///
/// # Errors
///
/// Returns `ControlPlaneError::MalformedResponse` when no id can be found.
pub fn parse_action_id(bytes: &[u8]) -> Result<ActionId, ControlPlaneError> {
    let malformed = |reason: String| ControlPlaneError::MalformedResponse {
        command: "run-action".to_string(),
        reason,
    };
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;

    let id = value
        .get(QUEUED_ID_KEY)
        .and_then(serde_json::Value::as_str)
        .or_else(|| {
            value
                .as_object()?
                .values()
                .find_map(|v| v.get("id")?.as_str())
        })
        .filter(|id| !id.is_empty())
        .ok_or_else(|| malformed("no action id in response".to_string()))?;
    Ok(ActionId::new(id))
}

// ── Results ───────────────────────────────────────────────────────────────────

/// What happened to the artifact of a completed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ArtifactState {
    Retrieved { local_dir: PathBuf },
    /// The action completed without reporting a path.
    Missing,
    CopyFailed { error: String },
}

/// Terminal outcome of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ActionOutcome {
    Completed { artifact: ArtifactState },
    /// Any terminal status other than `completed`.
    Failed { status: String },
    /// Too many consecutive status query errors.
    Abandoned {
        consecutive_errors: u32,
        last_error: String,
    },
    /// The run deadline expired before a terminal status was seen.
    TimedOut,
}

impl ActionOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Abandoned { .. } => "abandoned",
            Self::TimedOut => "timed-out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub unit: UnitName,
    pub action_id: ActionId,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
    /// Status queries issued for this action.
    pub queries: u32,
}
