//! The auxiliary command battery: read-only status, config, and log queries.
//!
//! Pure functions only; no I/O.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::target::Scope;
use crate::domain::topology::ClusterStatus;

/// Number of status-log entries requested per unit.
pub const STATUS_LOG_ENTRIES: &str = "10000";

/// One read-only control plane command whose output is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxCommand {
    /// Output key: results land in `<slug>.out` and `<slug>.err`.
    pub slug: String,
    pub scope: Scope,
    /// Subcommand followed by its arguments, e.g. `["status", "--format", "yaml"]`.
    pub args: Vec<String>,
}

impl AuxCommand {
    fn new(slug: impl Into<String>, scope: Scope, args: &[&str]) -> Self {
        Self {
            slug: slug.into(),
            scope,
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Human-readable form for progress messages.
    #[must_use]
    pub fn display(&self) -> String {
        format!("juju {}", self.args.join(" "))
    }
}

/// How one battery command ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub slug: String,
    /// Exit code when the command ran to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Spawn or timeout error when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Not started because the run deadline had already expired.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl CommandOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Build the battery for a snapshot.
///
/// `config_applications` lists the applications whose charm config is
/// captured. A `show-status-log` command is added for every unit in the
/// snapshot. Slugs are unique; the first command for a slug wins.
#[must_use]
pub fn standard_battery<S: AsRef<str>>(
    status: &ClusterStatus,
    config_applications: &[S],
) -> Vec<AuxCommand> {
    let mut commands = vec![
        AuxCommand::new("status", Scope::Model, &["status", "--format", "yaml"]),
        AuxCommand::new(
            "debug-log",
            Scope::Model,
            &["debug-log", "--replay", "--no-tail"],
        ),
        AuxCommand::new("model-config", Scope::Model, &["model-config"]),
        AuxCommand::new(
            "controller-debug-log",
            Scope::Controller,
            &["debug-log", "--replay", "--no-tail"],
        ),
        AuxCommand::new("storage", Scope::Model, &["storage", "--format", "yaml"]),
        AuxCommand::new(
            "storage-pools",
            Scope::Model,
            &["storage-pools", "--format", "yaml"],
        ),
    ];

    for app in config_applications {
        let app = app.as_ref();
        commands.push(AuxCommand::new(
            format!("{app}-config"),
            Scope::Model,
            &["config", app, "--format", "yaml"],
        ));
    }

    for unit in status.all_units() {
        commands.push(AuxCommand::new(
            format!("status-log-{}", unit.name.slug()),
            Scope::Model,
            &["show-status-log", "-n", STATUS_LOG_ENTRIES, unit.name.as_str()],
        ));
    }

    let mut seen = HashSet::new();
    commands.retain(|c| seen.insert(c.slug.clone()));
    commands
}
