//! Run report: everything that happened during one collection run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::action::{ActionOutcome, ActionResult, ArtifactState};
use crate::domain::battery::CommandOutcome;
use crate::domain::topology::UnitName;

/// A unit whose action could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub unit: UnitName,
    pub error: String,
}

/// Written to `summary.json` before archiving.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub model: String,
    pub started_at: Option<DateTime<Utc>>,
    pub dispatch_failures: Vec<DispatchFailure>,
    pub actions: Vec<ActionResult>,
    pub commands: Vec<CommandOutcome>,
    pub deadline_expired: bool,
}

/// Per-outcome counts for the final summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionTally {
    pub completed: usize,
    pub retrieved: usize,
    pub failed: usize,
    pub abandoned: usize,
    pub timed_out: usize,
}

impl RunReport {
    #[must_use]
    pub fn tally(&self) -> ActionTally {
        let mut t = ActionTally::default();
        for result in &self.actions {
            match &result.outcome {
                ActionOutcome::Completed { artifact } => {
                    t.completed += 1;
                    if matches!(artifact, ArtifactState::Retrieved { .. }) {
                        t.retrieved += 1;
                    }
                }
                ActionOutcome::Failed { .. } => t.failed += 1,
                ActionOutcome::Abandoned { .. } => t.abandoned += 1,
                ActionOutcome::TimedOut => t.timed_out += 1,
            }
        }
        t
    }

    /// Battery commands that did not exit cleanly (including skipped ones).
    #[must_use]
    pub fn failed_commands(&self) -> usize {
        self.commands.iter().filter(|c| !c.succeeded()).count()
    }
}
