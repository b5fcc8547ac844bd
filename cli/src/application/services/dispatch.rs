//! Application service: fan out one remote action per unit.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use chrono::Utc;
use futures_util::future::join_all;
use tokio::time::Instant;

use crate::application::ports::{ActionRunner, ProgressReporter};
use crate::domain::{ActionHandle, DispatchFailure, TargetUnit};

/// Handles for started actions plus the units that could not be started.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub handles: Vec<ActionHandle>,
    pub failures: Vec<DispatchFailure>,
}

/// Start `action` on every unit concurrently.
///
/// Handles keep the order of `units`. A failed start is reported and
/// recorded but never stops the remaining starts; nothing is retried.
/// Starts still pending at `deadline` are abandoned and recorded as
/// failures, while the handles already returned are kept.
pub async fn dispatch_actions(
    client: &impl ActionRunner,
    reporter: &impl ProgressReporter,
    units: &[TargetUnit],
    action: &str,
    deadline: Instant,
) -> Dispatch {
    let starts = units.iter().map(|unit| async move {
        reporter.step(&format!("Executing {action} action on {}...", unit.name));
        let started =
            tokio::time::timeout_at(deadline, client.start_action(&unit.name, action)).await;
        (unit, started, Utc::now())
    });

    let mut dispatch = Dispatch::default();
    for (unit, started, dispatched_at) in join_all(starts).await {
        match started {
            Err(_) => {
                reporter.warn(&format!(
                    "Timed out starting the {action} action on {}. Skipping.",
                    unit.name
                ));
                dispatch.failures.push(DispatchFailure {
                    unit: unit.name.clone(),
                    error: "deadline expired".to_string(),
                });
            }
            Ok(Ok(action_id)) => {
                tracing::debug!(unit = %unit.name, %action_id, "action queued");
                dispatch.handles.push(ActionHandle {
                    unit: unit.name.clone(),
                    action_id,
                    dispatched_at,
                });
            }
            Ok(Err(e)) => {
                reporter.warn(&format!(
                    "Error running the {action} action on {}: {e:#}. Skipping.",
                    unit.name
                ));
                dispatch.failures.push(DispatchFailure {
                    unit: unit.name.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }
    dispatch
}
