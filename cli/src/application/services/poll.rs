//! Application service: drive started actions to a terminal state.
//!
//! Every handle gets its own poll loop. The loops are multiplexed on the
//! calling task and their results come back through one collection point,
//! so no shared result list is needed.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::StreamExt as _;
use futures_util::stream::FuturesUnordered;
use tokio::time::Instant;

use crate::application::ports::{ActionRunner, ArtifactTransfer, ProgressReporter};
use crate::application::services::retrieve::retrieve_artifact;
use crate::domain::{ActionHandle, ActionOutcome, ActionResult, ActionStatus, OutputLayout};

/// Poll loop tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two status queries of the same action.
    pub interval: Duration,
    /// Consecutive query errors before giving up on an action; `None` = never.
    pub max_query_errors: Option<u32>,
}

/// Resolves action handles concurrently, retrieving artifacts of completed actions.
pub struct ActionPoller<'a, C, P> {
    client: &'a C,
    reporter: &'a P,
    layout: &'a OutputLayout,
    action: &'a str,
    settings: PollSettings,
}

impl<'a, C, P> ActionPoller<'a, C, P>
where
    C: ActionRunner + ArtifactTransfer,
    P: ProgressReporter,
{
    pub fn new(
        client: &'a C,
        reporter: &'a P,
        layout: &'a OutputLayout,
        action: &'a str,
        settings: PollSettings,
    ) -> Self {
        Self {
            client,
            reporter,
            layout,
            action,
            settings,
        }
    }

    /// Poll every handle until it is terminal or `deadline` passes.
    ///
    /// Returns one result per handle, in completion order. Handles still in
    /// flight at the deadline are reported as timed out; their actions are
    /// left running remotely.
    pub async fn collect(&self, handles: Vec<ActionHandle>, deadline: Instant) -> Vec<ActionResult> {
        let counters: Vec<AtomicU32> = handles.iter().map(|_| AtomicU32::new(0)).collect();
        let mut polls: FuturesUnordered<_> = handles
            .iter()
            .cloned()
            .zip(&counters)
            .enumerate()
            .map(|(slot, (handle, queries))| async move {
                (slot, self.poll_until_terminal(handle, queries).await)
            })
            .collect();
        let mut in_flight: Vec<Option<ActionHandle>> = handles.into_iter().map(Some).collect();
        let mut results = Vec::with_capacity(in_flight.len());

        let expiry = tokio::time::sleep_until(deadline);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                next = polls.next() => match next {
                    Some((slot, result)) => {
                        in_flight[slot] = None;
                        results.push(result);
                    }
                    None => break,
                },
                () = &mut expiry => {
                    for (slot, handle) in in_flight.iter_mut().enumerate() {
                        if let Some(handle) = handle.take() {
                            self.reporter.warn(&format!(
                                "Timed out waiting for {} action on {}.",
                                self.action, handle.unit
                            ));
                            results.push(ActionResult {
                                unit: handle.unit,
                                action_id: handle.action_id,
                                outcome: ActionOutcome::TimedOut,
                                queries: counters[slot].load(Ordering::Relaxed),
                            });
                        }
                    }
                    break;
                }
            }
        }
        results
    }

    async fn poll_until_terminal(&self, handle: ActionHandle, queries: &AtomicU32) -> ActionResult {
        let mut consecutive_errors = 0u32;
        loop {
            queries.fetch_add(1, Ordering::Relaxed);
            match self.client.action_status(&handle.action_id).await {
                Ok(report) if report.status.is_in_flight() => {
                    consecutive_errors = 0;
                    tracing::trace!(unit = %handle.unit, status = %report.status, "action in flight");
                }
                Ok(report) if report.status == ActionStatus::Completed => {
                    let artifact = retrieve_artifact(
                        self.client,
                        self.reporter,
                        self.layout,
                        &handle.unit,
                        report.artifact_path.as_deref(),
                    )
                    .await;
                    return finish(handle, queries, ActionOutcome::Completed { artifact });
                }
                Ok(report) => {
                    self.reporter.warn(&format!(
                        "Failed {} action on unit {}, status {}",
                        self.action, handle.unit, report.status
                    ));
                    let status = report.status.to_string();
                    return finish(handle, queries, ActionOutcome::Failed { status });
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::debug!(unit = %handle.unit, error = %format!("{e:#}"), consecutive_errors, "status query failed");
                    if consecutive_errors == 1 {
                        self.reporter.warn(&format!(
                            "Error checking action output for {}: {e:#}. Retrying.",
                            handle.unit
                        ));
                    }
                    if self
                        .settings
                        .max_query_errors
                        .is_some_and(|cap| consecutive_errors >= cap)
                    {
                        self.reporter.warn(&format!(
                            "Giving up on {} after {consecutive_errors} consecutive query errors.",
                            handle.unit
                        ));
                        let last_error = format!("{e:#}");
                        return finish(
                            handle,
                            queries,
                            ActionOutcome::Abandoned {
                                consecutive_errors,
                                last_error,
                            },
                        );
                    }
                }
            }
            tokio::time::sleep(self.settings.interval).await;
        }
    }
}

fn finish(handle: ActionHandle, queries: &AtomicU32, outcome: ActionOutcome) -> ActionResult {
    ActionResult {
        unit: handle.unit,
        action_id: handle.action_id,
        outcome,
        queries: queries.load(Ordering::Relaxed),
    }
}
