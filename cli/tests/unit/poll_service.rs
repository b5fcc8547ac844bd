//! Unit tests for `ActionPoller`.
//!
//! Time is paused so poll intervals and deadlines elapse instantly.

#![allow(clippy::expect_used)]

use std::time::Duration;

use chrono::Utc;
use collect_debug::application::services::poll::{ActionPoller, PollSettings};
use collect_debug::domain::{
    ActionHandle, ActionOutcome, ActionResult, ArtifactState, OutputLayout, UnitName,
};
use tokio::time::Instant;

use crate::mocks::{FakeControlPlane, RecordingReporter, SCENARIO_STATUS, Step, action_id_for};

const SETTINGS: PollSettings = PollSettings {
    interval: Duration::from_secs(1),
    max_query_errors: Some(3),
};

fn handle(unit: &str) -> ActionHandle {
    ActionHandle {
        unit: UnitName::new(unit),
        action_id: action_id_for(unit),
        dispatched_at: Utc::now(),
    }
}

async fn poll(
    client: &FakeControlPlane,
    reporter: &RecordingReporter,
    layout: &OutputLayout,
    units: &[&str],
    deadline: Duration,
) -> Vec<ActionResult> {
    let poller = ActionPoller::new(client, reporter, layout, "debug", SETTINGS);
    let handles = units.iter().map(|u| handle(u)).collect();
    poller.collect(handles, Instant::now() + deadline).await
}

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test(start_paused = true)]
async fn test_pending_running_completed_queries_three_times_and_copies_once() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS).script(
        "etcd/0",
        vec![
            Step::Status("pending"),
            Step::Status("running"),
            Step::Complete(Some("/home/ubuntu/debug-20240301.tar.gz")),
        ],
    );
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0"], HOUR).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].queries, 3);
    assert_eq!(client.status_queries("etcd/0"), 3);
    let expected_dir = layout.artifact_dir(&UnitName::new("etcd/0"));
    assert_eq!(
        results[0].outcome,
        ActionOutcome::Completed {
            artifact: ArtifactState::Retrieved {
                local_dir: expected_dir.clone()
            }
        }
    );
    assert_eq!(client.copies().len(), 1);
    assert!(expected_dir.join("debug-20240301.tar.gz").is_file());
    assert!(reporter.warnings().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_action_is_not_copied() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS)
        .script("etcd/1", vec![Step::Status("pending"), Step::Status("failed")]);
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/1"], HOUR).await;

    assert_eq!(
        results[0].outcome,
        ActionOutcome::Failed {
            status: "failed".to_string()
        }
    );
    assert!(client.copies().is_empty());
    assert_eq!(reporter.warnings_mentioning("etcd/1"), 1);
    assert!(reporter.warnings()[0].contains("status failed"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_terminal_status_counts_as_failure() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client =
        FakeControlPlane::new(SCENARIO_STATUS).script("etcd/0", vec![Step::Status("exploded")]);
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0"], HOUR).await;

    assert_eq!(
        results[0].outcome,
        ActionOutcome::Failed {
            status: "exploded".to_string()
        }
    );
    assert!(client.copies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_query_errors_abandon_the_action() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS).script("etcd/0", vec![Step::QueryError]);
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0"], HOUR).await;

    match &results[0].outcome {
        ActionOutcome::Abandoned {
            consecutive_errors,
            last_error,
        } => {
            assert_eq!(*consecutive_errors, 3);
            assert!(last_error.contains("connection is shut down"));
        }
        other => panic!("expected abandoned, got {other:?}"),
    }
    assert_eq!(results[0].queries, 3);
    // One warning when the streak starts, one when giving up.
    assert_eq!(reporter.warnings_mentioning("etcd/0"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_successful_query_resets_error_streak() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS).script(
        "etcd/0",
        vec![
            Step::QueryError,
            Step::QueryError,
            Step::Status("running"),
            Step::QueryError,
            Step::QueryError,
            Step::Complete(Some("/tmp/debug.tar.gz")),
        ],
    );
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0"], HOUR).await;

    assert!(matches!(
        results[0].outcome,
        ActionOutcome::Completed {
            artifact: ArtifactState::Retrieved { .. }
        }
    ));
    assert_eq!(results[0].queries, 6);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_errors_keep_polling_until_deadline() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS).script("etcd/0", vec![Step::QueryError]);
    let reporter = RecordingReporter::default();
    let settings = PollSettings {
        max_query_errors: None,
        ..SETTINGS
    };
    let poller = ActionPoller::new(&client, &reporter, &layout, "debug", settings);

    let results = poller
        .collect(vec![handle("etcd/0")], Instant::now() + Duration::from_secs(60))
        .await;

    assert_eq!(results[0].outcome, ActionOutcome::TimedOut);
    assert!(results[0].queries > 3);
}

#[tokio::test(start_paused = true)]
async fn test_copy_failure_keeps_action_completed() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS).fail_copy("etcd/0");
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0"], HOUR).await;

    match &results[0].outcome {
        ActionOutcome::Completed {
            artifact: ArtifactState::CopyFailed { error },
        } => assert!(error.contains("permission denied")),
        other => panic!("expected copy failure, got {other:?}"),
    }
    assert_eq!(reporter.warnings_mentioning("Error copying debug action output"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_completed_without_path_is_missing() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client =
        FakeControlPlane::new(SCENARIO_STATUS).script("etcd/0", vec![Step::Complete(None)]);
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0"], HOUR).await;

    assert_eq!(
        results[0].outcome,
        ActionOutcome::Completed {
            artifact: ArtifactState::Missing
        }
    );
    assert!(client.copies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_results_arrive_in_completion_order() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS).script(
        "etcd/0",
        vec![
            Step::Status("running"),
            Step::Status("running"),
            Step::Status("running"),
            Step::Complete(Some("/tmp/debug.tar.gz")),
        ],
    );
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &["etcd/0", "etcd/1"], HOUR).await;

    let order: Vec<&str> = results.iter().map(|r| r.unit.as_str()).collect();
    assert_eq!(order, ["etcd/1", "etcd/0"]);
    assert_eq!(results[1].queries, 4);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_times_out_in_flight_actions_only() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client =
        FakeControlPlane::new(SCENARIO_STATUS).script("etcd/0", vec![Step::Status("running")]);
    let reporter = RecordingReporter::default();

    let results = poll(
        &client,
        &reporter,
        &layout,
        &["etcd/0", "etcd/1"],
        Duration::from_millis(4500),
    )
    .await;

    assert_eq!(results.len(), 2);
    let timed_out = results
        .iter()
        .find(|r| r.unit.as_str() == "etcd/0")
        .expect("etcd/0 result");
    assert_eq!(timed_out.outcome, ActionOutcome::TimedOut);
    assert_eq!(timed_out.queries, 5);
    let done = results
        .iter()
        .find(|r| r.unit.as_str() == "etcd/1")
        .expect("etcd/1 result");
    assert!(matches!(done.outcome, ActionOutcome::Completed { .. }));
    assert_eq!(reporter.warnings_mentioning("Timed out waiting for debug action on etcd/0"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_handles_returns_immediately() {
    let out = tempfile::tempdir().expect("tempdir");
    let layout = OutputLayout::new(out.path());
    let client = FakeControlPlane::new(SCENARIO_STATUS);
    let reporter = RecordingReporter::default();

    let results = poll(&client, &reporter, &layout, &[], HOUR).await;

    assert!(results.is_empty());
}
