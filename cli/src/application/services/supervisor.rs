//! Application service: one end-to-end collection run.
//!
//! Order: fetch the cluster status (the only fatal step), open the run
//! workspace, dispatch actions, then poll them while the command battery
//! runs, all under one deadline. The workspace is archived exactly once
//! whatever happened in between.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::Instant;

use crate::application::ports::{ControlPlane, ProgressReporter, ResultsArchiver};
use crate::application::services::battery::run_battery;
use crate::application::services::dispatch::dispatch_actions;
use crate::application::services::poll::{ActionPoller, PollSettings};
use crate::application::services::workspace::RunWorkspace;
use crate::domain::{
    ClusterStatus, CollectConfig, ModelTarget, OutputLayout, RunReport, standard_battery,
};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub archive: PathBuf,
    pub report: RunReport,
}

/// Run the whole collection pipeline.
///
/// # Errors
///
/// Returns an error if the initial cluster status cannot be obtained (nothing
/// is written in that case) or if the final archive cannot be written. Every
/// other failure is reported and recorded in the run report.
pub async fn collect_bundle(
    client: &impl ControlPlane,
    reporter: &impl ProgressReporter,
    archiver: &impl ResultsArchiver,
    target: &ModelTarget,
    config: &CollectConfig,
) -> Result<RunOutcome> {
    let deadline = Instant::now()
        .checked_add(config.timeout())
        .with_context(|| format!("timeout of {}s is too large", config.timeout_secs))?;

    reporter.step("Getting juju status...");
    let status = tokio::time::timeout_at(deadline, client.cluster_status())
        .await
        .context("timed out getting juju status")?
        .context("cannot get juju status")?;

    let workspace = RunWorkspace::open(archiver)?;
    let layout = OutputLayout::new(workspace.root());
    let mut report = RunReport {
        model: target.to_string(),
        started_at: Some(Utc::now()),
        ..RunReport::default()
    };

    run_pipeline(client, reporter, &layout, &status, config, deadline, &mut report).await;
    write_summary(reporter, &layout, &report).await;

    let archive = workspace.finish().await?;
    reporter.success(&format!("Results stored in {}.", archive.display()));
    Ok(RunOutcome { archive, report })
}

async fn run_pipeline(
    client: &impl ControlPlane,
    reporter: &impl ProgressReporter,
    layout: &OutputLayout,
    status: &ClusterStatus,
    config: &CollectConfig,
    deadline: Instant,
    report: &mut RunReport,
) {
    let units = status.target_units(&config.applications);
    if units.is_empty() {
        reporter.warn("None of the configured applications has units; no actions to run.");
    }

    let dispatch = dispatch_actions(client, reporter, &units, &config.action, deadline).await;
    report.dispatch_failures = dispatch.failures;

    let settings = PollSettings {
        interval: config.poll_interval(),
        max_query_errors: config.query_error_cap(),
    };
    let poller = ActionPoller::new(client, reporter, layout, &config.action, settings);
    let commands = standard_battery(status, &config.config_applications);

    let (actions, commands) = tokio::join!(
        poller.collect(dispatch.handles, deadline),
        run_battery(client, reporter, layout, &commands, deadline),
    );
    report.actions = actions;
    report.commands = commands;
    report.deadline_expired = Instant::now() >= deadline;
    if report.deadline_expired {
        reporter.warn("Run deadline expired; archiving what was collected.");
    }
}

async fn write_summary(reporter: &impl ProgressReporter, layout: &OutputLayout, report: &RunReport) {
    let path = layout.summary_file();
    let written = match serde_json::to_vec_pretty(report) {
        Ok(json) => tokio::fs::write(&path, json).await.map_err(anyhow::Error::from),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = written {
        reporter.warn(&format!("Cannot write {}: {e:#}", path.display()));
    }
}
