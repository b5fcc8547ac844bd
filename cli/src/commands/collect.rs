//! Collect command implementation.
//!
//! Runs the collection pipeline and renders the final summary.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::supervisor::{RunOutcome, collect_bundle};
use crate::domain::report::ActionTally;
use crate::output::{OutputContext, TerminalReporter};

/// Execute one collection run.
///
/// # Errors
///
/// Returns an error if the cluster status cannot be fetched or the archive
/// cannot be written.
pub async fn run(app: &AppContext) -> Result<()> {
    let reporter = TerminalReporter::new(&app.output);
    app.output
        .header(&format!("Collecting debug information from {}", app.target));

    let outcome = collect_bundle(
        &app.client,
        &reporter,
        &app.archiver,
        &app.target,
        &app.config,
    )
    .await?;

    render_summary(&app.output, &outcome);
    if app.output.quiet {
        println!("{}", outcome.archive.display());
    }
    Ok(())
}

fn render_summary(ctx: &OutputContext, outcome: &RunOutcome) {
    let report = &outcome.report;
    ctx.header("Summary");
    ctx.kv("actions", &format_tally(&report.tally()));
    if !report.dispatch_failures.is_empty() {
        ctx.kv("skipped", &format!("{} unit(s) could not start the action", report.dispatch_failures.len()));
    }
    ctx.kv(
        "commands",
        &format!(
            "{} run, {} did not exit cleanly",
            report.commands.len(),
            report.failed_commands()
        ),
    );
    if report.deadline_expired {
        ctx.warn("Deadline expired before every step finished.");
    }
    ctx.kv("archive", &outcome.archive.display().to_string());
}

/// One-line description of action outcomes.
#[must_use]
pub fn format_tally(t: &ActionTally) -> String {
    format!(
        "{} completed ({} retrieved), {} failed, {} abandoned, {} timed out",
        t.completed, t.retrieved, t.failed, t.abandoned, t.timed_out
    )
}
