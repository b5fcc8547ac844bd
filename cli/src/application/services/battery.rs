//! Application service: run the auxiliary read-only command battery.

use std::path::Path;

use tokio::time::Instant;

use crate::application::ports::{ClusterInspector, ProgressReporter};
use crate::domain::{AuxCommand, CommandOutcome, OutputLayout};

/// Run `commands` one after another, storing each stdout/stderr pair.
///
/// A failing command never stops the battery. Commands still running at
/// `deadline` are dropped (their process is killed) and the rest are
/// recorded as skipped.
pub async fn run_battery(
    client: &impl ClusterInspector,
    reporter: &impl ProgressReporter,
    layout: &OutputLayout,
    commands: &[AuxCommand],
    deadline: Instant,
) -> Vec<CommandOutcome> {
    let mut outcomes = Vec::with_capacity(commands.len());
    for command in commands {
        if Instant::now() >= deadline {
            outcomes.push(CommandOutcome {
                slug: command.slug.clone(),
                exit_code: None,
                error: None,
                skipped: true,
            });
            continue;
        }

        reporter.step(&format!("Running {}...", command.display()));
        let (out_path, err_path) = layout.command_files(&command.slug);

        let outcome = match tokio::time::timeout_at(deadline, client.run_readonly(command)).await {
            Ok(Ok(output)) => {
                store(reporter, &out_path, &output.stdout).await;
                store(reporter, &err_path, &output.stderr).await;
                CommandOutcome {
                    slug: command.slug.clone(),
                    exit_code: output.status.code(),
                    error: output
                        .status
                        .code()
                        .is_none()
                        .then(|| "terminated by signal".to_string()),
                    skipped: false,
                }
            }
            Ok(Err(e)) => failed(reporter, command, &err_path, format!("{e:#}")).await,
            Err(_) => {
                failed(reporter, command, &err_path, "deadline expired".to_string()).await
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

async fn failed(
    reporter: &impl ProgressReporter,
    command: &AuxCommand,
    err_path: &Path,
    error: String,
) -> CommandOutcome {
    reporter.warn(&format!("{} failed: {error}", command.display()));
    store(reporter, err_path, format!("{error}\n").as_bytes()).await;
    CommandOutcome {
        slug: command.slug.clone(),
        exit_code: None,
        error: Some(error),
        skipped: false,
    }
}

async fn store(reporter: &impl ProgressReporter, path: &Path, contents: &[u8]) {
    if let Err(e) = tokio::fs::write(path, contents).await {
        reporter.warn(&format!("Cannot write {}: {e}", path.display()));
    }
}
