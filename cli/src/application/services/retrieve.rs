//! Application service: copy a completed action's artifact into the output tree.

use crate::application::ports::{ArtifactTransfer, ProgressReporter};
use crate::domain::{ArtifactState, OutputLayout, UnitName};

/// Copy `remote_path` from `unit` into `debug/<application>/<ordinal>/`.
///
/// Infallible: every failure is reported and returned as an `ArtifactState`,
/// leaving the action itself counted as completed.
pub async fn retrieve_artifact(
    client: &impl ArtifactTransfer,
    reporter: &impl ProgressReporter,
    layout: &OutputLayout,
    unit: &UnitName,
    remote_path: Option<&str>,
) -> ArtifactState {
    let Some(remote_path) = remote_path else {
        reporter.warn(&format!("Action on {unit} completed without an artifact path."));
        return ArtifactState::Missing;
    };

    let local_dir = layout.artifact_dir(unit);
    if let Err(e) = tokio::fs::create_dir_all(&local_dir).await {
        reporter.warn(&format!(
            "Cannot create {} for {unit}: {e}. Skipping.",
            local_dir.display()
        ));
        return ArtifactState::CopyFailed {
            error: e.to_string(),
        };
    }

    match client.copy_artifact(unit, remote_path, &local_dir).await {
        Ok(()) => {
            reporter.success(&format!("Retrieved debug output from {unit}"));
            ArtifactState::Retrieved { local_dir }
        }
        Err(e) => {
            reporter.warn(&format!(
                "Error copying debug action output from {unit}: {e:#}. Skipping."
            ));
            ArtifactState::CopyFailed {
                error: format!("{e:#}"),
            }
        }
    }
}
