//! Infrastructure implementation of the control plane port traits.
//!
//! `JujuClient<R>` routes every control plane call through the `juju` CLI
//! via a `CommandRunner`, addressing the configured model.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{ActionRunner, ArtifactTransfer, ClusterInspector, CommandRunner};
use crate::domain::action::parse_action_id;
use crate::domain::{
    ActionId, ActionReport, AuxCommand, ClusterStatus, ControlPlaneError, ModelTarget, Scope,
    UnitName,
};

const JUJU: &str = "juju";

/// Infrastructure adapter that routes all juju CLI calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct JujuClient<R: CommandRunner> {
    runner: R,
    target: ModelTarget,
}

impl<R: CommandRunner> JujuClient<R> {
    pub fn new(runner: R, target: ModelTarget) -> Self {
        Self { runner, target }
    }

    /// `<subcommand> [-m <model>] <rest...>`
    fn args(&self, scope: Scope, subcommand: &str, rest: &[&str]) -> Vec<String> {
        let mut args = vec![subcommand.to_string()];
        if let Some(model) = self.target.model_arg(scope) {
            args.push("-m".to_string());
            args.push(model);
        }
        args.extend(rest.iter().map(|a| (*a).to_string()));
        args
    }

    async fn run(&self, args: &[String]) -> Result<Output> {
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run(JUJU, &argv)
            .await
            .with_context(|| format!("juju {}", args[0]))
    }

    /// Run and require a zero exit status.
    async fn run_checked(&self, args: &[String]) -> Result<Output> {
        let output = self.run(args).await?;
        check_success(&args[0], &output)?;
        Ok(output)
    }
}

fn check_success(subcommand: &str, output: &Output) -> Result<(), ControlPlaneError> {
    if output.status.success() {
        return Ok(());
    }
    let command = format!("juju {subcommand}");
    match output.status.code() {
        Some(code) => Err(ControlPlaneError::CommandFailed {
            command,
            code,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        None => Err(ControlPlaneError::Terminated { command }),
    }
}

impl<R: CommandRunner> ClusterInspector for JujuClient<R> {
    async fn cluster_status(&self) -> Result<ClusterStatus> {
        let args = self.args(Scope::Model, "status", &["--format", "json"]);
        let output = self.run_checked(&args).await?;
        ClusterStatus::from_json(&output.stdout).context("juju status")
    }

    async fn run_readonly(&self, command: &AuxCommand) -> Result<Output> {
        let Some((subcommand, rest)) = command.args.split_first() else {
            anyhow::bail!("empty command for {}", command.slug);
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        let args = self.args(command.scope, subcommand, &rest);
        self.run(&args).await
    }
}

impl<R: CommandRunner> ActionRunner for JujuClient<R> {
    async fn start_action(&self, unit: &UnitName, action: &str) -> Result<ActionId> {
        let args = self.args(
            Scope::Model,
            "run-action",
            &[unit.as_str(), action, "--format", "json"],
        );
        let output = self.run_checked(&args).await?;
        Ok(parse_action_id(&output.stdout)?)
    }

    async fn action_status(&self, id: &ActionId) -> Result<ActionReport> {
        let args = self.args(
            Scope::Model,
            "show-action-output",
            &[id.as_str(), "--format", "json"],
        );
        let output = self.run_checked(&args).await?;
        Ok(ActionReport::from_json(&output.stdout)?)
    }
}

impl<R: CommandRunner> ArtifactTransfer for JujuClient<R> {
    async fn copy_artifact(
        &self,
        unit: &UnitName,
        remote_path: &str,
        local_dir: &Path,
    ) -> Result<()> {
        let source = format!("{unit}:{remote_path}");
        let dest = local_dir.to_string_lossy();
        let args = self.args(Scope::Model, "scp", &[&source, &dest]);
        self.run_checked(&args).await?;
        Ok(())
    }
}
