//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::commands;
use crate::domain::{CollectConfig, ModelTarget};
use crate::infra::config::YamlConfigStore;

/// Collect a debug bundle from a Juju-managed Kubernetes cluster
#[derive(Parser)]
#[command(name = "collect-debug", version, about)]
pub struct Cli {
    /// Model to operate in. Accepts [<controller name>:]<model name>
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Global deadline for the whole run, in seconds [default: 1800]
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Application whose units run the debug action (repeatable or comma-separated)
    #[arg(short = 'a', long = "app", value_name = "NAME", value_delimiter = ',')]
    pub apps: Vec<String>,

    /// Delay between action status queries, in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Consecutive status query errors before an action is abandoned (0 = never) [default: 30]
    #[arg(long, value_name = "N")]
    pub max_query_errors: Option<u32>,

    /// Directory where the results archive is written
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Configuration file [default: $COLLECT_DEBUG_CONFIG or <config dir>/collect-debug/config.yaml]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Execute the collection run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the cluster status
    /// cannot be fetched, or the archive cannot be written.
    pub async fn run(self) -> Result<()> {
        let base = YamlConfigStore::new(self.config.clone()).load()?;
        let config = self.apply_overrides(base);
        config.validate()?;

        let target = match &self.model {
            Some(selector) => ModelTarget::parse(selector)?,
            None => ModelTarget::default(),
        };

        let app = AppContext::new(self.no_color, self.quiet, target, config, &self.output_dir);
        commands::collect::run(&app).await
    }

    /// Layer command-line values over the file configuration.
    #[must_use]
    pub fn apply_overrides(&self, mut config: CollectConfig) -> CollectConfig {
        if !self.apps.is_empty() {
            config.applications.clone_from(&self.apps);
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }
        if let Some(cap) = self.max_query_errors {
            config.max_query_errors = cap;
        }
        config
    }
}
