//! Application context: everything a command handler needs for one run.

use std::path::Path;

use crate::domain::{CollectConfig, ModelTarget};
use crate::infra::archive::TarballArchiver;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::juju::JujuClient;
use crate::output::OutputContext;

/// Unified application context passed to the command handler.
///
/// Constructed once in `Cli::run()` from the merged configuration.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Model the run targets.
    pub target: ModelTarget,
    /// Validated run configuration.
    pub config: CollectConfig,
    /// Control plane client.
    pub client: JujuClient<TokioCommandRunner>,
    /// Writes the final bundle.
    pub archiver: TarballArchiver,
}

impl AppContext {
    #[must_use]
    pub fn new(
        no_color: bool,
        quiet: bool,
        target: ModelTarget,
        config: CollectConfig,
        output_dir: &Path,
    ) -> Self {
        // Per-process ceiling; the run deadline usually fires first.
        let runner = TokioCommandRunner::new(config.timeout());
        Self {
            output: OutputContext::new(no_color, quiet),
            client: JujuClient::new(runner, target.clone()),
            archiver: TarballArchiver::new(output_dir),
            target,
            config,
        }
    }
}
