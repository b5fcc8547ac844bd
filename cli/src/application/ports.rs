//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{ActionId, ActionReport, AuxCommand, ClusterStatus, CollectConfig, UnitName};

// ── Control Plane Port Traits ─────────────────────────────────────────────────

/// Read-only queries against the target model.
#[allow(async_fn_in_trait)]
pub trait ClusterInspector {
    /// Fetch and parse the current status snapshot.
    async fn cluster_status(&self) -> Result<ClusterStatus>;
    /// Run one battery command and capture its raw output.
    ///
    /// A non-zero exit is returned as `Ok`; only spawn failures and timeouts
    /// are errors.
    async fn run_readonly(&self, command: &AuxCommand) -> Result<Output>;
}

/// Remote action lifecycle.
#[allow(async_fn_in_trait)]
pub trait ActionRunner {
    /// Queue `action` on `unit` and return its id.
    async fn start_action(&self, unit: &UnitName, action: &str) -> Result<ActionId>;
    /// Query the current status of an action.
    async fn action_status(&self, id: &ActionId) -> Result<ActionReport>;
}

/// Unit-to-host file transfer.
#[allow(async_fn_in_trait)]
pub trait ArtifactTransfer {
    /// Copy `remote_path` on `unit` into the existing directory `local_dir`.
    async fn copy_artifact(&self, unit: &UnitName, remote_path: &str, local_dir: &Path)
    -> Result<()>;
}

/// Composite trait: any type implementing all three sub-traits is a `ControlPlane`.
pub trait ControlPlane: ClusterInspector + ActionRunner + ArtifactTransfer {}

/// Blanket implementation: any type implementing all three sub-traits is a `ControlPlane`.
impl<T> ControlPlane for T where T: ClusterInspector + ActionRunner + ArtifactTransfer {}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds the
    /// runner's timeout. On timeout, the child process must be killed (not
    /// left orphaned).
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Synchronous.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Archive Port ──────────────────────────────────────────────────────────────

/// Owns the scratch output tree and turns it into the final bundle.
///
/// Archivers are cloned onto a blocking thread to pack the tree.
pub trait ResultsArchiver: Clone + Send + 'static {
    /// Create an empty output root.
    ///
    /// Returns `(path, guard)`; dropping `guard` removes the scratch space.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be created.
    fn prepare(&self) -> Result<(PathBuf, Box<dyn std::any::Any + Send>)>;

    /// Pack `root` into one compressed archive and return its path.
    ///
    /// Blocking; never overwrites an existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be written.
    fn archive(&self, root: &Path) -> Result<PathBuf>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading of the collector configuration file.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<CollectConfig>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if no location can be determined.
    fn path(&self) -> Result<PathBuf>;
}
