//! Paths inside a run's output tree.
//!
//! Every collected output has a fixed location derived from its unit or
//! command slug, so concurrent writers never share a path.

use std::path::{Path, PathBuf};

use crate::domain::topology::UnitName;

/// Directory name of the output tree inside the archive.
pub const RESULTS_DIR: &str = "results";
/// File name of the machine-readable run summary.
pub const SUMMARY_FILE: &str = "summary.json";
const DEBUG_DIR: &str = "debug";

/// Path computation for one output root.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `(<slug>.out, <slug>.err)` for a battery command.
    #[must_use]
    pub fn command_files(&self, slug: &str) -> (PathBuf, PathBuf) {
        (
            self.root.join(format!("{slug}.out")),
            self.root.join(format!("{slug}.err")),
        )
    }

    /// `debug/<application>/<ordinal>/` for a unit's action artifact.
    ///
    /// Units without an ordinal fall back to `debug/<name>/`.
    #[must_use]
    pub fn artifact_dir(&self, unit: &UnitName) -> PathBuf {
        let base = self.root.join(DEBUG_DIR).join(unit.application());
        match unit.ordinal() {
            Some(ordinal) => base.join(ordinal),
            None => base,
        }
    }

    #[must_use]
    pub fn summary_file(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }
}
