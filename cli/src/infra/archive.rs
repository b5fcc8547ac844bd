//! Infrastructure implementation of the `ResultsArchiver` port.
//!
//! The output tree lives in a `tempfile` directory and is packed with
//! `tar` + `flate2` into `results-<timestamp>.tar.gz`.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::application::ports::ResultsArchiver;
use crate::domain::layout::RESULTS_DIR;

/// Collisions within one second get a `-<n>` suffix.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Writes gzip-compressed tarballs into `dest_dir`.
#[derive(Debug, Clone)]
pub struct TarballArchiver {
    dest_dir: PathBuf,
}

impl TarballArchiver {
    #[must_use]
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
        }
    }
}

/// `results-YYYY-MM-DD-HH-MM-SS.tar.gz` for the given instant.
#[must_use]
pub fn archive_name(at: &DateTime<Local>) -> String {
    format!("{RESULTS_DIR}-{}.tar.gz", at.format("%Y-%m-%d-%H-%M-%S"))
}

/// Create a new archive file in `dir` for `at`, never replacing an existing one.
fn create_archive_file(dir: &Path, at: &DateTime<Local>) -> Result<(PathBuf, File)> {
    let base = archive_name(at);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = match attempt {
            0 => base.clone(),
            n => base.replace(".tar.gz", &format!("-{n}.tar.gz")),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e).with_context(|| format!("creating {}", path.display())),
        }
    }
    anyhow::bail!("no free archive name for {base} in {}", dir.display())
}

impl ResultsArchiver for TarballArchiver {
    fn prepare(&self) -> Result<(PathBuf, Box<dyn std::any::Any + Send>)> {
        let scratch = tempfile::Builder::new()
            .prefix("collect-debug-")
            .tempdir()
            .context("cannot create temporary directory")?;
        let root = scratch.path().join(RESULTS_DIR);
        std::fs::create_dir(&root).with_context(|| format!("creating {}", root.display()))?;
        tracing::debug!(root = %root.display(), "output tree created");
        Ok((root, Box::new(scratch)))
    }

    fn archive(&self, root: &Path) -> Result<PathBuf> {
        let (path, file) = create_archive_file(&self.dest_dir, &Local::now())?;
        let mut tar = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        tar.append_dir_all(RESULTS_DIR, root)
            .with_context(|| format!("archiving {}", root.display()))?;
        tar.into_inner()
            .context("finishing tar stream")?
            .finish()
            .context("finishing gzip stream")?;
        Ok(path)
    }
}
