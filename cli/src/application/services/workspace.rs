//! The run's scratch output tree as a scoped resource.
//!
//! Opening a `RunWorkspace` creates the output root. Releasing it archives
//! the tree and then removes the scratch space, either explicitly through
//! [`RunWorkspace::finish`] or, on any other exit path (early return, panic
//! unwind, cancelled future), when the workspace is dropped. The archive
//! step runs exactly once.

use std::any::Any;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ResultsArchiver;

pub struct RunWorkspace<'a, A: ResultsArchiver> {
    root: PathBuf,
    archiver: &'a A,
    archived: bool,
    // Dropped only after archiving, so removal always follows it.
    scratch: Option<Box<dyn Any + Send>>,
}

impl<'a, A: ResultsArchiver> RunWorkspace<'a, A> {
    /// # Errors
    ///
    /// Returns an error if the scratch output root cannot be created.
    pub fn open(archiver: &'a A) -> Result<Self> {
        let (root, scratch) = archiver.prepare()?;
        Ok(Self {
            root,
            archiver,
            archived: false,
            scratch: Some(scratch),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archive the output tree on a blocking thread and release the scratch space.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be written.
    pub async fn finish(mut self) -> Result<PathBuf> {
        self.archived = true;
        let archiver = A::clone(self.archiver);
        let root = self.root.clone();
        let scratch = self.scratch.take();
        tokio::task::spawn_blocking(move || {
            let archive = archiver.archive(&root);
            drop(scratch);
            archive
        })
        .await
        .context("archive task did not complete")?
    }
}

impl<A: ResultsArchiver> Drop for RunWorkspace<'_, A> {
    fn drop(&mut self) {
        if self.archived {
            return;
        }
        self.archived = true;
        // Drop cannot await; archive in place.
        match self.archiver.archive(&self.root) {
            Ok(path) => tracing::warn!(archive = %path.display(), "run aborted, partial results archived"),
            Err(e) => tracing::error!(error = %format!("{e:#}"), "run aborted and results could not be archived"),
        }
    }
}
