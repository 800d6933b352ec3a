use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Directories known to exist during one extraction run.
///
/// Only ever grows. A hit skips the filesystem entirely; a miss falls back to
/// `create_dir_all`, which is itself idempotent.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    created: HashSet<PathBuf>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the parent directory of `path` unless it is already known.
    pub fn ensure_parent(&mut self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.ensure_dir(parent),
            _ => Ok(()),
        }
    }

    pub fn ensure_dir(&mut self, dir: &Path) -> Result<()> {
        if self.created.contains(dir) {
            return Ok(());
        }

        if !dir.is_dir() {
            debug!(dir = %dir.display(), "creating directory");
            std::fs::create_dir_all(dir).map_err(|e| Error::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        self.created.insert(dir.to_path_buf());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.created.contains(dir)
    }
}
