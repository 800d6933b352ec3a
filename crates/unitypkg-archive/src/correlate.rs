//! GUID correlation between `asset` and `pathname` records.
//!
//! A unitypackage stores every asset under `<guid>/asset`, with the real
//! project path in a sibling `<guid>/pathname`. The two records can come in
//! either order, so each GUID walks a small state machine:
//!
//! ```text
//!            asset                 pathname
//! (absent) ───────▶ Staged ──────────────────▶ Resolved
//!     │                                           ▲
//!     └─────────▶ PathKnown ──────────────────────┘
//!      pathname                 asset
//! ```
//!
//! `Staged` assets live at `<root>/<guid>` until their pathname shows up and
//! they are moved into place. Any other repeat of a record is a format error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dirs::DirectoryCache;
use crate::error::{Error, Result};
use crate::report::{ExtractReport, ExtractedAsset};
use crate::sanitize::safe_join;

#[derive(Clone, Debug, PartialEq, Eq)]
enum AssetState {
    /// Data written to the GUID-named staging file; index into `assets`.
    Staged(usize),
    /// Pathname seen, data not yet.
    PathKnown(PathBuf),
    /// Data written to its final location; index into `assets`.
    Resolved(usize),
}

/// Per-run correlation state. Owned by a single extraction call.
#[derive(Debug)]
pub struct Correlator {
    root: PathBuf,
    states: HashMap<String, AssetState>,
    dirs: DirectoryCache,
    assets: Vec<ExtractedAsset>,
    bytes_written: u64,
}

impl Correlator {
    /// `root` must already exist and be absolute.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            states: HashMap::new(),
            dirs: DirectoryCache::new(),
            assets: Vec::new(),
            bytes_written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle a `<guid>/asset` record.
    pub fn asset<R: Read>(&mut self, guid: &str, data: R) -> Result<()> {
        match self.states.get(guid).cloned() {
            Some(AssetState::Staged(_)) | Some(AssetState::Resolved(_)) => {
                Err(Error::DuplicateAsset { guid: guid.to_owned() })
            }
            Some(AssetState::PathKnown(target)) => {
                self.dirs.ensure_parent(&target)?;
                let size = write_new_file(&target, data)?;
                debug!(guid, path = %target.display(), size, "asset written to resolved path");

                let index = self.record(guid, target, size, true);
                self.states.insert(guid.to_owned(), AssetState::Resolved(index));
                Ok(())
            }
            None => {
                let staging = safe_join(&self.root, guid)?;
                let size = write_new_file(&staging, data)?;
                debug!(guid, size, "asset staged until its pathname arrives");

                let index = self.record(guid, staging, size, false);
                self.states.insert(guid.to_owned(), AssetState::Staged(index));
                Ok(())
            }
        }
    }

    /// Handle a `<guid>/pathname` record.
    pub fn pathname<R: Read>(&mut self, guid: &str, data: R) -> Result<()> {
        let state = self.states.get(guid).cloned();
        if matches!(state, Some(AssetState::PathKnown(_)) | Some(AssetState::Resolved(_))) {
            return Err(Error::DuplicatePathname { guid: guid.to_owned() });
        }

        let relative = read_pathname(guid, data)?;
        let target = safe_join(&self.root, &relative)?;

        match state {
            Some(AssetState::Staged(index)) => {
                let staging = self.assets[index].target_path.clone();
                if staging != target {
                    self.dirs.ensure_parent(&target)?;
                    move_no_overwrite(&staging, &target)?;
                }
                debug!(guid, path = %target.display(), "staged asset moved into place");

                let asset = &mut self.assets[index];
                asset.target_path = target;
                asset.resolved = true;
                self.states.insert(guid.to_owned(), AssetState::Resolved(index));
            }
            _ => {
                debug!(guid, path = %relative, "pathname recorded ahead of its asset");
                self.states.insert(guid.to_owned(), AssetState::PathKnown(target));
            }
        }

        Ok(())
    }

    /// Close out the run, reporting what ended up where.
    pub fn finish(self) -> ExtractReport {
        let mut orphan_pathnames: Vec<String> = self
            .states
            .iter()
            .filter(|(_, state)| matches!(state, AssetState::PathKnown(_)))
            .map(|(guid, _)| guid.clone())
            .collect();
        orphan_pathnames.sort();

        for asset in self.assets.iter().filter(|asset| !asset.resolved) {
            warn!(guid = %asset.guid, "no pathname record; asset left under its guid");
        }

        ExtractReport {
            output_root: self.root,
            assets: self.assets,
            orphan_pathnames,
            skipped_entries: 0,
            bytes_written: self.bytes_written,
        }
    }

    fn record(&mut self, guid: &str, target_path: PathBuf, size: u64, resolved: bool) -> usize {
        self.bytes_written += size;
        self.assets.push(ExtractedAsset {
            guid: guid.to_owned(),
            target_path,
            size,
            resolved,
        });
        self.assets.len() - 1
    }
}

/// Read the first line of a `pathname` record.
///
/// Layout is `<path>\n` optionally followed by a short trailer (usually
/// `00`); everything after the first line feed is ignored.
fn read_pathname<R: Read>(guid: &str, data: R) -> Result<String> {
    let mut line = Vec::new();
    let read = BufReader::new(data).read_until(b'\n', &mut line)?;
    if read == 0 {
        return Err(Error::InvalidPathname { guid: guid.to_owned() });
    }

    while matches!(line.last(), Some(b'\n' | b'\r' | b'\0')) {
        line.pop();
    }

    match String::from_utf8(line) {
        Ok(path) if !path.is_empty() => Ok(path),
        _ => Err(Error::InvalidPathname { guid: guid.to_owned() }),
    }
}

fn write_new_file<R: Read>(path: &Path, mut data: R) -> Result<u64> {
    let mut file = File::options()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::Conflict { path: path.to_path_buf() },
            _ => Error::ExtractionFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

    io::copy(&mut data, &mut file).map_err(|e| Error::ExtractionFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn move_no_overwrite(from: &Path, to: &Path) -> Result<()> {
    // rename() replaces existing files on unix
    if to.symlink_metadata().is_ok() {
        return Err(Error::Conflict { path: to.to_path_buf() });
    }

    std::fs::rename(from, to).map_err(|e| Error::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::tempdir;

    use super::*;

    const GUID: &str = "0123456789abcdef0123456789abcdef";

    fn correlator(dir: &tempfile::TempDir) -> Correlator {
        Correlator::new(dir.path())
    }

    #[test]
    fn pathname_before_asset_writes_directly() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        c.pathname(GUID, Cursor::new("Assets/a.txt\n00")).unwrap();
        assert!(!dir.path().join("Assets").exists());

        c.asset(GUID, Cursor::new("x")).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("Assets/a.txt")).unwrap(), "x");
        assert!(!dir.path().join(GUID).exists());

        let report = c.finish();
        assert_eq!(report.entry_count(), 1);
        assert!(report.assets[0].resolved);
        assert_eq!(report.bytes_written, 1);
    }

    #[test]
    fn asset_before_pathname_is_moved() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        c.asset(GUID, Cursor::new("y")).unwrap();
        assert!(dir.path().join(GUID).is_file());

        c.pathname(GUID, Cursor::new("Assets/sub/b.txt\n")).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("Assets/sub/b.txt")).unwrap(), "y");
        assert!(!dir.path().join(GUID).exists());

        let report = c.finish();
        assert_eq!(report.assets[0].target_path, dir.path().join("Assets/sub/b.txt"));
        assert_eq!(report.unresolved().count(), 0);
    }

    #[test]
    fn asset_without_pathname_keeps_guid_name() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        c.asset(GUID, Cursor::new("z")).unwrap();
        let report = c.finish();

        assert_eq!(std::fs::read_to_string(dir.path().join(GUID)).unwrap(), "z");
        assert_eq!(report.unresolved().count(), 1);
    }

    #[test]
    fn pathname_without_asset_is_an_orphan() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        c.pathname(GUID, Cursor::new("Assets/Folder")).unwrap();
        let report = c.finish();

        assert!(report.assets.is_empty());
        assert_eq!(report.orphan_pathnames, vec![GUID.to_owned()]);
    }

    #[test]
    fn duplicate_pathname_rejected_in_both_orders() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        c.pathname(GUID, Cursor::new("Assets/a.txt")).unwrap();
        let result = c.pathname(GUID, Cursor::new("Assets/other.txt"));
        assert!(matches!(result, Err(Error::DuplicatePathname { .. })));

        c.asset(GUID, Cursor::new("x")).unwrap();
        let result = c.pathname(GUID, Cursor::new("Assets/other.txt"));
        assert!(matches!(result, Err(Error::DuplicatePathname { .. })));

        // the first resolution is untouched
        assert_eq!(std::fs::read_to_string(dir.path().join("Assets/a.txt")).unwrap(), "x");
        assert!(!dir.path().join("Assets/other.txt").exists());
    }

    #[test]
    fn duplicate_asset_rejected() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        c.asset(GUID, Cursor::new("one")).unwrap();
        let result = c.asset(GUID, Cursor::new("two"));
        assert!(matches!(result, Err(Error::DuplicateAsset { .. })));
        assert_eq!(std::fs::read_to_string(dir.path().join(GUID)).unwrap(), "one");
    }

    #[test]
    fn escaping_pathname_rejected_before_write() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("pkg");
        std::fs::create_dir_all(&root).unwrap();
        let mut c = Correlator::new(&root);

        let result = c.pathname(GUID, Cursor::new("../../evil.txt"));
        assert!(matches!(result, Err(Error::PathEscape { .. })));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn empty_pathname_rejected() {
        let dir = tempdir().unwrap();
        let mut c = correlator(&dir);

        let result = c.pathname(GUID, Cursor::new(""));
        assert!(matches!(result, Err(Error::InvalidPathname { .. })));

        let result = c.pathname(GUID, Cursor::new("\n00"));
        assert!(matches!(result, Err(Error::InvalidPathname { .. })));
    }

    #[test]
    fn existing_destination_is_a_conflict() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Assets")).unwrap();
        std::fs::write(dir.path().join("Assets/a.txt"), "old").unwrap();
        let mut c = correlator(&dir);

        c.pathname(GUID, Cursor::new("Assets/a.txt")).unwrap();
        let result = c.asset(GUID, Cursor::new("new"));
        assert!(matches!(result, Err(Error::Conflict { .. })));
        assert_eq!(std::fs::read_to_string(dir.path().join("Assets/a.txt")).unwrap(), "old");
    }

    #[test]
    fn move_onto_existing_file_is_a_conflict() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("taken.txt"), "old").unwrap();
        let mut c = correlator(&dir);

        c.asset(GUID, Cursor::new("new")).unwrap();
        let result = c.pathname(GUID, Cursor::new("taken.txt"));
        assert!(matches!(result, Err(Error::Conflict { .. })));
        assert_eq!(std::fs::read_to_string(dir.path().join("taken.txt")).unwrap(), "old");
    }

    #[test]
    fn pathname_line_trailer_is_trimmed() {
        let relative = read_pathname(GUID, Cursor::new(b"Assets/x y.wav\r\n00\0".to_vec())).unwrap();
        assert_eq!(relative, "Assets/x y.wav");

        let relative = read_pathname(GUID, Cursor::new(b"Assets/no_newline\0".to_vec())).unwrap();
        assert_eq!(relative, "Assets/no_newline");
    }
}
