use std::path::PathBuf;

/// Outcome of one extraction run.
#[derive(Clone, Debug, Default)]
pub struct ExtractReport {
    pub output_root: PathBuf,
    /// Assets in the order their data was written.
    pub assets: Vec<ExtractedAsset>,
    /// GUIDs whose `pathname` record had no matching `asset`.
    pub orphan_pathnames: Vec<String>,
    /// Tar entries that were not extracted (directories, previews, metadata).
    pub skipped_entries: usize,
    pub bytes_written: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedAsset {
    pub guid: String,
    pub target_path: PathBuf,
    pub size: u64,
    /// False when no `pathname` arrived and the file kept its GUID name.
    pub resolved: bool,
}

impl ExtractReport {
    pub fn entry_count(&self) -> usize {
        self.assets.len()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ExtractedAsset> {
        self.assets.iter().filter(|asset| !asset.resolved)
    }
}
