use std::cell::Cell;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::correlate::Correlator;
use crate::error::{Error, Result};
use crate::options::ExtractOptions;
use crate::report::ExtractReport;
use crate::sanitize::normalize_path;

pub const PACKAGE_EXTENSION: &str = "unitypackage";

const ASSET_LEAF: &str = "asset";
const PATHNAME_LEAF: &str = "pathname";

/// Extract `input` into `<output_dir>/<input file stem>/`.
///
/// Progress is reported against the compressed file size.
pub fn extract(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractReport> {
    let input = input.as_ref();
    let root = output_root(input, output_dir.as_ref())?;

    info!(input = %input.display(), root = %root.display(), "extracting package");

    let file = File::open(input)?;
    let total = file.metadata()?.len();
    let options = options.clone().expected_total_bytes(total);

    extract_from_reader(file, &root, &options)
}

/// Extract a gzip-compressed unitypackage stream into `root`.
///
/// `root` is created if missing. Set
/// [`ExtractOptions::expected_total_bytes`] to the compressed length to get
/// fractional progress.
pub fn extract_from_reader<R: Read>(
    reader: R,
    root: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport> {
    let root = normalize_path(&std::path::absolute(root)?);
    if !root.is_dir() {
        std::fs::create_dir_all(&root).map_err(|e| Error::DirectoryCreationFailed {
            path: root.clone(),
            source: e,
        })?;
    }

    let consumed = Rc::new(Cell::new(0u64));
    let counted = CountingReader {
        inner: reader,
        consumed: Rc::clone(&consumed),
    };
    let mut archive = tar::Archive::new(GzDecoder::new(counted));

    let mut correlator = Correlator::new(root);
    let mut skipped = 0usize;

    for entry in archive.entries()? {
        let mut entry = entry?;

        if entry.header().entry_type().is_file() {
            let name = entry.path()?.into_owned();
            let (guid, leaf) = split_entry_name(&name)?;

            match leaf.as_str() {
                ASSET_LEAF => correlator.asset(&guid, &mut entry)?,
                PATHNAME_LEAF => correlator.pathname(&guid, &mut entry)?,
                _ => {
                    debug!(entry = %name.display(), "ignoring entry");
                    skipped += 1;
                }
            }
        } else {
            skipped += 1;
        }

        options.report(consumed.get());
    }

    let mut report = correlator.finish();
    report.skipped_entries = skipped;

    info!(
        assets = report.entry_count(),
        unresolved = report.unresolved().count(),
        bytes = report.bytes_written,
        "package extracted"
    );

    Ok(report)
}

/// Compute the absolute output root for `input`, validating its extension.
pub fn output_root(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let has_extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION));

    let stem = match input.file_stem() {
        Some(stem) if has_extension => stem,
        _ => {
            return Err(Error::InvalidExtension {
                path: input.to_path_buf(),
            });
        }
    };

    let output_dir = std::path::absolute(output_dir)?;
    Ok(normalize_path(&output_dir.join(stem)))
}

/// Split `<guid>/<leaf>` into its two parts.
fn split_entry_name(name: &Path) -> Result<(String, String)> {
    let malformed = || Error::MalformedEntry {
        entry: name.to_path_buf(),
    };

    let mut parts = Vec::with_capacity(2);
    for component in name.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(malformed)?),
            _ => return Err(malformed()),
        }
    }

    match parts.as_slice() {
        [guid, leaf] => Ok(((*guid).to_owned(), (*leaf).to_owned())),
        _ => Err(malformed()),
    }
}

/// Tracks how many compressed bytes the decoder has pulled so far.
struct CountingReader<R> {
    inner: R,
    consumed: Rc<Cell<u64>>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.set(self.consumed.get() + n as u64);
        Ok(n)
    }
}
