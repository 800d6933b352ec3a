//! Unity package (`.unitypackage`) extraction.
//!
//! A unitypackage is a gzip-compressed tar where every asset lives under a
//! GUID-named directory as an opaque `asset` blob plus a `pathname` record
//! naming its real project path. This crate correlates the two and writes
//! each asset to `<output>/<package name>/<pathname>`.
//!
//! # Architecture
//!
//! - `extract.rs` - Entry loop, output root and progress
//! - `correlate.rs` - Per-GUID state machine (arrival-order independence)
//! - `sanitize.rs` - Path containment (zip-slip prevention)
//! - `dirs.rs` - Directory creation cache
//! - `options.rs`, `report.rs` - Shared types

pub use correlate::Correlator;
pub use dirs::DirectoryCache;
pub use error::{Error, Result};
pub use extract::{PACKAGE_EXTENSION, extract, extract_from_reader, output_root};
pub use options::{ExtractOptions, Progress};
pub use report::{ExtractReport, ExtractedAsset};
pub use sanitize::safe_join;

mod correlate;
mod dirs;
mod error;
mod extract;
pub mod options;
pub mod report;
mod sanitize;
