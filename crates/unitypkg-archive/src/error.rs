use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the input file must end with .unitypackage: '{path}'")]
    InvalidExtension { path: PathBuf },

    #[error("malformed entry name '{entry}'; is this a valid Unity package file?")]
    MalformedEntry { entry: PathBuf },

    #[error("duplicate pathname record for guid '{guid}'")]
    DuplicatePathname { guid: String },

    #[error("duplicate asset record for guid '{guid}'")]
    DuplicateAsset { guid: String },

    #[error("unreadable pathname record for guid '{guid}'")]
    InvalidPathname { guid: String },

    #[error("invalid path '{path}'; it should be inside '{root}'")]
    PathEscape { path: PathBuf, root: PathBuf },

    #[error("refusing to overwrite existing file '{path}'")]
    Conflict { path: PathBuf },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to move '{from}' to '{to}': {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// True when the archive itself breaks the unitypackage layout.
    pub fn is_format_violation(&self) -> bool {
        matches!(
            self,
            Self::MalformedEntry { .. }
                | Self::DuplicatePathname { .. }
                | Self::DuplicateAsset { .. }
                | Self::InvalidPathname { .. }
                | Self::PathEscape { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
