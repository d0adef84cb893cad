use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a shelter statistics table
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source file is absent
    #[error("data file not found: {0:?}")]
    NotFound(PathBuf),

    /// The header does not follow the two-row hierarchical convention,
    /// or a column the caller relies on is missing
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Map an IO error on `path`, turning "not found" into [`LoadError::NotFound`]
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.into())
        } else {
            LoadError::Io(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}
