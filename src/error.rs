//! Error types for header reading and design generation.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the metadata reader and the design renderer can report.
///
/// Header-level failures (`Io`, `InvalidMagic`, `InvalidDimensions`) are
/// raised by the NIfTI parser and reach callers of the metadata functions
/// wrapped in [`Error::FileAccess`], so the offending path is always part of
/// the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid NIfTI magic bytes {0:?}")]
    InvalidMagic([u8; 4]),

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("cannot read NIfTI header from {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("{field} not present in header of {}", path.display())]
    NotFound { path: PathBuf, field: &'static str },

    #[error("{field} in {} must be finite and > 0, got {value}", path.display())]
    InvalidValue {
        path: PathBuf,
        field: &'static str,
        value: f64,
    },

    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
