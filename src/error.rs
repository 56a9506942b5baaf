//! Error types for imagesort

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for imagesort operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imagesort
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("{inner} is a subdirectory of {outer}")]
    NestedDirectory { inner: PathBuf, outer: PathBuf },

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compare {src} with {existing}: {source}")]
    Compare {
        src: PathBuf,
        existing: PathBuf,
        source: std::io::Error,
    },

    #[error("{label} {src} to {dest} failed: {source}")]
    Operation {
        label: &'static str,
        src: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    #[error("No free file name left for {path}")]
    SuffixExhausted { path: PathBuf },

    #[error("Operation '{0}' is not supported on this platform")]
    UnsupportedOperation(&'static str),
}
