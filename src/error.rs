//! Error types for the engine and the document loader.

use std::path::PathBuf;

use crate::parser::SourceFormat;

/// Caller-contract violations raised by the engine.
///
/// Data-shape anomalies (type changes, depth overflow) are never errors; they
/// come back as ordinary `Modified` records with a note.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias for engine results.
pub type DiffResult<T> = Result<T, DiffError>;

/// Errors raised while loading a document from disk.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("failed to read file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {format} syntax in file {}: {message}", .path.display())]
    Syntax {
        format: SourceFormat,
        path: PathBuf,
        message: String,
    },

    #[error("file {} must contain an object at root level", .0.display())]
    RootNotObject(PathBuf),
}
