// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! The taxonomy is deliberate: only archive-level failures abort a run.
//! Everything else (a CSV without the expected header, a malformed
//! property line, a post-strip name collision) degrades gracefully so a
//! large export with a few odd files still converts.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("Unreadable archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry escapes the extraction root: {0}")]
    UnsafeArchivePath(String),

    #[error("Output directory {0} already exists and is not empty")]
    OutputDirNotEmpty(PathBuf),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {path}: {source}")]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk working tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to serialize frontmatter for {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize view definition for database '{name}': {source}")]
    ViewSerialize {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Allow converting from anyhow::Error, preserving the message
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias for convenience
#[allow(dead_code)]
pub type Result<T, E = AppError> = std::result::Result<T, E>;
