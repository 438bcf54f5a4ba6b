//! Error types for the mapping compiler.

use std::path::PathBuf;

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling an icon table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upstream definition source matches neither known shape.
    ///
    /// Fatal: an unrecognized source would compile to a wrong or empty
    /// table and silently break every consumer downstream.
    #[error("Unrecognized upstream format: {message}")]
    FormatMismatch { message: String },

    /// A file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The curated manifest could not be parsed.
    #[error("Invalid curated manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The curated manifest parsed but is structurally unusable.
    #[error("Invalid curated manifest: {message}")]
    InvalidManifest { message: String },

    /// The produced table failed validation or serialization.
    #[error(transparent)]
    Table(#[from] horizon_emblem::Error),
}

impl Error {
    /// Create a format-mismatch error.
    pub fn format_mismatch(message: impl Into<String>) -> Self {
        Self::FormatMismatch {
            message: message.into(),
        }
    }

    /// Create an invalid-manifest error.
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }

    /// Create an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
