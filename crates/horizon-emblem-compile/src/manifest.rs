//! Curated name manifest.
//!
//! The manifest lists which extensions, filenames, and folder names the
//! compiled table tracks. Changing it changes which icons get embedded,
//! never the resolution algorithm.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The curated list of tracked names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CuratedManifest {
    /// Tracked file extensions (stored and matched lowercase).
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Tracked exact filenames.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Tracked folder names.
    #[serde(default)]
    pub folders: Vec<String>,

    /// Icon id for files with no specific mapping.
    #[serde(default)]
    pub default_file: Option<String>,

    /// Icon id for folders with no specific mapping.
    #[serde(default)]
    pub default_folder: Option<String>,

    /// Icon id for symlinks. Required.
    pub symlink: String,
}

impl CuratedManifest {
    /// Parse a manifest from JSON text.
    ///
    /// The symlink icon id must be non-empty; the runtime rejects a
    /// compiled table without one, so the compiler refuses up front.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        if manifest.symlink.is_empty() {
            return Err(Error::invalid_manifest("symlink icon id is empty"));
        }
        Ok(manifest)
    }

    /// Load a manifest from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }
}
