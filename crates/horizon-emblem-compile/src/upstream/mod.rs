//! Upstream icon-definition parsing.
//!
//! The upstream project has shipped its definitions in two shapes over
//! the years:
//!
//! - a structured JSON document with `fileExtensions` / `fileNames` /
//!   `folderNames` objects (and an optional `languages` array), and
//! - a source-code-embedded form, where each icon is an object literal
//!   like `{ name: 'php', fileExtensions: ['php', 'phtml'], ... }`
//!   inside a larger source file.
//!
//! [`parse_upstream`] probes both and fails with
//! [`Error::FormatMismatch`] when neither matches.

mod embedded;
mod structured;

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A language entry supplementing extension coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    /// Upstream language identifier.
    pub id: String,
    /// Representative file extension for the language.
    pub extension: String,
    /// Icon id the language maps to.
    pub icon: String,
}

/// The full upstream mapping before curation.
#[derive(Debug, Clone, Default)]
pub struct UpstreamMap {
    /// Extension (lowercase, no dot) to icon id.
    pub file_extensions: HashMap<String, String>,
    /// Exact filename to icon id.
    pub file_names: HashMap<String, String>,
    /// Folder name to icon id.
    pub folder_names: HashMap<String, String>,
    /// Language supplement records.
    pub languages: Vec<LanguageRecord>,
}

impl UpstreamMap {
    /// Whether the map carries no name entries at all.
    pub fn is_empty(&self) -> bool {
        self.file_extensions.is_empty()
            && self.file_names.is_empty()
            && self.folder_names.is_empty()
    }
}

/// Parse an upstream definition source of either known shape.
pub fn parse_upstream(source: &str) -> Result<UpstreamMap> {
    if let Some(map) = structured::parse(source) {
        tracing::debug!(
            extensions = map.file_extensions.len(),
            filenames = map.file_names.len(),
            folders = map.folder_names.len(),
            "parsed structured upstream source"
        );
        return Ok(map);
    }
    if let Some(map) = embedded::parse(source) {
        tracing::debug!(
            extensions = map.file_extensions.len(),
            filenames = map.file_names.len(),
            folders = map.folder_names.len(),
            "parsed embedded upstream source"
        );
        return Ok(map);
    }
    Err(Error::format_mismatch(
        "source is neither a structured definition document nor an embedded record listing",
    ))
}
