//! The compiled icon table and its resolution chain.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::image::{IconId, RenderableImage};
use super::PathKind;

/// Immutable name → icon mapping with inlined image payloads.
///
/// Built once by the mapping compiler and read-only thereafter; the engine
/// receives it by reference rather than through any global. Resolution via
/// [`IconTable::resolve`] is pure: the same `(name, kind)` always yields
/// the same result regardless of call order.
///
/// Extension keys are stored lowercase; extension probes are lowercased at
/// lookup time. Exact filename and folder matches are case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconTable {
    extensions: HashMap<String, IconId>,
    filenames: HashMap<String, IconId>,
    folders: HashMap<String, IconId>,
    #[serde(default)]
    default_file: Option<IconId>,
    #[serde(default)]
    default_folder: Option<IconId>,
    symlink: IconId,
    images: HashMap<IconId, RenderableImage>,
}

impl IconTable {
    /// Create an empty table with the fixed symlink icon.
    pub fn new(symlink: IconId) -> Self {
        Self {
            extensions: HashMap::new(),
            filenames: HashMap::new(),
            folders: HashMap::new(),
            default_file: None,
            default_folder: None,
            symlink,
            images: HashMap::new(),
        }
    }

    /// Add an extension mapping. The key is normalized to lowercase.
    pub fn with_extension(mut self, ext: impl Into<String>, icon: IconId) -> Self {
        self.extensions.insert(ext.into().to_ascii_lowercase(), icon);
        self
    }

    /// Add an exact-filename mapping (case-sensitive).
    pub fn with_filename(mut self, name: impl Into<String>, icon: IconId) -> Self {
        self.filenames.insert(name.into(), icon);
        self
    }

    /// Add a folder-name mapping (case-sensitive).
    pub fn with_folder(mut self, name: impl Into<String>, icon: IconId) -> Self {
        self.folders.insert(name.into(), icon);
        self
    }

    /// Set the default file icon.
    pub fn with_default_file(mut self, icon: IconId) -> Self {
        self.default_file = Some(icon);
        self
    }

    /// Set the default folder icon.
    pub fn with_default_folder(mut self, icon: IconId) -> Self {
        self.default_folder = Some(icon);
        self
    }

    /// Add an image payload for an icon id.
    pub fn with_image(mut self, icon: IconId, image: RenderableImage) -> Self {
        self.images.insert(icon, image);
        self
    }

    /// Deserialize a table from JSON, validating its shape and that every
    /// inlined payload decodes.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        if table.symlink.is_empty() {
            return Err(crate::Error::invalid_table("symlink icon id is empty"));
        }
        for (id, image) in &table.images {
            if let Err(e) = image.decode() {
                return Err(crate::Error::payload(id.as_str(), e));
            }
        }
        Ok(table)
    }

    /// Serialize the table to JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of extension entries.
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Number of exact-filename entries.
    pub fn filename_count(&self) -> usize {
        self.filenames.len()
    }

    /// Number of folder entries.
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// The fixed symlink icon id.
    pub fn symlink_id(&self) -> &IconId {
        &self.symlink
    }

    /// Get the image payload for an icon id.
    pub fn image(&self, icon: &IconId) -> Option<&RenderableImage> {
        self.images.get(icon)
    }

    /// The default image for a kind, bypassing name lookup.
    ///
    /// Used for entries that must not be resolved by name, such as the
    /// parent-directory row.
    pub fn default_image(&self, kind: PathKind) -> Option<&RenderableImage> {
        let id = match kind {
            PathKind::File => self.default_file.as_ref()?,
            PathKind::Folder => self.default_folder.as_ref()?,
            PathKind::Symlink => &self.symlink,
        };
        self.images.get(id)
    }

    /// Resolve a name to an icon id without touching the image store.
    ///
    /// Returns `None` when no entry and no default applies; the caller must
    /// then leave the page's own presentation untouched.
    pub fn resolve_id(&self, name: &str, kind: PathKind) -> Option<&IconId> {
        match kind {
            PathKind::Symlink => Some(&self.symlink),
            PathKind::Folder => self.resolve_folder(name),
            PathKind::File => self.resolve_file(name),
        }
    }

    /// Resolve a name to a displayable image.
    ///
    /// Same chain as [`IconTable::resolve_id`]; additionally treats an icon
    /// id with no inlined payload as unresolved (non-fatal, logged at
    /// debug).
    pub fn resolve(&self, name: &str, kind: PathKind) -> Option<&RenderableImage> {
        let id = self.resolve_id(name, kind)?;
        match self.images.get(id) {
            Some(image) => Some(image),
            None => {
                tracing::debug!(icon = id.as_str(), name, "resolved icon has no image payload");
                None
            }
        }
    }

    fn resolve_folder(&self, name: &str) -> Option<&IconId> {
        if let Some(id) = self.folders.get(name) {
            return Some(id);
        }
        // Hidden folders with no direct entry resolve like their unprefixed
        // name: `.github` falls back to `github`. Only one marker is
        // stripped.
        if let Some(stripped) = name.strip_prefix('.')
            && !stripped.is_empty()
            && let Some(id) = self.folders.get(stripped)
        {
            return Some(id);
        }
        self.default_folder.as_ref()
    }

    fn resolve_file(&self, name: &str) -> Option<&IconId> {
        if let Some(id) = self.filenames.get(name) {
            return Some(id);
        }

        let segments: Vec<&str> = name.split('.').collect();
        if segments.len() >= 2 {
            // Trailing qualifier suffixes: `phpunit.xml.dist` retries as
            // `phpunit.xml` before any extension step.
            let stem = segments[..segments.len() - 1].join(".");
            if let Some(id) = self.filenames.get(stem.as_str()) {
                return Some(id);
            }

            // `base.ext.suffix` resolves on `ext` first, then on the final
            // segment for the plain `base.ext` shape.
            let penultimate = segments[segments.len() - 2].to_ascii_lowercase();
            if let Some(id) = self.extensions.get(&penultimate) {
                return Some(id);
            }
            let last = segments[segments.len() - 1].to_ascii_lowercase();
            if let Some(id) = self.extensions.get(&last) {
                return Some(id);
            }
        }

        self.default_file.as_ref()
    }
}
