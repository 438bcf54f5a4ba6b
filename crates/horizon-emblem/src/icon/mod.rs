//! Icon identity, image payloads, and name resolution.
//!
//! This module provides the compiled icon table and the resolution logic
//! that turns a filesystem name into a displayable image:
//!
//! - [`IconId`] and [`RenderableImage`]: identity and self-contained payload
//! - [`IconTable`]: the immutable name → icon mapping with inlined bitmaps
//! - [`IconResolver`]: a caching front over the table's pure lookup

mod image;
mod resolver;
mod table;

pub use image::{IconId, RenderableImage};
pub use resolver::IconResolver;
pub use table::IconTable;

/// Classification of a name-bearing entry on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A regular file; resolved through the filename/extension chain.
    File,
    /// A directory; resolved through the folder-name chain.
    Folder,
    /// A symbolic link; always resolved to the fixed symlink icon.
    Symlink,
}

impl PathKind {
    /// Get a short name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::Folder => "folder",
            PathKind::Symlink => "symlink",
        }
    }
}
