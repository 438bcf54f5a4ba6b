//! Row-list layout adapter.
//!
//! The row list renders one container per entry:
//!
//! - container carries class `row`
//! - the primary link carries class `row-link`; its `href` tells files
//!   (`/blob/`) from folders (`/tree/`), and its text is the display name
//! - the glyph to replace carries class `row-glyph`
//! - the parent-directory row carries class `row-parent` (or renders the
//!   literal `..`) and never gets a name-based lookup
//!
//! The page collapses an intermediate single-child folder into one link
//! (`a/b`); only the first segment is looked up, as a folder.

use super::{Candidate, LayoutAdapter};
use crate::dom::{Document, NodeKey};
use crate::icon::PathKind;

const ROW_CLASS: &str = "row";
const ROW_PARENT_CLASS: &str = "row-parent";
const ROW_LINK_CLASS: &str = "row-link";
const ROW_GLYPH_CLASS: &str = "row-glyph";

/// Adapter for the row-list layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct RowListAdapter;

impl LayoutAdapter for RowListAdapter {
    fn name(&self) -> &'static str {
        "row-list"
    }

    fn is_candidate(&self, doc: &Document, node: NodeKey) -> bool {
        doc.has_class(node, ROW_CLASS)
    }

    fn classify(&self, doc: &Document, node: NodeKey) -> Option<Candidate> {
        if !self.is_candidate(doc, node) {
            return None;
        }
        let slot = doc.first_by_class(node, ROW_GLYPH_CLASS)?;

        if doc.has_class(node, ROW_PARENT_CLASS) {
            return Some(Candidate {
                container: node,
                slot,
                kind: PathKind::Folder,
                name: None,
            });
        }

        let link = doc.first_by_class(node, ROW_LINK_CLASS)?;
        let href = doc.attribute(link, "href")?;
        let kind = if href.contains("/blob/") {
            PathKind::File
        } else if href.contains("/tree/") {
            PathKind::Folder
        } else {
            return None;
        };

        let raw = doc.subtree_text(link);
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == ".." {
            // Parent row rendered without its marker class.
            return Some(Candidate {
                container: node,
                slot,
                kind: PathKind::Folder,
                name: None,
            });
        }

        // Collapsed intermediate path: only the leading folder is ours.
        let (kind, name) = match raw.split_once('/') {
            Some((first, _)) => (PathKind::Folder, first.to_string()),
            None => (kind, raw.to_string()),
        };

        Some(Candidate {
            container: node,
            slot,
            kind,
            name: Some(name),
        })
    }
}
