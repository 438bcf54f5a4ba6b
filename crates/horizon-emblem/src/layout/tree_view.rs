//! Tree-view layout adapter.
//!
//! Tree items carry class `tree-item`; the display name comes from a
//! nested `item-label` element and the kind from the style class on the
//! `item-glyph` element. Open and closed folder states classify
//! identically.

use super::{Candidate, LayoutAdapter};
use crate::dom::{Document, NodeKey};
use crate::icon::PathKind;

const ITEM_CLASS: &str = "tree-item";
const LABEL_CLASS: &str = "item-label";
const GLYPH_CLASS: &str = "item-glyph";
const GLYPH_FILE: &str = "glyph-file";
const GLYPH_DIR: &str = "glyph-dir";
const GLYPH_DIR_OPEN: &str = "glyph-dir-open";
const GLYPH_SYMLINK: &str = "glyph-symlink";

/// Adapter for the tree-view layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeViewAdapter;

impl LayoutAdapter for TreeViewAdapter {
    fn name(&self) -> &'static str {
        "tree-view"
    }

    fn is_candidate(&self, doc: &Document, node: NodeKey) -> bool {
        doc.has_class(node, ITEM_CLASS)
    }

    fn classify(&self, doc: &Document, node: NodeKey) -> Option<Candidate> {
        if !self.is_candidate(doc, node) {
            return None;
        }
        let slot = doc.first_by_class(node, GLYPH_CLASS)?;

        let kind = if doc.has_class(slot, GLYPH_SYMLINK) {
            PathKind::Symlink
        } else if doc.has_class(slot, GLYPH_DIR) || doc.has_class(slot, GLYPH_DIR_OPEN) {
            PathKind::Folder
        } else if doc.has_class(slot, GLYPH_FILE) {
            PathKind::File
        } else {
            return None;
        };

        let label = doc.first_by_class(node, LABEL_CLASS)?;
        let name = doc.subtree_text(label);
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Candidate {
            container: node,
            slot,
            kind,
            name: Some(name.to_string()),
        })
    }
}
