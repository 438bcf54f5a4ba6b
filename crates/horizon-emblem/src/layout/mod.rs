//! Layout adapters: classification of name-bearing page elements.
//!
//! Classification depends on structural and style-class conventions of an
//! external, uncontrolled page. Each supported layout is one
//! [`LayoutAdapter`] implementation, so new layouts can be added without
//! touching the reconciliation state machine:
//!
//! - [`RowListAdapter`]: row containers whose primary link target tells
//!   files from folders
//! - [`TreeViewAdapter`]: tree items whose glyph style class carries the
//!   kind directly

mod row_list;
mod tree_view;

pub use row_list::RowListAdapter;
pub use tree_view::TreeViewAdapter;

use crate::dom::{Document, NodeKey};
use crate::icon::PathKind;

/// One classified page entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The candidate container (row or tree item).
    pub container: NodeKey,
    /// The glyph element whose visual the engine replaces.
    pub slot: NodeKey,
    /// File, folder, or symlink.
    pub kind: PathKind,
    /// Display name to resolve. `None` means the entry must not be
    /// resolved by name and always gets the kind's default icon (the
    /// parent-directory row).
    pub name: Option<String>,
}

/// Classification capability for one page layout.
///
/// Implementations must be read-only over the document: a malformed
/// candidate yields `None` and is skipped, never an error.
pub trait LayoutAdapter: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &'static str;

    /// Whether `node` is a candidate container under this layout.
    fn is_candidate(&self, doc: &Document, node: NodeKey) -> bool;

    /// Classify a candidate container, extracting kind, name, and the
    /// glyph slot. Returns `None` for anything malformed or unrecognized.
    fn classify(&self, doc: &Document, node: NodeKey) -> Option<Candidate>;

    /// Enumerate candidate containers in the subtree rooted at `scope`.
    fn candidates(&self, doc: &Document, scope: NodeKey) -> Vec<NodeKey> {
        doc.descendants(scope)
            .into_iter()
            .filter(|&node| self.is_candidate(doc, node))
            .collect()
    }
}
