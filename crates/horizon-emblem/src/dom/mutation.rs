//! Batched structural change records.

use super::document::NodeKey;

/// A structural change to one parent's child list.
///
/// Records accumulate in the document's journal as the tree is mutated and
/// are drained in batches via [`Document::take_mutations`]. Detached nodes
/// stay alive in the arena, so the nodes named in `removed` can still be
/// inspected after the fact — observers rely on this to recognize their
/// own marked elements being stripped.
///
/// [`Document::take_mutations`]: super::Document::take_mutations
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// Parent whose child list changed.
    pub parent: NodeKey,
    /// Nodes inserted under `parent`.
    pub added: Vec<NodeKey>,
    /// Nodes detached from `parent`.
    pub removed: Vec<NodeKey>,
}

impl MutationRecord {
    pub(crate) fn added(parent: NodeKey, node: NodeKey) -> Self {
        Self {
            parent,
            added: vec![node],
            removed: Vec::new(),
        }
    }

    pub(crate) fn removed(parent: NodeKey, node: NodeKey) -> Self {
        Self {
            parent,
            added: Vec::new(),
            removed: vec![node],
        }
    }
}
