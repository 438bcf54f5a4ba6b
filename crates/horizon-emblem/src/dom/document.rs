//! Arena-backed element tree.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use slotmap::SlotMap;

use super::mutation::MutationRecord;

slotmap::new_key_type! {
    /// Stable key for an element in the document arena.
    pub struct NodeKey;
}

/// One element's data.
struct ElementData {
    tag: String,
    attributes: HashMap<String, String>,
    classes: Vec<String>,
    text: Option<String>,
    children: Vec<NodeKey>,
    parent: Option<NodeKey>,
}

impl ElementData {
    fn new(tag: String) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

/// Internal storage for the element tree.
struct DomStorage {
    nodes: SlotMap<NodeKey, ElementData>,
    root: NodeKey,
    journal: Vec<MutationRecord>,
    /// Roots of subtrees unrooted by `detach`, pending reclamation.
    detached: Vec<NodeKey>,
}

impl DomStorage {
    fn new(root_tag: String) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementData::new(root_tag));
        Self {
            nodes,
            root,
            journal: Vec::new(),
            detached: Vec::new(),
        }
    }

    fn connected(&self, mut node: NodeKey) -> bool {
        loop {
            if node == self.root {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn collect_preorder(&self, node: NodeKey, out: &mut Vec<NodeKey>) {
        if let Some(data) = self.nodes.get(node) {
            out.push(node);
            for &child in &data.children {
                self.collect_preorder(child, out);
            }
        }
    }

    fn attach(&mut self, parent: NodeKey, node: NodeKey, index: usize) -> bool {
        let attachable = self
            .nodes
            .get(node)
            .is_some_and(|n| n.parent.is_none() && node != self.root);
        if !attachable || parent == node || !self.nodes.contains_key(parent) {
            return false;
        }
        if let Some(data) = self.nodes.get_mut(node) {
            data.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, node);
        }
        self.journal.push(MutationRecord::added(parent, node));
        true
    }

    fn detach(&mut self, node: NodeKey) -> bool {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(data) = self.nodes.get_mut(node) {
            data.parent = None;
        }
        self.journal.push(MutationRecord::removed(parent, node));
        self.detached.push(node);
        true
    }

    fn collect_garbage(&mut self) -> usize {
        if self.detached.is_empty() {
            return 0;
        }
        let mut referenced: HashSet<NodeKey> = HashSet::new();
        for record in &self.journal {
            referenced.insert(record.parent);
            referenced.extend(&record.added);
            referenced.extend(&record.removed);
        }

        let queued = std::mem::take(&mut self.detached);
        let mut freed = 0;
        for node in queued {
            // Re-attached or already freed roots fall out of the queue.
            if !self.nodes.get(node).is_some_and(|n| n.parent.is_none()) {
                continue;
            }
            let mut subtree = Vec::new();
            self.collect_preorder(node, &mut subtree);
            if subtree.iter().any(|key| referenced.contains(key)) {
                // A pending record still names this subtree; retry after
                // the next drain.
                self.detached.push(node);
                continue;
            }
            for key in subtree {
                self.nodes.remove(key);
                freed += 1;
            }
        }
        freed
    }
}

/// A retained element tree with a batched mutation journal.
///
/// Nodes carry a tag, attributes, a class list, optional own text, and an
/// ordered child list. Detaching a subtree unroots it but keeps its nodes
/// alive so the drained records stay inspectable; once the records are
/// consumed, [`Document::collect_garbage`] reclaims the arena slots.
///
/// All methods take `&self`; storage is guarded internally so the host
/// page and the engine can share one handle on a single thread.
pub struct Document {
    storage: RwLock<DomStorage>,
}

impl Document {
    /// Create a document with a root element of the given tag.
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            storage: RwLock::new(DomStorage::new(root_tag.into())),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeKey {
        self.storage.read().root
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: impl Into<String>) -> NodeKey {
        self.storage.write().nodes.insert(ElementData::new(tag.into()))
    }

    /// Whether the node still exists in the arena (attached or not).
    pub fn exists(&self, node: NodeKey) -> bool {
        self.storage.read().nodes.contains_key(node)
    }

    /// Whether the node is reachable from the root.
    pub fn connected(&self, node: NodeKey) -> bool {
        self.storage.read().connected(node)
    }

    /// Append a detached node as the last child of `parent`.
    ///
    /// Returns `false` if either node is gone or the child is already
    /// attached.
    pub fn append_child(&self, parent: NodeKey, node: NodeKey) -> bool {
        let mut storage = self.storage.write();
        let index = storage
            .nodes
            .get(parent)
            .map(|p| p.children.len())
            .unwrap_or(0);
        storage.attach(parent, node, index)
    }

    /// Insert a detached node as the next sibling of `anchor`.
    pub fn insert_after(&self, anchor: NodeKey, node: NodeKey) -> bool {
        let mut storage = self.storage.write();
        let Some(parent) = storage.nodes.get(anchor).and_then(|n| n.parent) else {
            return false;
        };
        let Some(index) = storage
            .nodes
            .get(parent)
            .and_then(|p| p.children.iter().position(|&c| c == anchor))
        else {
            return false;
        };
        storage.attach(parent, node, index + 1)
    }

    /// Detach a node from its parent, keeping its subtree alive.
    pub fn detach(&self, node: NodeKey) -> bool {
        self.storage.write().detach(node)
    }

    /// The node's parent, if attached.
    pub fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.storage.read().nodes.get(node).and_then(|n| n.parent)
    }

    /// The node's children, in order.
    pub fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.storage
            .read()
            .nodes
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// The node's next sibling.
    pub fn next_sibling(&self, node: NodeKey) -> Option<NodeKey> {
        let storage = self.storage.read();
        let parent = storage.nodes.get(node)?.parent?;
        let siblings = &storage.nodes.get(parent)?.children;
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.get(index + 1).copied()
    }

    /// The node's tag.
    pub fn tag(&self, node: NodeKey) -> Option<String> {
        self.storage.read().nodes.get(node).map(|n| n.tag.clone())
    }

    /// Set an attribute.
    pub fn set_attribute(&self, node: NodeKey, name: impl Into<String>, value: impl Into<String>) {
        if let Some(data) = self.storage.write().nodes.get_mut(node) {
            data.attributes.insert(name.into(), value.into());
        }
    }

    /// Remove an attribute.
    pub fn remove_attribute(&self, node: NodeKey, name: &str) {
        if let Some(data) = self.storage.write().nodes.get_mut(node) {
            data.attributes.remove(name);
        }
    }

    /// Get an attribute value.
    pub fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.storage
            .read()
            .nodes
            .get(node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    /// Whether the node carries an attribute.
    pub fn has_attribute(&self, node: NodeKey, name: &str) -> bool {
        self.storage
            .read()
            .nodes
            .get(node)
            .is_some_and(|n| n.attributes.contains_key(name))
    }

    /// Add a class (no duplicates).
    pub fn add_class(&self, node: NodeKey, class: &str) {
        if let Some(data) = self.storage.write().nodes.get_mut(node)
            && !data.classes.iter().any(|c| c == class)
        {
            data.classes.push(class.to_string());
        }
    }

    /// Remove a class.
    pub fn remove_class(&self, node: NodeKey, class: &str) {
        if let Some(data) = self.storage.write().nodes.get_mut(node) {
            data.classes.retain(|c| c != class);
        }
    }

    /// Whether the node carries a class.
    pub fn has_class(&self, node: NodeKey, class: &str) -> bool {
        self.storage
            .read()
            .nodes
            .get(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Set the node's own text.
    pub fn set_text(&self, node: NodeKey, text: impl Into<String>) {
        if let Some(data) = self.storage.write().nodes.get_mut(node) {
            data.text = Some(text.into());
        }
    }

    /// The node's own text.
    pub fn text(&self, node: NodeKey) -> Option<String> {
        self.storage.read().nodes.get(node).and_then(|n| n.text.clone())
    }

    /// Concatenated own text of the subtree rooted at `node`, in preorder.
    pub fn subtree_text(&self, node: NodeKey) -> String {
        let storage = self.storage.read();
        let mut keys = Vec::new();
        storage.collect_preorder(node, &mut keys);
        let mut out = String::new();
        for key in keys {
            if let Some(text) = storage.nodes.get(key).and_then(|n| n.text.as_deref()) {
                out.push_str(text);
            }
        }
        out
    }

    /// All nodes of the subtree rooted at `node`, preorder, including
    /// `node` itself.
    pub fn descendants(&self, node: NodeKey) -> Vec<NodeKey> {
        let storage = self.storage.read();
        let mut out = Vec::new();
        storage.collect_preorder(node, &mut out);
        out
    }

    /// First node in the subtree (preorder) carrying the class.
    pub fn first_by_class(&self, scope: NodeKey, class: &str) -> Option<NodeKey> {
        let storage = self.storage.read();
        let mut keys = Vec::new();
        storage.collect_preorder(scope, &mut keys);
        keys.into_iter().find(|&key| {
            storage
                .nodes
                .get(key)
                .is_some_and(|n| n.classes.iter().any(|c| c == class))
        })
    }

    /// First node in the subtree (preorder) with the given tag.
    pub fn first_by_tag(&self, scope: NodeKey, tag: &str) -> Option<NodeKey> {
        let storage = self.storage.read();
        let mut keys = Vec::new();
        storage.collect_preorder(scope, &mut keys);
        keys.into_iter()
            .find(|&key| storage.nodes.get(key).is_some_and(|n| n.tag == tag))
    }

    /// Drain the accumulated mutation records.
    pub fn take_mutations(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.storage.write().journal)
    }

    /// Number of pending mutation records (for diagnostics).
    pub fn pending_mutations(&self) -> usize {
        self.storage.read().journal.len()
    }

    /// Free detached subtrees whose mutation records have been drained,
    /// returning the number of nodes reclaimed.
    ///
    /// A subtree still named by a pending record stays queued for the
    /// next sweep; a detached node that was re-attached in the meantime
    /// leaves the queue untouched.
    pub fn collect_garbage(&self) -> usize {
        self.storage.write().collect_garbage()
    }

    /// Immediately free a node that was created but never attached.
    ///
    /// Returns `false` when the node is attached, has children, or is
    /// named by a pending mutation record.
    pub fn discard(&self, node: NodeKey) -> bool {
        let mut storage = self.storage.write();
        if node == storage.root {
            return false;
        }
        let removable = storage
            .nodes
            .get(node)
            .is_some_and(|n| n.parent.is_none() && n.children.is_empty());
        if !removable {
            return false;
        }
        let referenced = storage.journal.iter().any(|record| {
            record.parent == node || record.added.contains(&node) || record.removed.contains(&node)
        });
        if referenced {
            return false;
        }
        storage.nodes.remove(node);
        storage.detached.retain(|&key| key != node);
        true
    }

    /// Number of live nodes in the arena (for diagnostics).
    pub fn node_count(&self) -> usize {
        self.storage.read().nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_connected() {
        let doc = Document::new("body");
        let child = doc.create_element("div");
        assert!(!doc.connected(child));

        assert!(doc.append_child(doc.root(), child));
        assert!(doc.connected(child));
        assert_eq!(doc.parent(child), Some(doc.root()));
    }

    #[test]
    fn test_insert_after_ordering() {
        let doc = Document::new("body");
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let c = doc.create_element("div");
        doc.append_child(doc.root(), a);
        doc.append_child(doc.root(), c);
        assert!(doc.insert_after(a, b));

        assert_eq!(doc.children(doc.root()), vec![a, b, c]);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), Some(c));
        assert_eq!(doc.next_sibling(c), None);
    }

    #[test]
    fn test_cannot_attach_twice() {
        let doc = Document::new("body");
        let a = doc.create_element("div");
        doc.append_child(doc.root(), a);
        assert!(!doc.append_child(doc.root(), a));
    }

    #[test]
    fn test_detach_keeps_subtree_alive() {
        let doc = Document::new("body");
        let row = doc.create_element("div");
        let link = doc.create_element("a");
        doc.append_child(doc.root(), row);
        doc.append_child(row, link);
        doc.set_text(link, "index.php");

        assert!(doc.detach(row));
        assert!(!doc.connected(row));
        assert!(!doc.connected(link));
        // Detached nodes remain inspectable.
        assert!(doc.exists(row));
        assert_eq!(doc.subtree_text(row), "index.php");
    }

    #[test]
    fn test_journal_records_batch() {
        let doc = Document::new("body");
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(doc.root(), a);
        doc.append_child(doc.root(), b);
        doc.detach(a);

        let records = doc.take_mutations();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].added, vec![a]);
        assert_eq!(records[2].removed, vec![a]);

        // Drained means drained.
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn test_collect_garbage_frees_drained_subtrees() {
        let doc = Document::new("body");
        let row = doc.create_element("div");
        let link = doc.create_element("a");
        doc.append_child(doc.root(), row);
        doc.append_child(row, link);
        let before = doc.node_count();

        doc.detach(row);
        // Pending records still name the subtree; it must survive.
        assert_eq!(doc.collect_garbage(), 0);
        assert!(doc.exists(row));

        let _ = doc.take_mutations();
        assert_eq!(doc.collect_garbage(), 2);
        assert!(!doc.exists(row));
        assert!(!doc.exists(link));
        assert_eq!(doc.node_count(), before - 2);
    }

    #[test]
    fn test_reattached_node_is_not_collected() {
        let doc = Document::new("body");
        let a = doc.create_element("div");
        doc.append_child(doc.root(), a);
        doc.detach(a);
        doc.append_child(doc.root(), a);
        let _ = doc.take_mutations();

        assert_eq!(doc.collect_garbage(), 0);
        assert!(doc.connected(a));
    }

    #[test]
    fn test_discard_frees_unattached_node() {
        let doc = Document::new("body");
        let node = doc.create_element("img");
        assert!(doc.discard(node));
        assert!(!doc.exists(node));

        let attached = doc.create_element("div");
        doc.append_child(doc.root(), attached);
        assert!(!doc.discard(attached));
        assert!(doc.exists(attached));
    }

    #[test]
    fn test_classes_and_attributes() {
        let doc = Document::new("body");
        let node = doc.create_element("span");
        doc.add_class(node, "glyph");
        doc.add_class(node, "glyph");
        doc.set_attribute(node, "href", "/tree/src");

        assert!(doc.has_class(node, "glyph"));
        assert_eq!(doc.attribute(node, "href").as_deref(), Some("/tree/src"));

        doc.remove_class(node, "glyph");
        doc.remove_attribute(node, "href");
        assert!(!doc.has_class(node, "glyph"));
        assert!(!doc.has_attribute(node, "href"));
    }

    #[test]
    fn test_first_by_class_preorder() {
        let doc = Document::new("body");
        let row = doc.create_element("div");
        let inner = doc.create_element("span");
        let glyph = doc.create_element("i");
        doc.append_child(doc.root(), row);
        doc.append_child(row, inner);
        doc.append_child(inner, glyph);
        doc.add_class(glyph, "row-glyph");

        assert_eq!(doc.first_by_class(row, "row-glyph"), Some(glyph));
        assert_eq!(doc.first_by_class(row, "missing"), None);
        assert_eq!(doc.first_by_tag(row, "i"), Some(glyph));
    }
}
