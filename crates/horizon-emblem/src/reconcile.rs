//! Injection and idempotent reconciliation.
//!
//! For every classified candidate the reconciler maintains one pairing:
//! the original glyph element (suppressed, never removed — third parties
//! key on its presence) and the injected replacement image (tagged with
//! the [`MARKER_ATTR`] attribute). Per original, the pairing moves through
//! three states:
//!
//! - *Unprocessed*: no pairing; resolving to no icon leaves it here
//! - *Processed*: original suppressed, replacement attached adjacent
//! - *Orphaned*: the page stripped the replacement while the original
//!   survived; repaired by re-attaching the same replacement
//!
//! A pairing whose original leaves the tree is discarded (and its
//! replacement detached so no injected element leaks); an equivalent
//! original appearing later starts over as unprocessed. Every step is
//! idempotent: running a pass twice on an unchanged tree changes nothing.

use std::collections::{HashMap, HashSet};

use crate::dom::{Document, MutationRecord, NodeKey};
use crate::icon::IconResolver;
use crate::layout::{Candidate, LayoutAdapter};

/// Attribute marking an injected replacement element.
pub const MARKER_ATTR: &str = "data-emblem";
/// Class suppressing an original glyph without removing it.
pub const HIDDEN_CLASS: &str = "emblem-hidden";
/// Class carried by injected replacement images.
pub const ICON_CLASS: &str = "emblem-icon";

/// One original ↔ replacement pairing.
#[derive(Debug, Clone, Copy)]
struct Tracked {
    injected: NodeKey,
}

/// Counters for one engine's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileStats {
    /// Pairings created.
    pub injected: u64,
    /// Orphaned replacements re-attached.
    pub repaired: u64,
    /// Replacements moved next to a re-wrapped original.
    pub relocated: u64,
    /// Candidates that resolved to no icon and were left untouched.
    pub skipped: u64,
}

/// The reconciliation state machine.
pub struct Reconciler {
    /// Pairings keyed by the original glyph's node.
    registry: HashMap<NodeKey, Tracked>,
    stats: ReconcileStats,
}

impl Reconciler {
    /// Create an empty reconciler.
    pub fn new() -> Self {
        Self {
            registry: HashMap::new(),
            stats: ReconcileStats::default(),
        }
    }

    /// Lifetime counters.
    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Number of live pairings.
    pub fn tracked_count(&self) -> usize {
        self.registry.len()
    }

    /// Reconcile every candidate under the document root.
    ///
    /// Used for the initial synchronous pass before any observer is
    /// attached, and safe to re-run at any time.
    pub fn full_pass(
        &mut self,
        doc: &Document,
        resolver: &mut IconResolver,
        adapters: &[Box<dyn LayoutAdapter>],
    ) {
        for adapter in adapters {
            for node in adapter.candidates(doc, doc.root()) {
                if let Some(candidate) = adapter.classify(doc, node) {
                    self.apply(doc, resolver, &candidate);
                }
            }
        }
        self.sweep_stale(doc);
    }

    /// Reconcile exactly the nodes implicated by one drained batch.
    ///
    /// Containers touched by several records are reconciled once. Each
    /// per-node step is isolated: a malformed node classifies to `None`
    /// and is skipped without aborting the batch.
    pub fn batch_pass(
        &mut self,
        doc: &Document,
        resolver: &mut IconResolver,
        adapters: &[Box<dyn LayoutAdapter>],
        records: &[MutationRecord],
    ) {
        let mut containers: HashSet<NodeKey> = HashSet::new();

        for record in records {
            for &added in &record.added {
                if !doc.connected(added) {
                    continue;
                }
                for adapter in adapters {
                    containers.extend(adapter.candidates(doc, added));
                }
                // The insertion may have landed inside an existing
                // candidate (a link or label swapped in place).
                if let Some(container) = self.enclosing_candidate(doc, adapters, added) {
                    containers.insert(container);
                }
            }
            for &removed in &record.removed {
                self.handle_removal(doc, removed);
            }
        }

        for container in containers {
            if !doc.connected(container) {
                continue;
            }
            for adapter in adapters {
                if let Some(candidate) = adapter.classify(doc, container) {
                    self.apply(doc, resolver, &candidate);
                    break;
                }
            }
        }

        self.sweep_stale(doc);
    }

    /// Reconcile one classified candidate.
    pub fn apply(&mut self, doc: &Document, resolver: &mut IconResolver, candidate: &Candidate) {
        if let Some(tracked) = self.registry.get(&candidate.slot).copied() {
            self.repair(doc, candidate.slot, tracked);
            return;
        }

        let uri = match &candidate.name {
            Some(name) => resolver
                .resolve(name, candidate.kind)
                .map(|image| image.data_uri()),
            None => resolver
                .table()
                .default_image(candidate.kind)
                .map(|image| image.data_uri()),
        };
        let Some(uri) = uri else {
            // No icon is an expected outcome; the page keeps its own
            // presentation.
            self.stats.skipped += 1;
            return;
        };

        let icon = doc.create_element("img");
        doc.set_attribute(icon, MARKER_ATTR, "1");
        doc.add_class(icon, ICON_CLASS);
        doc.set_attribute(icon, "src", &uri);

        // Suppression and insertion form one atomic step: never one
        // without the other.
        doc.add_class(candidate.slot, HIDDEN_CLASS);
        if !doc.insert_after(candidate.slot, icon) {
            doc.remove_class(candidate.slot, HIDDEN_CLASS);
            doc.discard(icon);
            self.stats.skipped += 1;
            return;
        }

        self.registry
            .insert(candidate.slot, Tracked { injected: icon });
        self.stats.injected += 1;
    }

    /// Restore an existing pairing to its processed shape.
    ///
    /// Covers the host toggling the original back visible (re-suppress
    /// only, never re-resolve), an orphaned replacement (re-attach the
    /// same node), and a re-wrapped original (relocate the replacement
    /// next to it, leaving the wrapper alone).
    fn repair(&mut self, doc: &Document, slot: NodeKey, tracked: Tracked) {
        if !doc.connected(slot) {
            return;
        }
        if !doc.has_class(slot, HIDDEN_CLASS) {
            doc.add_class(slot, HIDDEN_CLASS);
        }

        if doc.connected(tracked.injected) {
            if doc.next_sibling(slot) != Some(tracked.injected) {
                doc.detach(tracked.injected);
                if doc.insert_after(slot, tracked.injected) {
                    self.stats.relocated += 1;
                }
            }
        } else if doc.insert_after(slot, tracked.injected) {
            self.stats.repaired += 1;
        }
    }

    /// React to a detached subtree from a removal record.
    fn handle_removal(&mut self, doc: &Document, removed: NodeKey) {
        if !doc.exists(removed) {
            return;
        }
        for node in doc.descendants(removed) {
            if !doc.has_attribute(node, MARKER_ATTR) {
                continue;
            }
            let slot = self
                .registry
                .iter()
                .find(|(_, t)| t.injected == node)
                .map(|(&slot, _)| slot);
            if let Some(slot) = slot
                && doc.connected(slot)
            {
                let tracked = Tracked { injected: node };
                self.repair(doc, slot, tracked);
            }
            // Originals that left with the subtree are handled by the
            // stale sweep.
        }
    }

    /// Discard pairings whose original left the tree, detaching any
    /// replacement that would otherwise linger.
    fn sweep_stale(&mut self, doc: &Document) {
        let stale: Vec<NodeKey> = self
            .registry
            .keys()
            .copied()
            .filter(|&slot| !doc.connected(slot))
            .collect();
        for slot in stale {
            if let Some(tracked) = self.registry.remove(&slot) {
                if doc.connected(tracked.injected) {
                    doc.detach(tracked.injected);
                }
                tracing::debug!(?slot, "discarded stale pairing");
            }
        }
    }

    /// Nearest ancestor of `node` that any adapter recognizes as a
    /// candidate container.
    fn enclosing_candidate(
        &self,
        doc: &Document,
        adapters: &[Box<dyn LayoutAdapter>],
        node: NodeKey,
    ) -> Option<NodeKey> {
        let mut current = doc.parent(node);
        while let Some(ancestor) = current {
            if adapters.iter().any(|a| a.is_candidate(doc, ancestor)) {
                return Some(ancestor);
            }
            current = doc.parent(ancestor);
        }
        None
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::{IconId, IconTable, PathKind, RenderableImage};
    use crate::layout::{LayoutAdapter, RowListAdapter};

    fn adapters() -> Vec<Box<dyn LayoutAdapter>> {
        vec![Box::new(RowListAdapter)]
    }

    fn resolver() -> IconResolver {
        let table = IconTable::new(IconId::new("symlink"))
            .with_extension("php", IconId::new("php"))
            .with_image(
                IconId::new("php"),
                RenderableImage::from_bytes("image/svg+xml", b"<svg id='php'/>"),
            )
            .with_image(
                IconId::new("symlink"),
                RenderableImage::from_bytes("image/svg+xml", b"<svg id='ln'/>"),
            );
        IconResolver::new(table)
    }

    fn make_row(doc: &Document, href: &str, text: &str) -> (NodeKey, NodeKey) {
        let row = doc.create_element("div");
        doc.add_class(row, "row");
        let glyph = doc.create_element("span");
        doc.add_class(glyph, "row-glyph");
        let link = doc.create_element("a");
        doc.add_class(link, "row-link");
        doc.set_attribute(link, "href", href);
        doc.set_text(link, text);
        doc.append_child(doc.root(), row);
        doc.append_child(row, glyph);
        doc.append_child(row, link);
        (row, glyph)
    }

    fn injected_nodes(doc: &Document) -> Vec<NodeKey> {
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.has_attribute(n, MARKER_ATTR))
            .collect()
    }

    #[test]
    fn test_inject_suppresses_and_marks() {
        let doc = Document::new("body");
        let (_, glyph) = make_row(&doc, "/r/blob/m/index.php", "index.php");

        let mut rec = Reconciler::new();
        rec.full_pass(&doc, &mut resolver(), &adapters());

        assert!(doc.has_class(glyph, HIDDEN_CLASS));
        let injected = injected_nodes(&doc);
        assert_eq!(injected.len(), 1);
        assert_eq!(doc.next_sibling(glyph), Some(injected[0]));
        assert!(doc
            .attribute(injected[0], "src")
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_full_pass_is_idempotent() {
        let doc = Document::new("body");
        make_row(&doc, "/r/blob/m/index.php", "index.php");

        let mut rec = Reconciler::new();
        let mut res = resolver();
        rec.full_pass(&doc, &mut res, &adapters());
        rec.full_pass(&doc, &mut res, &adapters());

        assert_eq!(injected_nodes(&doc).len(), 1);
        assert_eq!(rec.stats().injected, 1);
    }

    #[test]
    fn test_unresolved_leaves_page_untouched() {
        let doc = Document::new("body");
        let (_, glyph) = make_row(&doc, "/r/blob/m/unknown.zzz", "unknown.zzz");

        let mut rec = Reconciler::new();
        rec.full_pass(&doc, &mut resolver(), &adapters());

        assert!(!doc.has_class(glyph, HIDDEN_CLASS));
        assert!(injected_nodes(&doc).is_empty());
        assert_eq!(rec.stats().skipped, 1);
        assert_eq!(rec.tracked_count(), 0);
    }

    #[test]
    fn test_orphan_repair_restores_exactly_one() {
        let doc = Document::new("body");
        let (_, glyph) = make_row(&doc, "/r/blob/m/index.php", "index.php");

        let mut rec = Reconciler::new();
        let mut res = resolver();
        rec.full_pass(&doc, &mut res, &adapters());
        let _ = doc.take_mutations();

        let injected = injected_nodes(&doc)[0];
        doc.detach(injected);
        let records = doc.take_mutations();

        rec.batch_pass(&doc, &mut res, &adapters(), &records);

        let after = injected_nodes(&doc);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0], injected);
        assert_eq!(doc.next_sibling(glyph), Some(injected));
        assert_eq!(rec.stats().repaired, 1);

        // A second pass over nothing changes nothing.
        rec.batch_pass(&doc, &mut res, &adapters(), &doc.take_mutations());
        assert_eq!(injected_nodes(&doc).len(), 1);
    }

    #[test]
    fn test_toggled_original_is_resuppressed_not_reclassified() {
        let doc = Document::new("body");
        let (row, glyph) = make_row(&doc, "/r/blob/m/index.php", "index.php");

        let mut rec = Reconciler::new();
        let mut res = resolver();
        rec.full_pass(&doc, &mut res, &adapters());
        let _ = doc.take_mutations();
        let injected = injected_nodes(&doc)[0];

        // Host script flips the original visible again.
        doc.remove_class(glyph, HIDDEN_CLASS);

        // Re-reconciling the row re-suppresses without a second insertion.
        let cand = RowListAdapter.classify(&doc, row).unwrap();
        rec.apply(&doc, &mut res, &cand);

        assert!(doc.has_class(glyph, HIDDEN_CLASS));
        assert_eq!(injected_nodes(&doc), vec![injected]);
        assert_eq!(rec.stats().injected, 1);
    }

    #[test]
    fn test_rewrap_relocates_replacement() {
        let doc = Document::new("body");
        let (row, glyph) = make_row(&doc, "/r/blob/m/index.php", "index.php");

        let mut rec = Reconciler::new();
        let mut res = resolver();
        rec.full_pass(&doc, &mut res, &adapters());
        let _ = doc.take_mutations();
        let injected = injected_nodes(&doc)[0];

        // Another extension wraps the original glyph in an anchor.
        let wrapper = doc.create_element("a");
        doc.set_attribute(wrapper, "href", "/edit/index.php");
        doc.detach(glyph);
        doc.append_child(row, wrapper);
        doc.append_child(wrapper, glyph);
        let records = doc.take_mutations();

        rec.batch_pass(&doc, &mut res, &adapters(), &records);

        // Exactly one replacement, adjacent to the original, inside the
        // wrapper; the wrapper itself is untouched.
        assert_eq!(injected_nodes(&doc), vec![injected]);
        assert_eq!(doc.next_sibling(glyph), Some(injected));
        assert_eq!(doc.parent(injected), Some(wrapper));
        assert!(doc.connected(wrapper));
        assert_eq!(rec.stats().relocated, 1);
    }

    #[test]
    fn test_removed_original_discards_pairing() {
        let doc = Document::new("body");
        let (row, _) = make_row(&doc, "/r/blob/m/index.php", "index.php");

        let mut rec = Reconciler::new();
        let mut res = resolver();
        rec.full_pass(&doc, &mut res, &adapters());
        let _ = doc.take_mutations();
        assert_eq!(rec.tracked_count(), 1);

        // Page replaces the whole row; the injected node goes with it.
        doc.detach(row);
        let records = doc.take_mutations();
        rec.batch_pass(&doc, &mut res, &adapters(), &records);

        assert_eq!(rec.tracked_count(), 0);
        assert!(injected_nodes(&doc).is_empty());

        // An equivalent row appearing later starts over.
        make_row(&doc, "/r/blob/m/index.php", "index.php");
        let records = doc.take_mutations();
        rec.batch_pass(&doc, &mut res, &adapters(), &records);
        assert_eq!(rec.tracked_count(), 1);
        assert_eq!(injected_nodes(&doc).len(), 1);
    }

    #[test]
    fn test_failed_insertion_rolls_back_and_frees_the_icon() {
        let doc = Document::new("body");
        // A slot with no parent makes the adjacent insertion fail.
        let slot = doc.create_element("span");
        let candidate = Candidate {
            container: slot,
            slot,
            kind: PathKind::File,
            name: Some("index.php".to_string()),
        };

        let mut rec = Reconciler::new();
        let before = doc.node_count();
        rec.apply(&doc, &mut resolver(), &candidate);

        // Suppression rolled back, and the created image was freed.
        assert!(!doc.has_class(slot, HIDDEN_CLASS));
        assert_eq!(doc.node_count(), before);
        assert_eq!(rec.stats().skipped, 1);
        assert_eq!(rec.tracked_count(), 0);
    }

    #[test]
    fn test_batch_deduplicates_containers() {
        let doc = Document::new("body");
        let (row, _) = make_row(&doc, "/r/blob/m/index.php", "index.php");

        // Two records both implicating the same row.
        let extra = doc.create_element("span");
        doc.append_child(row, extra);
        let extra2 = doc.create_element("span");
        doc.append_child(row, extra2);
        let records = doc.take_mutations();
        assert!(records.len() >= 2);

        let mut rec = Reconciler::new();
        rec.batch_pass(&doc, &mut resolver(), &adapters(), &records);

        assert_eq!(injected_nodes(&doc).len(), 1);
        assert_eq!(rec.stats().injected, 1);
    }
}
