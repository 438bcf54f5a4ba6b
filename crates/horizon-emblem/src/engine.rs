//! Engine orchestration: startup ordering, conflict detection, pumping.

use std::time::Duration;

use crate::dom::Document;
use crate::icon::{IconResolver, IconTable};
use crate::layout::{LayoutAdapter, RowListAdapter, TreeViewAdapter};
use crate::reconcile::{ReconcileStats, Reconciler};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Delay the host should apply before calling [`Engine::attach`].
    ///
    /// A heuristic to let the page's own initial script finish rendering,
    /// not a correctness guarantee: reconciliation is idempotent and will
    /// converge regardless of when the first pass runs.
    pub startup_delay: Duration,

    /// Attribute name on the root element signalling that another
    /// same-purpose extension is already active. When present the engine
    /// self-disables entirely.
    pub conflict_marker: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_millis(100),
            conflict_marker: "data-emblem-extension".to_string(),
        }
    }
}

impl EngineOptions {
    /// Set the startup delay.
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Set the conflict marker attribute name.
    pub fn with_conflict_marker(mut self, attr: impl Into<String>) -> Self {
        self.conflict_marker = attr.into();
        self
    }
}

/// The live resolution and injection engine.
///
/// Single-threaded and cooperative: all work happens synchronously inside
/// [`Engine::attach`] and [`Engine::pump`], which the host calls from its
/// own event loop. The engine holds no locks across calls and relies on
/// idempotent reconciliation rather than mutual exclusion.
pub struct Engine {
    resolver: IconResolver,
    adapters: Vec<Box<dyn LayoutAdapter>>,
    reconciler: Reconciler,
    options: EngineOptions,
    observing: bool,
    disabled: bool,
}

impl Engine {
    /// Create an engine with default options and the two built-in layout
    /// adapters (row list, tree view).
    pub fn new(table: IconTable) -> Self {
        Self::with_options(table, EngineOptions::default())
    }

    /// Create an engine with explicit options.
    pub fn with_options(table: IconTable, options: EngineOptions) -> Self {
        Self {
            resolver: IconResolver::new(table),
            adapters: vec![Box::new(RowListAdapter), Box::new(TreeViewAdapter)],
            reconciler: Reconciler::new(),
            options,
            observing: false,
            disabled: false,
        }
    }

    /// Register an additional layout adapter.
    pub fn add_adapter(&mut self, adapter: Box<dyn LayoutAdapter>) {
        self.adapters.push(adapter);
    }

    /// Engine configuration.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Whether the engine self-disabled due to a conflicting extension.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether [`Engine::attach`] has completed.
    pub fn is_attached(&self) -> bool {
        self.observing
    }

    /// Reconciliation counters.
    pub fn stats(&self) -> ReconcileStats {
        self.reconciler.stats()
    }

    /// Run the initial synchronous pass and start observing.
    ///
    /// Returns `false` (taking no DOM action) when the conflict marker is
    /// present. The initial pass runs before any mutation records are
    /// consumed, and the records produced by its own insertions are
    /// dropped so the first [`Engine::pump`] does not re-process them as
    /// external changes.
    pub fn attach(&mut self, doc: &Document) -> bool {
        if self.disabled {
            return false;
        }
        if self.observing {
            return true;
        }

        if doc.has_attribute(doc.root(), &self.options.conflict_marker) {
            tracing::info!(
                marker = %self.options.conflict_marker,
                "conflicting icon extension detected; engine disabled"
            );
            self.disabled = true;
            return false;
        }

        self.reconciler
            .full_pass(doc, &mut self.resolver, &self.adapters);
        let own = doc.take_mutations();
        doc.collect_garbage();
        tracing::debug!(
            insertions = own.len(),
            tracked = self.reconciler.tracked_count(),
            "initial pass complete"
        );

        self.observing = true;
        true
    }

    /// Drain the document's mutation journal and reconcile one batch.
    ///
    /// Must never surface a failure to the host: per-node problems are
    /// skipped inside the reconciler, and an engine that is disabled or
    /// not yet attached does nothing.
    pub fn pump(&mut self, doc: &Document) {
        if self.disabled || !self.observing {
            return;
        }

        let records = doc.take_mutations();
        if records.is_empty() {
            return;
        }

        self.reconciler
            .batch_pass(doc, &mut self.resolver, &self.adapters, &records);

        // Repairs journal their own insertions; nothing external ran
        // during the pass, so these are safe to drop.
        let _ = doc.take_mutations();
        let freed = doc.collect_garbage();

        let stats = self.reconciler.stats();
        tracing::trace!(
            records = records.len(),
            injected = stats.injected,
            repaired = stats.repaired,
            freed,
            "batch reconciled"
        );
    }
}
