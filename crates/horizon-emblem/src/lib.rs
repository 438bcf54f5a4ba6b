//! Live file-type icon badging for externally owned element trees.
//!
//! This crate resolves filesystem names to icons and keeps the resolved
//! icons injected into a page that is rewritten out-of-band by its own
//! scripts. It provides:
//!
//! - **Icon resolution**: a pure, deterministic fallback chain from a name
//!   and kind (file, folder, symlink) to a self-contained image payload
//! - **Layout adapters**: pluggable classification for the two supported
//!   page layouts (row list and tree view)
//! - **Reconciliation**: an idempotent state machine that suppresses the
//!   original glyph, injects a marked replacement, and repairs the pair
//!   when the host page or another extension disturbs it
//! - **Engine**: single-threaded orchestration driven by batched mutation
//!   records drained from the document's journal
//!
//! # Example
//!
//! ```ignore
//! use horizon_emblem::prelude::*;
//!
//! let table = IconTable::from_json(&table_json)?;
//! let mut engine = Engine::new(table);
//!
//! if engine.attach(&document) {
//!     // after each batch of host-page mutations:
//!     engine.pump(&document);
//! }
//! ```

pub mod dom;
pub mod icon;
pub mod layout;
pub mod reconcile;

mod engine;
mod error;

pub use engine::{Engine, EngineOptions};
pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::dom::{Document, MutationRecord, NodeKey};
    pub use crate::engine::{Engine, EngineOptions};
    pub use crate::icon::{IconId, IconResolver, IconTable, PathKind, RenderableImage};
    pub use crate::layout::{Candidate, LayoutAdapter, RowListAdapter, TreeViewAdapter};
    pub use crate::reconcile::{ReconcileStats, Reconciler};
}
