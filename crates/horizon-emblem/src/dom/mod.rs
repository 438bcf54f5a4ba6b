//! Retained element tree with a batched mutation journal.
//!
//! The hosting page owns this tree; the engine is one of several parties
//! reading and writing it. Structural changes (attach/detach) are recorded
//! in a journal that observers drain in batches, strictly after the
//! mutating code has finished — the engine never sees a change inline.

mod document;
mod mutation;

pub use document::{Document, NodeKey};
pub use mutation::MutationRecord;
