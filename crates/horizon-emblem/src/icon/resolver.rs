//! Icon resolution with caching.
//!
//! The table's lookup chain is cheap but runs on every reconciliation pass
//! for every visible row, so the engine fronts it with a bounded
//! `(name, kind)` cache. Negative results are cached too.

use std::collections::HashMap;

use super::image::{IconId, RenderableImage};
use super::table::IconTable;
use super::PathKind;

/// Cache key for resolved names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    name: String,
    kind: PathKind,
}

/// Cached resolution result.
#[derive(Debug, Clone)]
enum CacheEntry {
    /// Resolved to this icon id
    Found(IconId),
    /// No icon for this name
    NotFound,
}

/// Caching front over an [`IconTable`].
///
/// Resolution results are identical to [`IconTable::resolve`]; the cache
/// only changes the cost, never the outcome.
#[derive(Debug)]
pub struct IconResolver {
    table: IconTable,
    cache: HashMap<CacheKey, CacheEntry>,
    cache_limit: usize,
}

impl IconResolver {
    /// Create a resolver owning the compiled table.
    pub fn new(table: IconTable) -> Self {
        Self {
            table,
            cache: HashMap::new(),
            cache_limit: 1024,
        }
    }

    /// Get the underlying table.
    pub fn table(&self) -> &IconTable {
        &self.table
    }

    /// Clear the resolution cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Set the cache limit.
    pub fn set_cache_limit(&mut self, limit: usize) {
        self.cache_limit = limit;
        while self.cache.len() > self.cache_limit {
            // Remove arbitrary entry (HashMap doesn't preserve order)
            if let Some(key) = self.cache.keys().next().cloned() {
                self.cache.remove(&key);
            }
        }
    }

    /// Resolve a name to a displayable image, consulting the cache first.
    pub fn resolve(&mut self, name: &str, kind: PathKind) -> Option<&RenderableImage> {
        let key = CacheKey {
            name: name.to_string(),
            kind,
        };

        if let Some(entry) = self.cache.get(&key) {
            return match entry {
                CacheEntry::Found(id) => self.table.image(id),
                CacheEntry::NotFound => None,
            };
        }

        let resolved = self.table.resolve_id(name, kind).cloned();

        if self.cache.len() < self.cache_limit {
            let entry = match &resolved {
                Some(id) => CacheEntry::Found(id.clone()),
                None => CacheEntry::NotFound,
            };
            self.cache.insert(key, entry);
        }

        match resolved {
            Some(id) => {
                let image = self.table.image(&id);
                if image.is_none() {
                    tracing::debug!(icon = id.as_str(), name, "resolved icon has no image payload");
                }
                image
            }
            None => None,
        }
    }
}
