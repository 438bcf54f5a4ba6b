//! Language supplement.
//!
//! Upstream language entries carry a representative extension. They
//! widen extension coverage for names the direct tables never mention,
//! first-writer-wins: a direct extension entry always beats a language
//! entry, and an earlier language entry beats a later one.

use crate::upstream::UpstreamMap;

/// Fold the language records into the extension table.
pub fn apply_language_supplement(map: &mut UpstreamMap) {
    let records = std::mem::take(&mut map.languages);
    let mut supplemented = 0usize;
    for record in records {
        let extension = record.extension.to_lowercase();
        if extension.is_empty() || map.file_extensions.contains_key(&extension) {
            continue;
        }
        map.file_extensions.insert(extension, record.icon);
        supplemented += 1;
    }
    if supplemented > 0 {
        tracing::debug!(supplemented, "extended extension coverage from language records");
    }
}
