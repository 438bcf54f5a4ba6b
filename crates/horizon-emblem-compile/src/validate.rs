//! Coverage validation.
//!
//! Upstream entry counts drift between releases, so low counts are
//! telemetry, never a build failure. The thresholds reflect the smallest
//! release observed to date, rounded down.

use crate::upstream::UpstreamMap;

const MIN_EXTENSIONS: usize = 50;
const MIN_FILENAMES: usize = 20;
const MIN_FOLDERS: usize = 10;

/// Check entry counts against the expected minimums.
///
/// Emits a `tracing::warn!` per shortfall and returns the warning
/// messages so callers and tests can inspect them.
pub fn validate_coverage(map: &UpstreamMap) -> Vec<String> {
    let checks = [
        ("extensions", map.file_extensions.len(), MIN_EXTENSIONS),
        ("filenames", map.file_names.len(), MIN_FILENAMES),
        ("folders", map.folder_names.len(), MIN_FOLDERS),
    ];

    let mut warnings = Vec::new();
    for (label, count, minimum) in checks {
        if count < minimum {
            let message = format!("upstream {label} count {count} below expected minimum {minimum}");
            tracing::warn!(label, count, minimum, "low upstream coverage");
            warnings.push(message);
        }
    }
    warnings
}
