//! Structured (plain JSON document) upstream shape.

use serde_json::Value;

use super::{LanguageRecord, UpstreamMap};

/// Try to parse the source as the structured JSON shape.
///
/// Returns `None` when the source is not JSON or carries none of the
/// mapping objects, so the caller can fall through to the embedded
/// parser.
pub(super) fn parse(source: &str) -> Option<UpstreamMap> {
    let value: Value = serde_json::from_str(source).ok()?;
    let root = value.as_object()?;

    let mut map = UpstreamMap::default();
    collect_string_map(root.get("fileExtensions"), |k, v| {
        map.file_extensions.insert(k.to_lowercase(), v);
    });
    collect_string_map(root.get("fileNames"), |k, v| {
        map.file_names.insert(k.to_string(), v);
    });
    collect_string_map(root.get("folderNames"), |k, v| {
        map.folder_names.insert(k.to_string(), v);
    });

    if let Some(languages) = root.get("languages").and_then(Value::as_array) {
        for entry in languages {
            if let Some(record) = language_record(entry) {
                map.languages.push(record);
            }
        }
    }

    if map.is_empty() {
        return None;
    }
    Some(map)
}

fn collect_string_map(value: Option<&Value>, mut insert: impl FnMut(&str, String)) {
    if let Some(object) = value.and_then(Value::as_object) {
        for (key, value) in object {
            if let Some(icon) = value.as_str() {
                insert(key, icon.to_string());
            }
        }
    }
}

fn language_record(entry: &Value) -> Option<LanguageRecord> {
    let object = entry.as_object()?;
    let id = object.get("id")?.as_str()?;
    let extension = object.get("extension")?.as_str()?;
    let icon = object.get("icon")?.as_str()?;
    Some(LanguageRecord {
        id: id.to_string(),
        extension: extension.to_lowercase(),
        icon: icon.to_string(),
    })
}
