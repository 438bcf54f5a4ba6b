//! Source-code-embedded upstream shape.
//!
//! Each icon lives as an object literal inside a larger source file:
//!
//! ```text
//! { name: 'php', fileExtensions: ['php', 'phtml'], light: { name: 'php_light' } }
//! ```
//!
//! Records nest further object literals, so extraction walks the text
//! tracking brace depth and string quoting to find the true end of each
//! record; scanning to the first closing brace would truncate any record
//! with a nested object.

use std::sync::OnceLock;

use regex::Regex;

use super::{LanguageRecord, UpstreamMap};

fn record_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\s*(?:name|id)\s*:").unwrap())
}

fn name_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:name|id)\s*:\s*['"]([^'"]+)['"]"#).unwrap())
}

fn default_extension_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"defaultExtension\s*:\s*['"]([^'"]+)['"]"#).unwrap())
}

fn list_field(name: &str) -> Regex {
    Regex::new(&format!(r"{name}\s*:\s*\[([^\]]*)\]")).unwrap()
}

fn string_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap())
}

/// Try to parse the source as the embedded-record shape.
pub(super) fn parse(source: &str) -> Option<UpstreamMap> {
    let extensions_field = list_field("fileExtensions");
    let filenames_field = list_field("fileNames");
    let folders_field = list_field("folderNames");

    let mut map = UpstreamMap::default();
    let mut cursor = 0;
    while let Some(found) = record_start().find_at(source, cursor) {
        let Some(record) = record_text(&source[found.start()..]) else {
            // Unbalanced braces to end of input; nothing more to read.
            break;
        };
        cursor = found.start() + record.len();

        let Some(name) = capture(name_field(), record) else {
            continue;
        };

        for ext in list_items(&extensions_field, record) {
            map.file_extensions
                .entry(ext.to_lowercase())
                .or_insert_with(|| name.to_string());
        }
        for file in list_items(&filenames_field, record) {
            map.file_names
                .entry(file.to_string())
                .or_insert_with(|| name.to_string());
        }
        for folder in list_items(&folders_field, record) {
            map.folder_names
                .entry(folder.to_string())
                .or_insert_with(|| name.to_string());
        }
        if let Some(extension) = capture(default_extension_field(), record) {
            map.languages.push(LanguageRecord {
                id: name.to_string(),
                extension: extension.to_lowercase(),
                icon: name.to_string(),
            });
        }
    }

    if map.is_empty() && map.languages.is_empty() {
        return None;
    }
    Some(map)
}

/// The record text starting at an opening brace, up to and including its
/// matching closing brace.
fn record_text(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut string: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if let Some(quote) = string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                string = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => string = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=index]);
                }
            }
            _ => {}
        }
    }
    None
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text).map(|c| c.get(1).unwrap().as_str())
}

fn list_items<'a>(re: &Regex, text: &'a str) -> Vec<&'a str> {
    let Some(captures) = re.captures(text) else {
        return Vec::new();
    };
    let body = captures.get(1).unwrap().as_str();
    string_item()
        .captures_iter(body)
        .map(|c| c.get(1).unwrap().as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_object_does_not_truncate_record() {
        // A naive first-closing-brace scan would end this record at the
        // nested `light` object and lose the fileExtensions that follow.
        let source = r#"
            { name: 'php', light: { name: 'php_light', opacity: 0.5 }, fileExtensions: ['php'] },
            { name: 'rust', fileExtensions: ['rs'] },
        "#;
        let map = parse(source).unwrap();
        assert_eq!(map.file_extensions.get("php").map(String::as_str), Some("php"));
        assert_eq!(map.file_extensions.get("rs").map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let source = r#"{ name: 'tpl', description: 'expands {placeholders}', fileExtensions: ['tpl'] }"#;
        let map = parse(source).unwrap();
        assert_eq!(map.file_extensions.get("tpl").map(String::as_str), Some("tpl"));
    }

    #[test]
    fn test_first_record_wins_on_duplicate_extension() {
        let source = r#"
            { name: 'first', fileExtensions: ['x'] },
            { name: 'second', fileExtensions: ['x'] },
        "#;
        let map = parse(source).unwrap();
        assert_eq!(map.file_extensions.get("x").map(String::as_str), Some("first"));
    }

    #[test]
    fn test_folder_and_filename_records() {
        let source = r#"
            { name: 'src-folder', folderNames: ['src', 'source'] },
            { name: 'composer', fileNames: ["composer.json"] },
        "#;
        let map = parse(source).unwrap();
        assert_eq!(map.folder_names.len(), 2);
        assert_eq!(
            map.file_names.get("composer.json").map(String::as_str),
            Some("composer")
        );
    }

    #[test]
    fn test_language_records_are_collected() {
        let source = r#"
            { id: 'twig', defaultExtension: 'twig' },
            { name: 'php', fileExtensions: ['php'] },
        "#;
        let map = parse(source).unwrap();
        assert_eq!(map.languages.len(), 1);
        assert_eq!(map.languages[0].extension, "twig");
        assert_eq!(map.languages[0].icon, "twig");
    }

    #[test]
    fn test_plain_text_is_not_this_shape() {
        assert!(parse("no records here").is_none());
        assert!(parse("{ unbalanced: '").is_none());
    }
}
