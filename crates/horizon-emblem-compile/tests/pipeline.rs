//! Full pipeline: compile an upstream fixture, ship the table as JSON,
//! and drive the runtime engine with it.

use std::fs;

use horizon_emblem::prelude::*;
use horizon_emblem_compile::{CuratedManifest, compile};

const UPSTREAM: &str = r#"
    { name: 'php', fileExtensions: ['php', 'phtml'], light: { name: 'php_light' } },
    { name: 'composer', fileNames: ['composer.json'] },
    { name: 'folder-src', folderNames: ['src'] },
    { id: 'twig', defaultExtension: 'twig' },
"#;

const CURATED: &str = r#"{
    "extensions": ["php", "twig"],
    "filenames": ["composer.json"],
    "folders": ["src"],
    "default_folder": "folder",
    "symlink": "symlink"
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn compiled_table_drives_the_engine() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    for id in ["php", "composer", "folder-src", "folder", "symlink", "twig"] {
        fs::write(dir.path().join(format!("{id}.svg")), format!("<svg id='{id}'/>")).unwrap();
    }

    let manifest = CuratedManifest::from_json(CURATED).unwrap();
    let (table, report) = compile(UPSTREAM, &manifest, dir.path()).unwrap();
    assert!(report.missing.is_empty());
    // "twig" arrived through the language supplement.
    assert_eq!(report.extensions, 2);

    // Ship and reload, as the runtime would.
    let table = IconTable::from_json(&table.to_json().unwrap()).unwrap();

    let doc = Document::new("body");
    let row = doc.create_element("div");
    doc.add_class(row, "row");
    let glyph = doc.create_element("span");
    doc.add_class(glyph, "row-glyph");
    let link = doc.create_element("a");
    doc.add_class(link, "row-link");
    doc.set_attribute(link, "href", "/acme/repo/blob/main/index.php");
    doc.set_text(link, "index.php");
    doc.append_child(doc.root(), row);
    doc.append_child(row, glyph);
    doc.append_child(row, link);
    let _ = doc.take_mutations();

    let mut engine = Engine::new(table);
    assert!(engine.attach(&doc));
    assert_eq!(engine.stats().injected, 1);

    let icon = doc.next_sibling(glyph).unwrap();
    let src = doc.attribute(icon, "src").unwrap();
    let expected = RenderableImage::from_bytes("image/svg+xml", b"<svg id='php'/>").data_uri();
    assert_eq!(src, expected);
}
