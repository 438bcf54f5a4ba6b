//! Table assembly: curation, bitmap inlining, reporting.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use horizon_emblem::icon::{IconId, IconTable, RenderableImage};

use crate::error::{Error, Result};
use crate::languages::apply_language_supplement;
use crate::manifest::CuratedManifest;
use crate::upstream::parse_upstream;
use crate::validate::validate_coverage;

/// Summary of one compile run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Extension entries in the compiled table.
    pub extensions: usize,
    /// Filename entries in the compiled table.
    pub filenames: usize,
    /// Folder entries in the compiled table.
    pub folders: usize,
    /// Icon ids selected by the curation step but lacking a bitmap asset.
    pub missing: Vec<IconId>,
    /// Non-fatal coverage warnings from upstream validation.
    pub warnings: Vec<String>,
}

/// Compile an icon table from an upstream source, a curated manifest,
/// and a directory of bitmap assets (`<id>.svg` or `<id>.png`).
///
/// An unrecognized upstream shape is fatal; a curated name the upstream
/// does not know, or a selected icon with no asset on disk, is reported
/// and logged but never fails the build.
pub fn compile(
    upstream_source: &str,
    manifest: &CuratedManifest,
    asset_dir: impl AsRef<Path>,
) -> Result<(IconTable, BuildReport)> {
    let mut upstream = parse_upstream(upstream_source)?;
    apply_language_supplement(&mut upstream);

    let mut report = BuildReport {
        warnings: validate_coverage(&upstream),
        ..BuildReport::default()
    };

    let mut table = IconTable::new(IconId::new(manifest.symlink.clone()));
    let mut needed: BTreeSet<String> = BTreeSet::new();
    needed.insert(manifest.symlink.clone());

    for ext in &manifest.extensions {
        let key = ext.to_lowercase();
        match upstream.file_extensions.get(&key) {
            Some(icon) => {
                needed.insert(icon.clone());
                table = table.with_extension(key, IconId::new(icon.clone()));
                report.extensions += 1;
            }
            None => tracing::warn!(extension = %ext, "curated extension unknown upstream"),
        }
    }
    for name in &manifest.filenames {
        match upstream.file_names.get(name) {
            Some(icon) => {
                needed.insert(icon.clone());
                table = table.with_filename(name.clone(), IconId::new(icon.clone()));
                report.filenames += 1;
            }
            None => tracing::warn!(filename = %name, "curated filename unknown upstream"),
        }
    }
    for name in &manifest.folders {
        match upstream.folder_names.get(name) {
            Some(icon) => {
                needed.insert(icon.clone());
                table = table.with_folder(name.clone(), IconId::new(icon.clone()));
                report.folders += 1;
            }
            None => tracing::warn!(folder = %name, "curated folder unknown upstream"),
        }
    }

    if let Some(icon) = &manifest.default_file {
        needed.insert(icon.clone());
        table = table.with_default_file(IconId::new(icon.clone()));
    }
    if let Some(icon) = &manifest.default_folder {
        needed.insert(icon.clone());
        table = table.with_default_folder(IconId::new(icon.clone()));
    }

    let asset_dir = asset_dir.as_ref();
    for id in needed {
        match load_asset(asset_dir, &id)? {
            Some(image) => table = table.with_image(IconId::new(id), image),
            None => {
                tracing::warn!(icon = %id, "no bitmap asset for selected icon");
                report.missing.push(IconId::new(id));
            }
        }
    }

    tracing::info!(
        extensions = report.extensions,
        filenames = report.filenames,
        folders = report.folders,
        missing = report.missing.len(),
        "icon table compiled"
    );
    Ok((table, report))
}

/// Load `<id>.svg`, falling back to `<id>.png`. Absent assets are
/// `Ok(None)`; any other read failure is fatal.
fn load_asset(dir: &Path, id: &str) -> Result<Option<RenderableImage>> {
    for (extension, media_type) in [("svg", "image/svg+xml"), ("png", "image/png")] {
        let path = dir.join(format!("{id}.{extension}"));
        match fs::read(&path) {
            Ok(bytes) => return Ok(Some(RenderableImage::from_bytes(media_type, &bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::io(path, e)),
        }
    }
    Ok(None)
}
