//! Offline mapping compiler for the icon engine.
//!
//! Turns a raw upstream icon-definition source and a curated name
//! manifest into the compact [`IconTable`] artifact the runtime engine
//! consumes:
//!
//! - **Upstream parsing**: recognizes both historical definition shapes,
//!   a structured JSON document and a source-code-embedded record form
//! - **Language supplement**: widens extension coverage from language
//!   records without overriding direct entries
//! - **Curation**: intersects the upstream mapping against the manifest
//!   and inlines the bitmap for every selected icon
//! - **Reporting**: non-fatal coverage warnings and a build report of
//!   entry counts and missing assets
//!
//! # Example
//!
//! ```ignore
//! use horizon_emblem_compile::{compile, CuratedManifest};
//!
//! let manifest = CuratedManifest::from_file("curated.json")?;
//! let upstream = std::fs::read_to_string("upstream/icons.json")?;
//! let (table, report) = compile(&upstream, &manifest, "assets/")?;
//! std::fs::write("icon-table.json", table.to_json()?)?;
//! ```
//!
//! [`IconTable`]: horizon_emblem::icon::IconTable

pub mod upstream;

mod build;
mod error;
mod languages;
mod manifest;
mod validate;

pub use build::{BuildReport, compile};
pub use error::{Error, Result};
pub use languages::apply_language_supplement;
pub use manifest::CuratedManifest;
pub use validate::validate_coverage;
