//! Track manifest loading
//!
//! The simulator's stand-in for the device media store: a TOML file of raw
//! catalog records, normalized the same way a real store listing is.
//!
//! ```toml
//! [[track]]
//! id = "1"
//! title = "Song"
//! artist = "Band"
//! duration_ms = 180000
//! locator = "sim://song"
//! ```

use anyhow::{Context, Result};
use pocket_core::{CatalogEntry, MemoryCatalog};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default, rename = "track")]
    tracks: Vec<CatalogEntry>,
}

/// Parse manifest text into a catalog
pub fn parse_manifest(text: &str) -> Result<MemoryCatalog> {
    let manifest: Manifest = toml::from_str(text).context("Malformed track manifest")?;
    let raw = manifest.tracks.len();
    let catalog = MemoryCatalog::from_entries(manifest.tracks);

    tracing::debug!("Manifest: {} records, {} playable tracks", raw, catalog.len());
    Ok(catalog)
}

/// Read and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<MemoryCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track manifest {}", path.display()))?;
    parse_manifest(&text).with_context(|| format!("In {}", path.display()))
}
