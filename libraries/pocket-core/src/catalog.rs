//! Track catalog normalization
//!
//! Raw media-store records are turned into playable `Track`s with the same
//! rules the Android media query applies:
//! - only records flagged as music are kept
//! - a missing title becomes `"Unknown Title"`, a missing artist `"Unknown Artist"`
//! - the listing is ordered by title, case-insensitively (stable for equal titles)

use crate::error::{CoreError, Result};
use crate::traits::TrackCatalog;
use crate::types::{Locator, Track, TrackId};
use serde::{Deserialize, Serialize};

/// Title used when the store has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Artist used when the store has none
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Raw record as reported by a media store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub artist: Option<String>,

    /// Duration as reported by the store; negative values are treated as 0
    #[serde(default)]
    pub duration_ms: i64,

    pub locator: String,

    #[serde(default)]
    pub album_id: Option<String>,

    #[serde(default = "default_is_music")]
    pub is_music: bool,
}

fn default_is_music() -> bool {
    true
}

impl CatalogEntry {
    /// Shorthand for a music record with a title and no artist
    pub fn music(
        id: impl Into<String>,
        title: impl Into<String>,
        duration_ms: i64,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            artist: None,
            duration_ms,
            locator: locator.into(),
            album_id: None,
            is_music: true,
        }
    }

    /// Set the artist
    #[must_use]
    pub fn by(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Convert into a track, applying the title/artist defaults
    ///
    /// # Errors
    /// Returns `InvalidEntry` when the id or the locator is blank
    pub fn into_track(self) -> Result<Track> {
        if self.id.trim().is_empty() {
            return Err(CoreError::invalid_entry(self.id, "blank id"));
        }
        if self.locator.trim().is_empty() {
            return Err(CoreError::invalid_entry(self.id, "blank locator"));
        }

        Ok(Track {
            id: TrackId::new(self.id),
            title: non_blank(self.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: non_blank(self.artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            duration_ms: u64::try_from(self.duration_ms).unwrap_or(0),
            locator: Locator::new(self.locator),
            album_id: self.album_id,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize raw records into the playable listing
///
/// Non-music records are dropped silently; malformed records are dropped
/// with a warning.
pub fn normalize(entries: Vec<CatalogEntry>) -> Vec<Track> {
    let mut tracks: Vec<Track> = entries
        .into_iter()
        .filter(|entry| entry.is_music)
        .filter_map(|entry| match entry.into_track() {
            Ok(track) => Some(track),
            Err(e) => {
                tracing::warn!("Skipping catalog entry: {}", e);
                None
            }
        })
        .collect();

    tracks.sort_by_cached_key(|track| track.title.to_lowercase());
    tracks
}

/// In-memory catalog
///
/// Holds an already-normalized listing and hands out copies of it.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tracks: Vec<Track>,
}

impl MemoryCatalog {
    /// Build a catalog from raw store records
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            tracks: normalize(entries),
        }
    }

    /// Build a catalog from tracks that are already in presentation order
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Look up a track by id
    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|track| &track.id == id)
    }
}

impl TrackCatalog for MemoryCatalog {
    fn list_tracks(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_get_defaults() {
        let entry = CatalogEntry {
            id: "9".to_string(),
            title: None,
            artist: Some("   ".to_string()),
            duration_ms: -5,
            locator: "content://audio/9".to_string(),
            album_id: None,
            is_music: true,
        };

        let track = entry.into_track().unwrap();
        assert_eq!(track.title, UNKNOWN_TITLE);
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.duration_ms, 0);
    }

    #[test]
    fn blank_locator_is_rejected() {
        let entry = CatalogEntry::music("1", "Song", 1_000, " ");
        assert!(matches!(
            entry.into_track(),
            Err(CoreError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn normalize_filters_and_sorts_case_insensitively() {
        let mut ringtone = CatalogEntry::music("3", "Alarm", 2_000, "content://audio/3");
        ringtone.is_music = false;

        let tracks = normalize(vec![
            CatalogEntry::music("1", "beta", 1_000, "content://audio/1"),
            ringtone,
            CatalogEntry::music("2", "Alpha", 1_000, "content://audio/2").by("Someone"),
            CatalogEntry::music("4", "", 1_000, "content://audio/4"),
            CatalogEntry::music("5", "", 1_000, ""),
        ]);

        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta", UNKNOWN_TITLE]);
        assert_eq!(tracks[0].artist, "Someone");
    }

    #[test]
    fn equal_titles_keep_store_order() {
        let tracks = normalize(vec![
            CatalogEntry::music("b", "Same", 1_000, "b"),
            CatalogEntry::music("a", "same", 1_000, "a"),
        ]);

        assert_eq!(tracks[0].id.as_str(), "b");
        assert_eq!(tracks[1].id.as_str(), "a");
    }

    #[test]
    fn memory_catalog_returns_snapshot() {
        let catalog = MemoryCatalog::from_entries(vec![
            CatalogEntry::music("1", "One", 1_000, "one"),
            CatalogEntry::music("2", "Two", 1_000, "two"),
        ]);

        let mut listing = catalog.list_tracks().unwrap();
        listing.clear();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&TrackId::new("2")).is_some());
    }
}
