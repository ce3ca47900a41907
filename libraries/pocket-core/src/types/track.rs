/// Track domain type
use super::ids::{Locator, TrackId};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Playable track descriptor
///
/// Immutable once built. Two tracks are the same track when their ids match,
/// regardless of the other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique, stable identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Track duration in milliseconds
    pub duration_ms: u64,

    /// Resource reference for the transport engine
    pub locator: Locator,

    /// Album identifier, when the store knows one
    #[serde(default)]
    pub album_id: Option<String>,
}

impl Track {
    /// Create a new track without album information
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_ms: u64,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_ms,
            locator: Locator::new(locator),
            album_id: None,
        }
    }

    /// Attach an album id
    #[must_use]
    pub fn with_album(mut self, album_id: impl Into<String>) -> Self {
        self.album_id = Some(album_id.into());
        self
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
