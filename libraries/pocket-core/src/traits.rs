/// Core traits for Pocket Player
use crate::error::Result;
use crate::types::Track;

/// Source of playable tracks
///
/// Implementers enumerate locally stored audio (a media store query on
/// Android, a manifest file on the simulator, a fixture in tests).
///
/// The returned list is a snapshot: later catalog changes never mutate a
/// queue that was already built from it.
pub trait TrackCatalog {
    /// List every playable track, in presentation order
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read
    fn list_tracks(&self) -> Result<Vec<Track>>;
}
