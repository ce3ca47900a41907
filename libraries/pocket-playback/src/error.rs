//! Error types for playback management

use pocket_core::{Locator, TrackId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
///
/// Every error is also delivered to observers inside the `StateChanged`
/// event of the command that produced it, so the type is cloneable and
/// serializable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlaybackError {
    /// Command issued while no queue is set
    #[error("Queue is empty")]
    EmptyQueue,

    /// Requested start track is not in the queue; playback starts at index 0
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Command issued after the transport engine was released
    #[error("Transport engine already released")]
    EngineReleased,

    /// The transport engine could not load or play a locator
    #[error("Engine command failed for {locator}: {reason}")]
    EngineCommandFailed { locator: Locator, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlaybackError {
    /// Warnings are reported but do not reject the command
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::TrackNotFound(_))
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
