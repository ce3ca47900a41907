//! Error types for the player service

use pocket_playback::PlaybackError;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Player service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The controller rejected the command
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// The dispatcher thread is gone (service shut down)
    #[error("Player service is not running")]
    Disconnected,

    /// The dispatcher thread could not be spawned
    #[error("Failed to start player service: {0}")]
    Startup(String),

    /// The dispatcher thread panicked
    #[error("Player service thread panicked")]
    Panicked,
}
