/// Core error types for Pocket Player
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Pocket Player
#[derive(Error, Debug)]
pub enum CoreError {
    /// The catalog backend could not produce a listing
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A catalog record could not be turned into a track
    #[error("Invalid catalog entry {id}: {reason}")]
    InvalidEntry { id: String, reason: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a catalog-unavailable error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::CatalogUnavailable(msg.into())
    }

    /// Create an invalid entry error
    pub fn invalid_entry(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
