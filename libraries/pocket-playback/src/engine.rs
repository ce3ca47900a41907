//! Transport engine contract
//!
//! The engine owns decoding and audio output. The controller only issues
//! commands and reacts to the events the engine posts back; it never reads
//! engine state directly.

use pocket_core::Locator;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported synchronously by an engine command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(String);

impl EngineError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Result type for engine commands
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Black-box media engine driven by the playback controller
///
/// Commands must not block: an implementation queues the work and reports
/// completion later through an [`EngineEvent`]. A newer command supersedes
/// any in-flight one.
pub trait TransportEngine {
    /// Prepare the resource behind `locator`, replacing whatever was loaded
    fn load(&mut self, locator: &Locator) -> EngineResult<()>;

    /// Start or resume the loaded resource
    fn play(&mut self) -> EngineResult<()>;

    /// Pause, keeping the position
    fn pause(&mut self) -> EngineResult<()>;

    /// Jump to a position in the loaded resource
    fn seek_to(&mut self, position_ms: u64) -> EngineResult<()>;

    /// Free decoder and output resources; called exactly once
    fn release(&mut self);

    /// Whether an event stamped with `generation` still describes the
    /// loaded resource
    ///
    /// Engines that post from their own thread can stamp events with a
    /// counter bumped on every `load` and `seek_to`, then reject stamps a
    /// newer command has superseded. Unstamped events are always current.
    fn is_current(&self, generation: u64) -> bool {
        let _ = generation;
        true
    }
}

impl<E: TransportEngine + ?Sized> TransportEngine for Box<E> {
    fn load(&mut self, locator: &Locator) -> EngineResult<()> {
        (**self).load(locator)
    }

    fn play(&mut self) -> EngineResult<()> {
        (**self).play()
    }

    fn pause(&mut self) -> EngineResult<()> {
        (**self).pause()
    }

    fn seek_to(&mut self, position_ms: u64) -> EngineResult<()> {
        (**self).seek_to(position_ms)
    }

    fn release(&mut self) {
        (**self).release();
    }

    fn is_current(&self, generation: u64) -> bool {
        (**self).is_current(generation)
    }
}

/// Callbacks posted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The loaded track reached its natural end
    Finished,

    /// The engine started or stopped producing audio
    PlayingChanged(bool),

    /// Periodic position report
    Position(u64),

    /// The engine could not load or play the current locator
    Failed { reason: String },
}
