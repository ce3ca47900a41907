//! Pocket Player - Playback Management
//!
//! Platform-agnostic playback queue and transport state machine.
//!
//! This crate provides:
//! - Queue with a fixed track order and a separate play order
//! - Shuffle that keeps the active track playing (pinned-first Fisher-Yates)
//! - Repeat modes (Off, One, All) applied at skip/finish boundaries
//! - Play/pause/seek/skip transitions with end-of-queue handling
//! - A state-change event stream for UI and notification renderers
//!
//! # Architecture
//!
//! `pocket-playback` is completely platform-agnostic:
//! - No audio decoding or output (the `TransportEngine` trait does that)
//! - No threads (hosts serialize commands and engine callbacks themselves)
//! - No storage (tracks come from a `pocket_core::TrackCatalog` snapshot)
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use pocket_core::{Locator, Track};
//! use pocket_playback::{
//!     EngineResult, PlaybackConfig, PlaybackController, RepeatMode, TransportEngine,
//! };
//!
//! struct SilentEngine;
//!
//! impl TransportEngine for SilentEngine {
//!     fn load(&mut self, _locator: &Locator) -> EngineResult<()> { Ok(()) }
//!     fn play(&mut self) -> EngineResult<()> { Ok(()) }
//!     fn pause(&mut self) -> EngineResult<()> { Ok(()) }
//!     fn seek_to(&mut self, _position_ms: u64) -> EngineResult<()> { Ok(()) }
//!     fn release(&mut self) {}
//! }
//!
//! let mut controller = PlaybackController::new(SilentEngine, PlaybackConfig::default()).unwrap();
//! controller.subscribe(|event: &pocket_playback::StateChanged| {
//!     println!("{:?} -> {:?}", event.cause, event.state.status);
//! });
//!
//! controller
//!     .set_queue(
//!         vec![
//!             Track::new("a", "First", "Artist", 180_000, "content://audio/a"),
//!             Track::new("b", "Second", "Artist", 200_000, "content://audio/b"),
//!         ],
//!         None,
//!     )
//!     .unwrap();
//!
//! controller.play().unwrap();
//! controller.set_repeat_mode(RepeatMode::All).unwrap();
//! controller.skip_next().unwrap();
//! controller.skip_next().unwrap();
//!
//! assert_eq!(controller.current_state().current_index, Some(0));
//! ```

mod controller;
mod engine;
mod error;
mod events;
mod queue;
mod shuffle;
pub mod types;

// Public exports
pub use controller::PlaybackController;
pub use engine::{EngineError, EngineEvent, EngineResult, TransportEngine};
pub use error::{PlaybackError, Result};
pub use events::{ChangeCause, ChannelObserver, PlaybackObserver, StateChanged};
pub use queue::{is_permutation, Queue};
pub use shuffle::{pinned_permutation, RandomSource, RngSource};
pub use types::{PlaybackConfig, PlaybackState, RepeatMode, TransportStatus};
