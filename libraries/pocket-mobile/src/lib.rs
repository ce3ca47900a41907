//! Pocket Player - Mobile Service Layer
//!
//! Hosts the playback controller the way a mobile background service does:
//!
//! - [`PlayerService`] runs the controller on its own dispatcher thread and
//!   serializes user commands and engine callbacks through one channel
//! - [`NotificationObserver`] keeps the now-playing notification in sync
//!
//! Platform bindings (Android media session, iOS remote commands) implement
//! `TransportEngine` and `NotificationSink` and drive a [`PlayerHandle`].
//!
//! # Example
//!
//! ```rust
//! use pocket_core::{Locator, Track};
//! use pocket_mobile::{EngineCallbacks, PlayerService, ServiceConfig};
//! use pocket_playback::{EngineResult, TransportEngine, TransportStatus};
//!
//! struct SilentEngine(EngineCallbacks);
//!
//! impl TransportEngine for SilentEngine {
//!     fn load(&mut self, _locator: &Locator) -> EngineResult<()> { Ok(()) }
//!     fn play(&mut self) -> EngineResult<()> { Ok(()) }
//!     fn pause(&mut self) -> EngineResult<()> { Ok(()) }
//!     fn seek_to(&mut self, _position_ms: u64) -> EngineResult<()> { Ok(()) }
//!     fn release(&mut self) {}
//! }
//!
//! let service = PlayerService::start(SilentEngine, Vec::new(), ServiceConfig::default()).unwrap();
//! let player = service.handle();
//!
//! player
//!     .set_queue(vec![Track::new("a", "Song", "Band", 1_000, "content://audio/a")], None)
//!     .unwrap();
//! player.play().unwrap();
//! assert_eq!(player.current_state().unwrap().status, TransportStatus::Playing);
//!
//! service.shutdown().unwrap();
//! assert!(player.play().is_err());
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod notification;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use notification::{
    NotificationAction, NotificationObserver, NotificationSink, NowPlayingCard, FALLBACK_TITLE,
};
pub use service::{Command, EngineCallbacks, PlayerHandle, PlayerService};
