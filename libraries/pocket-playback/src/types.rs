//! Core types for playback management

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the play order ends
    #[default]
    Off,

    /// Replay the current track when it finishes
    One,

    /// Wrap to the start of the play order
    All,
}

/// Transport status derived from the queue and the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportStatus {
    /// No queue set
    #[default]
    Empty,

    /// Queue set, track loaded, not playing
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Ran past the last play-order position with repeat off
    EndOfQueue,
}

/// Snapshot of the state machine, as seen by observers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Position in the play order; `None` when the queue is empty
    pub current_index: Option<usize>,

    pub is_playing: bool,

    /// Position in the current track, never beyond its duration
    pub position_ms: u64,

    pub shuffle_enabled: bool,

    pub repeat_mode: RepeatMode,

    pub status: TransportStatus,

    /// Permutation of queue indices in traversal order
    pub play_order: Vec<usize>,
}

impl PlaybackState {
    /// Queue index of the active track
    pub fn current_queue_index(&self) -> Option<usize> {
        self.current_index
            .and_then(|position| self.play_order.get(position).copied())
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial shuffle flag (default: off)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Restart the current track on "previous" once playback is past this
    /// many milliseconds (default: disabled, previous always moves back)
    pub previous_restart_threshold_ms: Option<u64>,

    /// Seed for the shuffle random source (default: entropy)
    pub shuffle_seed: Option<u64>,
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.previous_restart_threshold_ms == Some(0) {
            return Err(PlaybackError::InvalidConfig(
                "previous_restart_threshold_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
