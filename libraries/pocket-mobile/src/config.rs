//! Player service configuration

use crate::error::Result;
use pocket_playback::{PlaybackConfig, PlaybackError};
use serde::{Deserialize, Serialize};

/// Player service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Capacity of the dispatcher channel (default: 64)
    pub command_capacity: usize,

    /// Settings handed to the playback controller
    pub playback: PlaybackConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            command_capacity: 64,
            playback: PlaybackConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.command_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "command_capacity must be greater than 0".to_string(),
            )
            .into());
        }
        self.playback.validate()?;
        Ok(())
    }
}
