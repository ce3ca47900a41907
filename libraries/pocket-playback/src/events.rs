//! Playback events
//!
//! The controller emits one `StateChanged` after every command and after
//! every engine callback it reacts to, in the order the transitions happen.
//! Observers are sinks: they only ever see a shared reference to the event
//! and cannot reach back into the controller while it is being delivered.

use crate::error::PlaybackError;
use crate::types::PlaybackState;
use crossbeam_channel::Sender;
use pocket_core::Track;
use serde::{Deserialize, Serialize};

/// What triggered a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeCause {
    SetQueue,
    Play,
    Pause,
    Seek,
    SkipNext,
    SkipPrevious,
    ToggleShuffle,
    SetRepeatMode,
    TrackFinished,
    PlayingChanged,
    Position,
    EngineFailed,
    Released,
}

/// Full state snapshot delivered to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChanged {
    /// The operation or callback that produced this state
    pub cause: ChangeCause,

    pub state: PlaybackState,

    /// Track at the current play-order position
    pub track: Option<Track>,

    /// Error raised while handling the cause
    pub error: Option<PlaybackError>,

    /// Non-fatal problem reported alongside (e.g. an unknown start track)
    #[serde(default)]
    pub warning: Option<PlaybackError>,
}

/// Consumer of state-change events (UI, notification)
pub trait PlaybackObserver: Send {
    fn on_state_changed(&mut self, event: &StateChanged);
}

impl<F> PlaybackObserver for F
where
    F: FnMut(&StateChanged) + Send,
{
    fn on_state_changed(&mut self, event: &StateChanged) {
        self(event);
    }
}

/// Forwards every event into a channel
///
/// Lets a UI thread consume events at its own pace. Events are dropped once
/// the receiving side is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<StateChanged>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<StateChanged>) -> Self {
        Self { tx }
    }
}

impl PlaybackObserver for ChannelObserver {
    fn on_state_changed(&mut self, event: &StateChanged) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!("Event receiver dropped, discarding {:?}", event.cause);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn sample_event() -> StateChanged {
        StateChanged {
            cause: ChangeCause::Play,
            state: PlaybackState::default(),
            track: None,
            error: Some(PlaybackError::EmptyQueue),
            warning: None,
        }
    }

    #[test]
    fn closure_observer_receives_events() {
        let mut causes = Vec::new();
        {
            let mut observer = |event: &StateChanged| causes.push(event.cause);
            observer.on_state_changed(&sample_event());
        }
        assert_eq!(causes, vec![ChangeCause::Play]);
    }

    #[test]
    fn channel_observer_forwards_and_survives_drop() {
        let (tx, rx) = unbounded();
        let mut observer = ChannelObserver::new(tx);

        observer.on_state_changed(&sample_event());
        assert_eq!(rx.try_recv().unwrap(), sample_event());

        drop(rx);
        // Must not panic once the receiver is gone
        observer.on_state_changed(&sample_event());
    }

    #[test]
    fn event_serializes_error_field() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        assert!(json.contains("EmptyQueue"));
    }

    #[test]
    fn warning_is_optional_when_deserializing() {
        let mut value = serde_json::to_value(sample_event()).unwrap();
        value.as_object_mut().unwrap().remove("warning");

        let event: StateChanged = serde_json::from_value(value).unwrap();
        assert_eq!(event, sample_event());
    }
}
