//! Now-playing notification
//!
//! Projects playback state onto the foreground media notification: a title,
//! a subtitle, whether the notification may be swiped away, and the three
//! transport buttons shown in the compact view.

use crate::service::Command;
use pocket_core::{Track, UNKNOWN_ARTIST};
use pocket_playback::{ChangeCause, PlaybackObserver, StateChanged};
use serde::{Deserialize, Serialize};

/// Title shown while no track is loaded
pub const FALLBACK_TITLE: &str = "Playing…";

/// Button on the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationAction {
    Previous,
    Play,
    Pause,
    Next,
}

impl NotificationAction {
    /// Button label
    pub fn label(self) -> &'static str {
        match self {
            Self::Previous => "Previous",
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::Next => "Next",
        }
    }

    /// Service command issued when the button is tapped
    pub fn command(self) -> Command {
        match self {
            Self::Previous => Command::SkipPrevious,
            Self::Play => Command::Play,
            Self::Pause => Command::Pause,
            Self::Next => Command::SkipNext,
        }
    }
}

/// Renderer-neutral content of the now-playing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingCard {
    pub title: String,

    /// Secondary line (the artist)
    pub text: String,

    /// Ongoing notifications cannot be dismissed
    pub ongoing: bool,

    /// Buttons in compact-view order
    pub actions: [NotificationAction; 3],
}

impl NowPlayingCard {
    pub fn new(track: Option<&Track>, is_playing: bool) -> Self {
        let title = track
            .map(|track| track.title.clone())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let text = track
            .map(|track| track.artist.clone())
            .filter(|artist| !artist.is_empty())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let play_pause = if is_playing {
            NotificationAction::Pause
        } else {
            NotificationAction::Play
        };

        Self {
            title,
            text,
            ongoing: is_playing,
            actions: [
                NotificationAction::Previous,
                play_pause,
                NotificationAction::Next,
            ],
        }
    }

    pub fn from_event(event: &StateChanged) -> Self {
        Self::new(event.track.as_ref(), event.state.is_playing)
    }
}

/// Platform notification surface
pub trait NotificationSink: Send {
    /// Post or update the notification
    fn show(&mut self, card: &NowPlayingCard);

    /// Remove the notification
    fn clear(&mut self);
}

/// Keeps a `NotificationSink` in sync with playback
///
/// Position reports and other changes that leave the card as it was are not
/// forwarded. Clears the sink when the engine is released.
pub struct NotificationObserver<S> {
    sink: S,
    last: Option<NowPlayingCard>,
}

impl<S: NotificationSink> NotificationObserver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last: None }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: NotificationSink> PlaybackObserver for NotificationObserver<S> {
    fn on_state_changed(&mut self, event: &StateChanged) {
        if event.cause == ChangeCause::Released {
            if self.last.take().is_some() {
                self.sink.clear();
            }
            return;
        }

        let card = NowPlayingCard::from_event(event);
        if self.last.as_ref() == Some(&card) {
            return;
        }

        tracing::trace!("Notification: {} / {}", card.title, card.text);
        self.sink.show(&card);
        self.last = Some(card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_playback::{PlaybackState, TransportStatus};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        shown: Arc<Mutex<Vec<NowPlayingCard>>>,
        cleared: Arc<Mutex<usize>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&mut self, card: &NowPlayingCard) {
            self.shown.lock().unwrap().push(card.clone());
        }

        fn clear(&mut self) {
            *self.cleared.lock().unwrap() += 1;
        }
    }

    fn track() -> Track {
        Track::new("1", "Song", "Band", 180_000, "content://audio/1")
    }

    fn event(
        cause: ChangeCause,
        track: Option<Track>,
        is_playing: bool,
        position_ms: u64,
    ) -> StateChanged {
        StateChanged {
            cause,
            state: PlaybackState {
                current_index: track.as_ref().map(|_| 0),
                is_playing,
                position_ms,
                status: if is_playing {
                    TransportStatus::Playing
                } else {
                    TransportStatus::Paused
                },
                play_order: vec![0],
                ..Default::default()
            },
            track,
            error: None,
            warning: None,
        }
    }

    #[test]
    fn playing_card() {
        let card = NowPlayingCard::new(Some(&track()), true);
        assert_eq!(card.title, "Song");
        assert_eq!(card.text, "Band");
        assert!(card.ongoing);
        assert_eq!(
            card.actions,
            [
                NotificationAction::Previous,
                NotificationAction::Pause,
                NotificationAction::Next
            ]
        );
    }

    #[test]
    fn paused_card_is_dismissible() {
        let card = NowPlayingCard::new(Some(&track()), false);
        assert!(!card.ongoing);
        assert_eq!(card.actions[1], NotificationAction::Play);
        assert_eq!(card.actions[1].command(), Command::Play);
    }

    #[test]
    fn fallbacks_without_track() {
        let card = NowPlayingCard::new(None, false);
        assert_eq!(card.title, FALLBACK_TITLE);
        assert_eq!(card.text, UNKNOWN_ARTIST);
    }

    #[test]
    fn unchanged_card_is_not_reposted() {
        let sink = RecordingSink::default();
        let mut observer = NotificationObserver::new(sink.clone());

        observer.on_state_changed(&event(ChangeCause::Play, Some(track()), true, 0));
        observer.on_state_changed(&event(ChangeCause::Position, Some(track()), true, 1_000));
        observer.on_state_changed(&event(ChangeCause::Position, Some(track()), true, 2_000));
        observer.on_state_changed(&event(ChangeCause::Pause, Some(track()), false, 2_000));

        let shown = sink.shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert!(shown[0].ongoing);
        assert!(!shown[1].ongoing);
    }

    #[test]
    fn release_clears_once() {
        let sink = RecordingSink::default();
        let mut observer = NotificationObserver::new(sink.clone());

        observer.on_state_changed(&event(ChangeCause::Play, Some(track()), true, 0));
        observer.on_state_changed(&event(ChangeCause::Released, Some(track()), false, 0));
        observer.on_state_changed(&event(ChangeCause::Released, Some(track()), false, 0));

        assert_eq!(*sink.cleared.lock().unwrap(), 1);
    }
}
