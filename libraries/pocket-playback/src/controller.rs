//! Playback controller - the queue and transport state machine
//!
//! Owns the queue, the play order, shuffle/repeat settings and the transport
//! engine. Every command validates against the current state, updates it,
//! issues at most a handful of engine commands and emits exactly one
//! `StateChanged` event.
//!
//! ```text
//! Empty --set_queue--> Stopped --play--> Playing <--play/pause--> Paused
//!                                          |
//!                    finish on last track, repeat != All
//!                                          v
//!                                      EndOfQueue
//! any state --set_queue--> Stopped (or Empty for an empty list)
//! ```

use crate::{
    engine::{EngineError, EngineEvent, TransportEngine},
    error::{PlaybackError, Result},
    events::{ChangeCause, PlaybackObserver, StateChanged},
    queue::Queue,
    shuffle::{pinned_permutation, RandomSource, RngSource},
    types::{PlaybackConfig, PlaybackState, RepeatMode, TransportStatus},
};
use pocket_core::{Track, TrackId};

/// Central playback state machine
///
/// Single-writer: the host must serialize user commands and engine callbacks
/// onto one execution context (see `pocket-mobile` for a dispatcher that
/// does this). Nothing here blocks or spawns.
pub struct PlaybackController<E: TransportEngine> {
    /// `None` once released
    engine: Option<E>,

    queue: Queue,

    /// Position in the play order
    current: Option<usize>,

    status: TransportStatus,
    position_ms: u64,

    /// The engine itself reported that audio stopped while playing. A
    /// track finish right after that still counts as playing through.
    stopped_by_engine: bool,

    // Settings
    shuffle_enabled: bool,
    repeat_mode: RepeatMode,
    restart_threshold_ms: Option<u64>,

    random: Box<dyn RandomSource>,
    observers: Vec<Box<dyn PlaybackObserver>>,
}

impl<E: TransportEngine> PlaybackController<E> {
    /// Create a controller that owns `engine`
    ///
    /// The shuffle source is seeded from `config.shuffle_seed` when set.
    pub fn new(engine: E, config: PlaybackConfig) -> Result<Self> {
        let random: Box<dyn RandomSource> = match config.shuffle_seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };
        Self::with_random_source(engine, config, random)
    }

    /// Create a controller with an explicit random source
    pub fn with_random_source(
        engine: E,
        config: PlaybackConfig,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            engine: Some(engine),
            queue: Queue::default(),
            current: None,
            status: TransportStatus::Empty,
            position_ms: 0,
            stopped_by_engine: false,
            shuffle_enabled: config.shuffle,
            repeat_mode: config.repeat,
            restart_threshold_ms: config.previous_restart_threshold_ms,
            random,
            observers: Vec::new(),
        })
    }

    /// Register an observer; it receives every subsequent event
    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Register an already boxed observer
    pub fn subscribe_boxed(&mut self, observer: Box<dyn PlaybackObserver>) {
        self.observers.push(observer);
    }

    // ===== Queue =====

    /// Replace the queue
    ///
    /// Starts at `start` when it is in `tracks`, otherwise at the first
    /// track with a `TrackNotFound` warning. The start track is loaded but
    /// not played. With shuffle on, a fresh order is generated with the
    /// start track first.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: Option<&TrackId>) -> Result<()> {
        if self.engine.is_none() {
            return self.reject(ChangeCause::SetQueue, PlaybackError::EngineReleased);
        }

        if self.status == TransportStatus::Playing {
            if let Err(e) = self.engine_mut()?.pause() {
                tracing::warn!("Engine refused to pause before queue replacement: {}", e);
            }
        }

        self.queue = Queue::new(tracks);
        self.position_ms = 0;

        if self.queue.is_empty() {
            tracing::info!("Queue cleared");
            self.current = None;
            self.status = TransportStatus::Empty;
            self.emit(ChangeCause::SetQueue, None);
            return Ok(());
        }

        let mut warning = None;
        let start_position = match start {
            None => 0,
            Some(id) => self.queue.position_of_id(id).unwrap_or_else(|| {
                tracing::warn!("Start track {} not in queue, starting at first track", id);
                warning = Some(PlaybackError::TrackNotFound(id.clone()));
                0
            }),
        };

        self.current = Some(start_position);
        if self.shuffle_enabled {
            self.reshuffle();
        }
        self.status = TransportStatus::Stopped;

        tracing::info!(
            "Queue set: {} tracks, starting at position {}",
            self.queue.len(),
            self.current.unwrap_or(0)
        );

        let failure = self.load_current(false);
        self.publish(ChangeCause::SetQueue, failure, warning);
        Ok(())
    }

    /// Replace the queue with `tracks` and start playing `selected`
    ///
    /// The "user tapped a song in the list" action.
    pub fn play_track(&mut self, tracks: Vec<Track>, selected: &TrackId) -> Result<()> {
        self.set_queue(tracks, Some(selected))?;
        self.play()
    }

    // ===== Transport =====

    /// Start or resume playback; no-op while already playing
    pub fn play(&mut self) -> Result<()> {
        self.check_ready(ChangeCause::Play)?;

        let error = match self.status {
            TransportStatus::Playing => None,
            TransportStatus::Paused | TransportStatus::Stopped => {
                match self.engine_mut()?.play() {
                    Ok(()) => {
                        self.status = TransportStatus::Playing;
                        None
                    }
                    Err(e) => {
                        self.status = TransportStatus::Playing;
                        Some(self.skip_failed(&e))
                    }
                }
            }
            TransportStatus::EndOfQueue => {
                // The final track already ran out; start it over
                self.position_ms = 0;
                self.status = TransportStatus::Playing;
                self.load_current(true)
            }
            TransportStatus::Empty => {
                return self.reject(ChangeCause::Play, PlaybackError::EmptyQueue);
            }
        };

        self.emit(ChangeCause::Play, error);
        Ok(())
    }

    /// Pause playback; no-op unless playing
    pub fn pause(&mut self) -> Result<()> {
        self.check_ready(ChangeCause::Pause)?;

        let mut error = None;
        if self.status == TransportStatus::Playing {
            if let Err(e) = self.engine_mut()?.pause() {
                error = Some(self.command_failed(&e));
            }
            self.status = TransportStatus::Paused;
        }

        self.emit(ChangeCause::Pause, error);
        Ok(())
    }

    /// Seek within the current track
    ///
    /// The position is clamped to `[0, duration]`. Status is unchanged.
    pub fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.check_ready(ChangeCause::Seek)?;

        let clamped = position_ms.min(self.current_duration());
        let error = match self.engine_mut()?.seek_to(clamped) {
            Ok(()) => None,
            Err(e) => Some(self.command_failed(&e)),
        };
        self.position_ms = clamped;

        self.emit(ChangeCause::Seek, error);
        Ok(())
    }

    /// Move to the next play-order position
    ///
    /// Wraps with `RepeatMode::All`; otherwise stops at the end and stays on
    /// the last position.
    pub fn skip_next(&mut self) -> Result<()> {
        self.check_ready(ChangeCause::SkipNext)?;

        let resume = self.status == TransportStatus::Playing;
        let error = self.advance(resume);

        self.emit(ChangeCause::SkipNext, error);
        Ok(())
    }

    /// Move to the previous play-order position
    ///
    /// Wraps to the last position with `RepeatMode::All`; otherwise the
    /// first position restarts its track. With a restart threshold
    /// configured, playback past the threshold restarts the current track
    /// instead of moving back.
    pub fn skip_previous(&mut self) -> Result<()> {
        self.check_ready(ChangeCause::SkipPrevious)?;

        let at_end = self.status == TransportStatus::EndOfQueue;
        let past_threshold = self
            .restart_threshold_ms
            .is_some_and(|threshold| self.position_ms > threshold);

        let Some(position) = self.current else {
            return self.reject(ChangeCause::SkipPrevious, PlaybackError::EmptyQueue);
        };

        let target = if past_threshold && !at_end {
            None
        } else if position > 0 {
            Some(position - 1)
        } else if self.repeat_mode == RepeatMode::All {
            Some(self.queue.len() - 1)
        } else {
            None
        };

        if at_end {
            self.status = TransportStatus::Stopped;
        }

        let error = match target {
            Some(target) => {
                tracing::debug!("Previous: position {} -> {}", position, target);
                self.current = Some(target);
                self.position_ms = 0;
                let resume = self.status == TransportStatus::Playing;
                self.load_current(resume)
            }
            None => {
                tracing::debug!("Previous: restarting position {}", position);
                self.position_ms = 0;
                match self.engine_mut()?.seek_to(0) {
                    Ok(()) => None,
                    Err(e) => Some(self.command_failed(&e)),
                }
            }
        };

        self.emit(ChangeCause::SkipPrevious, error);
        Ok(())
    }

    // ===== Shuffle & Repeat =====

    /// Flip shuffle
    ///
    /// Enabling generates a new order with the active track first, so the
    /// active track keeps playing. Disabling restores the queue order and
    /// points at the active track's own queue index.
    pub fn toggle_shuffle(&mut self) -> Result<()> {
        self.check_ready(ChangeCause::ToggleShuffle)?;

        self.shuffle_enabled = !self.shuffle_enabled;
        if self.shuffle_enabled {
            self.reshuffle();
        } else {
            let active = self.current_queue_index();
            self.queue.reset_play_order();
            self.current = active;
        }

        tracing::debug!(
            "Shuffle {}: order {:?}",
            if self.shuffle_enabled { "on" } else { "off" },
            self.queue.play_order()
        );

        self.emit(ChangeCause::ToggleShuffle, None);
        Ok(())
    }

    /// Set the repeat mode
    ///
    /// Only the flag changes here; the mode is applied at the next skip or
    /// track finish.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) -> Result<()> {
        self.check_ready(ChangeCause::SetRepeatMode)?;

        self.repeat_mode = mode;
        self.emit(ChangeCause::SetRepeatMode, None);
        Ok(())
    }

    // ===== Engine callbacks =====

    /// Dispatch an engine callback
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::Finished => self.on_track_finished(),
            EngineEvent::PlayingChanged(playing) => self.on_playing_changed(playing),
            EngineEvent::Position(position_ms) => self.on_position(position_ms),
            EngineEvent::Failed { reason } => self.on_engine_failed(&EngineError::new(reason)),
        }
    }

    /// The current track reached its end
    ///
    /// `RepeatMode::One` replays it; anything else advances like
    /// `skip_next`, including the end-of-queue stop. Playback continues when
    /// the track was playing, or when the engine paused itself at the end.
    pub fn on_track_finished(&mut self) -> Result<()> {
        self.check_ready(ChangeCause::TrackFinished)?;

        let resume = match self.status {
            TransportStatus::Playing => true,
            TransportStatus::Paused => self.stopped_by_engine,
            _ => false,
        };
        if resume {
            self.status = TransportStatus::Playing;
        }

        let error = if self.repeat_mode == RepeatMode::One {
            tracing::debug!("Repeat one: replaying position {:?}", self.current);
            self.position_ms = 0;
            self.load_current(resume)
        } else {
            self.advance(resume)
        };

        self.emit(ChangeCause::TrackFinished, error);
        Ok(())
    }

    /// The engine started or stopped producing audio
    pub fn on_playing_changed(&mut self, playing: bool) -> Result<()> {
        self.check_ready(ChangeCause::PlayingChanged)?;

        let mut stopped_by_engine = false;
        match (self.status, playing) {
            (TransportStatus::Paused | TransportStatus::Stopped, true) => {
                self.status = TransportStatus::Playing;
            }
            (TransportStatus::Playing, false) => {
                self.status = TransportStatus::Paused;
                stopped_by_engine = true;
            }
            _ => {}
        }

        self.emit(ChangeCause::PlayingChanged, None);
        self.stopped_by_engine = stopped_by_engine;
        Ok(())
    }

    /// Periodic position report from the engine
    pub fn on_position(&mut self, position_ms: u64) -> Result<()> {
        self.check_ready(ChangeCause::Position)?;

        self.position_ms = position_ms.min(self.current_duration());
        self.emit(ChangeCause::Position, None);
        Ok(())
    }

    /// The engine could not load or play the current track
    ///
    /// The track is treated as unplayable and skipped, even with
    /// `RepeatMode::One`. The next track only starts when playback was
    /// running; a stopped or paused player just moves on and loads it.
    pub fn on_engine_failed(&mut self, error: &EngineError) -> Result<()> {
        self.check_ready(ChangeCause::EngineFailed)?;

        let reported = self.skip_failed(error);

        self.emit(ChangeCause::EngineFailed, Some(reported));
        Ok(())
    }

    // ===== Lifecycle =====

    /// Release the transport engine
    ///
    /// Every later command fails with `EngineReleased`.
    pub fn release(&mut self) -> Result<()> {
        let Some(mut engine) = self.engine.take() else {
            return self.reject(ChangeCause::Released, PlaybackError::EngineReleased);
        };

        tracing::info!("Releasing transport engine");
        engine.release();

        self.status = match self.status {
            TransportStatus::Playing | TransportStatus::Paused => TransportStatus::Stopped,
            other => other,
        };

        self.emit(ChangeCause::Released, None);
        Ok(())
    }

    pub fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    // ===== State Queries =====

    /// Snapshot of the current state
    pub fn current_state(&self) -> PlaybackState {
        PlaybackState {
            current_index: self.current,
            is_playing: self.status == TransportStatus::Playing,
            position_ms: self.position_ms,
            shuffle_enabled: self.shuffle_enabled,
            repeat_mode: self.repeat_mode,
            status: self.status,
            play_order: self.queue.play_order().to_vec(),
        }
    }

    /// Track at the current play-order position
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|position| self.queue.track_at(position))
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Engine access for hosts and tests; `None` once released
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    // ===== Internal =====

    fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(PlaybackError::EngineReleased)
    }

    fn current_queue_index(&self) -> Option<usize> {
        self.current
            .and_then(|position| self.queue.queue_index_at(position))
    }

    fn current_duration(&self) -> u64 {
        self.current_track().map_or(0, |track| track.duration_ms)
    }

    /// Reject commands after release or without a queue
    fn check_ready(&mut self, cause: ChangeCause) -> Result<()> {
        if self.engine.is_none() {
            return self.reject(cause, PlaybackError::EngineReleased);
        }
        if self.queue.is_empty() {
            return self.reject(cause, PlaybackError::EmptyQueue);
        }
        Ok(())
    }

    /// Report a rejected command without touching state
    fn reject(&mut self, cause: ChangeCause, error: PlaybackError) -> Result<()> {
        tracing::warn!("{:?} rejected: {}", cause, error);
        self.emit(cause, Some(error.clone()));
        Err(error)
    }

    /// New shuffled order with the active track pinned first
    fn reshuffle(&mut self) {
        let Some(active) = self.current_queue_index() else {
            return;
        };
        let order = pinned_permutation(self.queue.len(), active, self.random.as_mut());
        self.queue.set_play_order(order);
        self.current = Some(0);
    }

    /// Step one position forward, wrapping only with `RepeatMode::All`
    fn step_forward(&mut self) -> bool {
        let Some(position) = self.current else {
            return false;
        };

        if position + 1 < self.queue.len() {
            self.current = Some(position + 1);
            true
        } else if self.repeat_mode == RepeatMode::All {
            self.current = Some(0);
            true
        } else {
            false
        }
    }

    /// Boundary crossing shared by skip-next, track finish and failures
    fn advance(&mut self, resume: bool) -> Option<PlaybackError> {
        if self.step_forward() {
            tracing::debug!("Advanced to position {:?}", self.current);
            self.position_ms = 0;
            return self.load_current(resume);
        }

        tracing::debug!("End of queue at position {:?}", self.current);
        let mut error = None;
        if self.status == TransportStatus::Playing {
            if let Some(engine) = self.engine.as_mut() {
                if let Err(e) = engine.pause() {
                    tracing::warn!("Engine refused to stop at end of queue: {}", e);
                    error = Some(e);
                }
            }
        }
        self.status = TransportStatus::EndOfQueue;
        error.map(|e| self.command_failed(&e))
    }

    /// Load the track at the current position, playing it when `resume`
    ///
    /// Tracks the engine rejects are skipped forward. Gives up (Stopped)
    /// once every track in the queue has failed in a row.
    fn load_current(&mut self, resume: bool) -> Option<PlaybackError> {
        let mut last_error = None;

        for _ in 0..self.queue.len() {
            let Some(locator) = self.current_track().map(|track| track.locator.clone()) else {
                return last_error;
            };
            let Some(engine) = self.engine.as_mut() else {
                return Some(PlaybackError::EngineReleased);
            };

            let result = match engine.load(&locator) {
                Ok(()) if resume => engine.play(),
                other => other,
            };

            match result {
                Ok(()) => {
                    self.status = match self.status {
                        _ if resume => TransportStatus::Playing,
                        TransportStatus::EndOfQueue => TransportStatus::Stopped,
                        other => other,
                    };
                    return last_error;
                }
                Err(e) => {
                    tracing::warn!("Engine failed on {}: {}", locator, e);
                    last_error = Some(PlaybackError::EngineCommandFailed {
                        locator,
                        reason: e.reason().to_string(),
                    });
                    self.position_ms = 0;
                    if !self.step_forward() {
                        self.status = TransportStatus::EndOfQueue;
                        return last_error;
                    }
                }
            }
        }

        tracing::warn!("Every track in the queue failed to load, stopping");
        self.status = TransportStatus::Stopped;
        last_error
    }

    /// Current track is unplayable: report it and move on
    fn skip_failed(&mut self, error: &EngineError) -> PlaybackError {
        let reported = self.command_failed(error);
        tracing::warn!("Skipping unplayable track: {}", reported);
        let resume = self.status == TransportStatus::Playing;
        self.advance(resume).unwrap_or(reported)
    }

    /// Wrap an engine error with the current locator
    fn command_failed(&self, error: &EngineError) -> PlaybackError {
        PlaybackError::EngineCommandFailed {
            locator: self
                .current_track()
                .map(|track| track.locator.clone())
                .unwrap_or_else(|| pocket_core::Locator::new("")),
            reason: error.reason().to_string(),
        }
    }

    fn emit(&mut self, cause: ChangeCause, error: Option<PlaybackError>) {
        self.publish(cause, error, None);
    }

    fn publish(
        &mut self,
        cause: ChangeCause,
        error: Option<PlaybackError>,
        warning: Option<PlaybackError>,
    ) {
        // Only position reports may sit between an engine stop and the finish
        if cause != ChangeCause::Position {
            self.stopped_by_engine = false;
        }

        let event = StateChanged {
            cause,
            state: self.current_state(),
            track: self.current_track().cloned(),
            error,
            warning,
        };

        tracing::debug!(
            "{:?}: {:?} at {:?} ({} ms)",
            cause,
            event.state.status,
            event.state.current_index,
            event.state.position_ms
        );

        for observer in &mut self.observers {
            observer.on_state_changed(&event);
        }
    }
}

impl<E: TransportEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            tracing::debug!("Controller dropped, releasing engine");
            engine.release();
        }
    }
}
