//! Background player service
//!
//! Runs the playback controller on a dedicated dispatcher thread. User
//! commands (from any thread) and engine callbacks share one channel, so the
//! controller sees a single serialized stream of inputs:
//!
//! ```text
//! PlayerHandle ──┐
//!                ├──> [bounded channel] ──> dispatcher ──> PlaybackController ──> observers
//! EngineCallbacks┘
//! ```

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crossbeam_channel::{bounded, Receiver, Sender};
use pocket_core::{Track, TrackId};
use pocket_playback::{
    EngineEvent, PlaybackController, PlaybackObserver, PlaybackState, RepeatMode,
    TransportEngine,
};
use std::thread::{self, JoinHandle};

/// Commands accepted by the player service
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the queue, starting at `start` when given
    SetQueue {
        tracks: Vec<Track>,
        start: Option<TrackId>,
    },

    /// Replace the queue and play `selected`
    PlayTrack {
        tracks: Vec<Track>,
        selected: TrackId,
    },

    Play,
    Pause,

    /// Seek within the current track (milliseconds)
    Seek(u64),

    SkipNext,
    SkipPrevious,
    ToggleShuffle,
    SetRepeatMode(RepeatMode),
}

/// Everything the dispatcher thread consumes
enum Message {
    Command(Command, Sender<pocket_playback::Result<()>>),
    Engine {
        event: EngineEvent,
        generation: Option<u64>,
    },
    State(Sender<PlaybackState>),
    Shutdown,
}

/// Handle the transport engine uses to post its callbacks
///
/// Post from the engine's own thread. Posting from inside a
/// `TransportEngine` method runs on the dispatcher and blocks once the
/// channel is full.
#[derive(Clone)]
pub struct EngineCallbacks {
    tx: Sender<Message>,
}

impl EngineCallbacks {
    /// Queue an engine event for the controller
    pub fn post(&self, event: EngineEvent) -> Result<()> {
        self.send(event, None)
    }

    /// Queue an event stamped with the engine's load generation
    ///
    /// The dispatcher drops it when `TransportEngine::is_current` says a
    /// later load or seek has superseded it.
    pub fn post_stamped(&self, generation: u64, event: EngineEvent) -> Result<()> {
        self.send(event, Some(generation))
    }

    fn send(&self, event: EngineEvent, generation: Option<u64>) -> Result<()> {
        self.tx
            .send(Message::Engine { event, generation })
            .map_err(|_| ServiceError::Disconnected)
    }

    pub fn finished(&self) -> Result<()> {
        self.post(EngineEvent::Finished)
    }

    pub fn playing_changed(&self, playing: bool) -> Result<()> {
        self.post(EngineEvent::PlayingChanged(playing))
    }

    pub fn position(&self, position_ms: u64) -> Result<()> {
        self.post(EngineEvent::Position(position_ms))
    }

    pub fn failed(&self, reason: impl Into<String>) -> Result<()> {
        self.post(EngineEvent::Failed {
            reason: reason.into(),
        })
    }
}

/// Cloneable handle for issuing commands to a running service
///
/// Every call waits for the dispatcher to apply the command. Do not call
/// from inside an observer: observers run on the dispatcher thread.
#[derive(Clone)]
pub struct PlayerHandle {
    tx: Sender<Message>,
}

impl PlayerHandle {
    /// Apply a command and return the controller's verdict
    pub fn send(&self, command: Command) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Message::Command(command, reply_tx))
            .map_err(|_| ServiceError::Disconnected)?;
        reply_rx
            .recv()
            .map_err(|_| ServiceError::Disconnected)?
            .map_err(ServiceError::from)
    }

    pub fn set_queue(&self, tracks: Vec<Track>, start: Option<TrackId>) -> Result<()> {
        self.send(Command::SetQueue { tracks, start })
    }

    pub fn play_track(&self, tracks: Vec<Track>, selected: TrackId) -> Result<()> {
        self.send(Command::PlayTrack { tracks, selected })
    }

    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn seek(&self, position_ms: u64) -> Result<()> {
        self.send(Command::Seek(position_ms))
    }

    pub fn skip_next(&self) -> Result<()> {
        self.send(Command::SkipNext)
    }

    pub fn skip_previous(&self) -> Result<()> {
        self.send(Command::SkipPrevious)
    }

    pub fn toggle_shuffle(&self) -> Result<()> {
        self.send(Command::ToggleShuffle)
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.send(Command::SetRepeatMode(mode))
    }

    /// Snapshot of the controller state
    ///
    /// Reflects every command and engine event queued before this call.
    pub fn current_state(&self) -> Result<PlaybackState> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Message::State(reply_tx))
            .map_err(|_| ServiceError::Disconnected)?;
        reply_rx.recv().map_err(|_| ServiceError::Disconnected)
    }
}

/// Running player service
///
/// Owns the dispatcher thread. Dropping the service shuts it down.
pub struct PlayerService {
    handle: PlayerHandle,
    thread: Option<JoinHandle<()>>,
}

impl PlayerService {
    /// Start the dispatcher thread
    ///
    /// `engine_factory` runs on the dispatcher thread and receives the
    /// callbacks handle the engine posts its events through, so the engine
    /// itself never has to cross threads.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a bad configuration and `Startup` when
    /// the thread cannot be spawned.
    pub fn start<E, F>(
        engine_factory: F,
        observers: Vec<Box<dyn PlaybackObserver>>,
        config: ServiceConfig,
    ) -> Result<Self>
    where
        E: TransportEngine + 'static,
        F: FnOnce(EngineCallbacks) -> E + Send + 'static,
    {
        config.validate()?;

        let (tx, rx) = bounded(config.command_capacity);
        let (ready_tx, ready_rx) = bounded(1);
        let callbacks = EngineCallbacks { tx: tx.clone() };

        let thread = thread::Builder::new()
            .name("pocket-player".to_string())
            .spawn(move || {
                let engine = engine_factory(callbacks);
                let mut controller = match PlaybackController::new(engine, config.playback) {
                    Ok(controller) => controller,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                for observer in observers {
                    controller.subscribe_boxed(observer);
                }
                let _ = ready_tx.send(Ok(()));

                run_dispatcher(&mut controller, &rx);
            })
            .map_err(|e| ServiceError::Startup(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e.into());
            }
            Err(_) => {
                let _ = thread.join();
                return Err(ServiceError::Panicked);
            }
        }

        tracing::info!("Player service started");

        Ok(Self {
            handle: PlayerHandle { tx },
            thread: Some(thread),
        })
    }

    /// A new handle to the running service
    pub fn handle(&self) -> PlayerHandle {
        self.handle.clone()
    }

    /// Release the engine and stop the dispatcher thread
    ///
    /// Commands queued before the call are still applied. Later calls on
    /// any handle fail with `Disconnected`.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        tracing::info!("Stopping player service");
        // A dead dispatcher has already dropped the receiver
        let _ = self.handle.tx.send(Message::Shutdown);
        thread.join().map_err(|_| ServiceError::Panicked)
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!("Player service did not stop cleanly: {}", e);
        }
    }
}

fn run_dispatcher<E: TransportEngine>(
    controller: &mut PlaybackController<E>,
    rx: &Receiver<Message>,
) {
    while let Ok(message) = rx.recv() {
        match message {
            Message::Command(command, reply) => {
                let result = apply(controller, command);
                // The caller may have given up waiting
                let _ = reply.send(result);
            }
            Message::Engine { event, generation } => {
                let stale = generation.is_some_and(|generation| {
                    controller
                        .engine()
                        .is_some_and(|engine| !engine.is_current(generation))
                });
                if stale {
                    tracing::trace!("Dropping superseded engine event {:?}", event);
                    continue;
                }
                if let Err(e) = controller.handle_engine_event(event) {
                    tracing::debug!("Engine event ignored: {}", e);
                }
            }
            Message::State(reply) => {
                let _ = reply.send(controller.current_state());
            }
            Message::Shutdown => {
                if let Err(e) = controller.release() {
                    tracing::warn!("Release during shutdown failed: {}", e);
                }
                break;
            }
        }
    }

    tracing::debug!("Dispatcher loop finished");
}

fn apply<E: TransportEngine>(
    controller: &mut PlaybackController<E>,
    command: Command,
) -> pocket_playback::Result<()> {
    tracing::trace!("Command: {:?}", command);

    match command {
        Command::SetQueue { tracks, start } => controller.set_queue(tracks, start.as_ref()),
        Command::PlayTrack { tracks, selected } => controller.play_track(tracks, &selected),
        Command::Play => controller.play(),
        Command::Pause => controller.pause(),
        Command::Seek(position_ms) => controller.seek(position_ms),
        Command::SkipNext => controller.skip_next(),
        Command::SkipPrevious => controller.skip_previous(),
        Command::ToggleShuffle => controller.toggle_shuffle(),
        Command::SetRepeatMode(mode) => controller.set_repeat_mode(mode),
    }
}
