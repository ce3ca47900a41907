//! Simulated transport engine
//!
//! Plays nothing; keeps a virtual playhead per loaded locator and reports
//! position and end-of-track from a ticker thread, the way a real media
//! engine reports from its own playback thread.

use pocket_core::{Locator, Track};
use pocket_mobile::EngineCallbacks;
use pocket_playback::{EngineError, EngineEvent, EngineResult, TransportEngine};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Virtual playhead
#[derive(Debug, Default)]
pub struct Clock {
    /// Duration of the loaded resource; `None` when nothing is loaded
    duration_ms: Option<u64>,
    position_ms: u64,
    playing: bool,

    /// Bumped by every load and seek; events carry it so the player can
    /// drop the ones a newer command superseded
    generation: u64,
}

impl Clock {
    pub fn load(&mut self, duration_ms: u64) {
        self.duration_ms = Some(duration_ms);
        self.position_ms = 0;
        self.playing = false;
        self.generation += 1;
    }

    pub fn play(&mut self) -> bool {
        if self.duration_ms.is_none() {
            return false;
        }
        self.playing = true;
        true
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn seek(&mut self, position_ms: u64) {
        let limit = self.duration_ms.unwrap_or(0);
        self.position_ms = position_ms.min(limit);
        self.generation += 1;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance by `elapsed_ms` and report what the engine would post
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<EngineEvent> {
        let Some(duration_ms) = self.duration_ms else {
            return Vec::new();
        };
        if !self.playing {
            return Vec::new();
        }

        self.position_ms = self.position_ms.saturating_add(elapsed_ms).min(duration_ms);
        let mut events = vec![EngineEvent::Position(self.position_ms)];
        if self.position_ms >= duration_ms {
            self.playing = false;
            events.push(EngineEvent::Finished);
        }
        events
    }
}

/// Clock shared between the engine and its ticker thread
#[derive(Debug, Clone, Default)]
pub struct SharedClock {
    state: Arc<Mutex<Clock>>,
    stopped: Arc<AtomicBool>,
}

impl SharedClock {
    fn lock(&self) -> EngineResult<MutexGuard<'_, Clock>> {
        self.state
            .lock()
            .map_err(|_| EngineError::new("engine clock poisoned"))
    }

    /// Ask the ticker to exit
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn is_playing(&self) -> bool {
        self.lock().is_ok_and(|clock| clock.is_playing())
    }

    pub fn generation(&self) -> u64 {
        self.lock().map_or(0, |clock| clock.generation())
    }

    /// One clock step, with the generation the events belong to; no events
    /// once stopped
    pub fn tick(&self, elapsed_ms: u64) -> (u64, Vec<EngineEvent>) {
        if self.is_stopped() {
            return (0, Vec::new());
        }
        self.lock()
            .map(|mut clock| {
                let events = clock.advance(elapsed_ms);
                (clock.generation(), events)
            })
            .unwrap_or_default()
    }
}

/// Drive `clock` from a background thread, posting its events
///
/// Every `tick` the playhead moves by `tick * speed`. The thread exits once
/// the clock is stopped or the player service is gone.
pub fn spawn_ticker(
    clock: SharedClock,
    callbacks: EngineCallbacks,
    tick: Duration,
    speed: u64,
) -> std::io::Result<JoinHandle<()>> {
    let step_ms = (tick.as_millis() as u64).saturating_mul(speed);

    thread::Builder::new()
        .name("pocket-sim-clock".to_string())
        .spawn(move || {
            while !clock.is_stopped() {
                thread::sleep(tick);
                let (generation, events) = clock.tick(step_ms);
                for event in events {
                    if callbacks.post_stamped(generation, event).is_err() {
                        tracing::debug!("Player service gone, stopping clock");
                        return;
                    }
                }
            }
            tracing::debug!("Engine clock stopped");
        })
}

/// Transport engine backed by a virtual clock
///
/// Locators missing from the duration table fail to load, which exercises
/// the controller's unplayable-track handling.
pub struct SimulatedEngine {
    durations: HashMap<Locator, u64>,
    clock: SharedClock,
}

impl SimulatedEngine {
    pub fn new(tracks: &[Track]) -> Self {
        Self {
            durations: tracks
                .iter()
                .map(|track| (track.locator.clone(), track.duration_ms))
                .collect(),
            clock: SharedClock::default(),
        }
    }

    /// Handle for the ticker thread
    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }
}

impl TransportEngine for SimulatedEngine {
    fn load(&mut self, locator: &Locator) -> EngineResult<()> {
        let Some(&duration_ms) = self.durations.get(locator) else {
            return Err(EngineError::new(format!("no such resource: {}", locator)));
        };
        tracing::debug!("Engine: load {} ({} ms)", locator, duration_ms);
        self.clock.lock()?.load(duration_ms);
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        if self.clock.lock()?.play() {
            Ok(())
        } else {
            Err(EngineError::new("nothing loaded"))
        }
    }

    fn pause(&mut self) -> EngineResult<()> {
        self.clock.lock()?.pause();
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> EngineResult<()> {
        self.clock.lock()?.seek(position_ms);
        Ok(())
    }

    fn release(&mut self) {
        tracing::debug!("Engine: release");
        if let Ok(mut clock) = self.clock.lock() {
            clock.pause();
        }
        self.clock.stop();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.clock.generation() == generation
    }
}
