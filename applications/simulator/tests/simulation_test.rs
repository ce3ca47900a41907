//! End-to-end simulation tests
//!
//! Manifest on disk -> catalog -> player service with the simulated engine
//! and its ticker, running until the queue ends on its own.

use crossbeam_channel::{bounded, unbounded};
use pocket_core::{TrackCatalog, TrackId};
use pocket_mobile::{PlayerService, ServiceConfig};
use pocket_playback::{
    ChangeCause, ChannelObserver, EngineEvent, PlaybackObserver, PlaybackState, RepeatMode,
    TransportStatus,
};
use pocket_sim::engine::{spawn_ticker, SimulatedEngine};
use pocket_sim::manifest::load_manifest;
use std::io::Write;
use std::time::{Duration, Instant};

const MANIFEST: &str = r#"
[[track]]
id = "b"
title = "Second"
artist = "Band"
duration_ms = 1500
locator = "sim://b"

[[track]]
id = "a"
title = "first"
artist = "Band"
duration_ms = 1000
locator = "sim://a"

[[track]]
id = "c"
title = "Third"
duration_ms = 2000
locator = "sim://c"
"#;

fn write_manifest(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn wait_for(
    player: &pocket_mobile::PlayerHandle,
    done: impl Fn(&PlaybackState) -> bool,
) -> PlaybackState {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let state = player.current_state().unwrap();
        if done(&state) {
            return state;
        }
        assert!(Instant::now() < deadline, "timed out in {:?}", state);
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_queue_plays_through_to_the_end() {
    let manifest = write_manifest(MANIFEST);
    let catalog = load_manifest(manifest.path()).unwrap();
    let tracks = catalog.list_tracks().unwrap();
    let ids: Vec<&str> = tracks.iter().map(|track| track.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let (events_tx, events_rx) = unbounded();
    let observers: Vec<Box<dyn PlaybackObserver>> =
        vec![Box::new(ChannelObserver::new(events_tx))];
    let (clock_tx, clock_rx) = bounded(1);
    let engine_tracks = tracks.clone();
    let service = PlayerService::start(
        move |callbacks| {
            let engine = SimulatedEngine::new(&engine_tracks);
            clock_tx.send((engine.clock(), callbacks)).unwrap();
            engine
        },
        observers,
        ServiceConfig::default(),
    )
    .unwrap();
    let (clock, callbacks) = clock_rx.recv().unwrap();
    // 250 simulated ms per 1 ms tick
    let ticker = spawn_ticker(clock, callbacks, Duration::from_millis(1), 250).unwrap();

    let player = service.handle();
    player.play_track(tracks, TrackId::new("a")).unwrap();

    let state = wait_for(&player, |state| {
        state.status == TransportStatus::EndOfQueue
    });
    assert_eq!(state.current_index, Some(2));
    assert!(!state.is_playing);

    service.shutdown().unwrap();
    ticker.join().unwrap();

    let finished = events_rx
        .try_iter()
        .filter(|event| event.cause == ChangeCause::TrackFinished)
        .count();
    assert_eq!(finished, 3);
}

#[test]
fn test_unknown_locator_is_skipped() {
    let manifest = write_manifest(MANIFEST);
    let tracks = load_manifest(manifest.path())
        .unwrap()
        .list_tracks()
        .unwrap();

    // The engine only knows the last track
    let known = tracks[2..].to_vec();
    let service = PlayerService::start(
        move |_callbacks| SimulatedEngine::new(&known),
        Vec::new(),
        ServiceConfig::default(),
    )
    .unwrap();
    let player = service.handle();

    player.set_queue(tracks, None).unwrap();

    let state = player.current_state().unwrap();
    assert_eq!(state.current_index, Some(2));
    assert_eq!(state.status, TransportStatus::Stopped);
    // End of queue is not an error
    player.skip_next().unwrap();
    assert_eq!(
        player.current_state().unwrap().status,
        TransportStatus::EndOfQueue
    );
}

#[test]
fn test_repeat_all_keeps_cycling() {
    let manifest = write_manifest(MANIFEST);
    let tracks = load_manifest(manifest.path())
        .unwrap()
        .list_tracks()
        .unwrap();

    let mut config = ServiceConfig::default();
    config.playback.repeat = RepeatMode::All;

    let (events_tx, events_rx) = unbounded();
    let observers: Vec<Box<dyn PlaybackObserver>> =
        vec![Box::new(ChannelObserver::new(events_tx))];
    let (clock_tx, clock_rx) = bounded(1);
    let engine_tracks = tracks.clone();
    let service = PlayerService::start(
        move |callbacks| {
            let engine = SimulatedEngine::new(&engine_tracks);
            clock_tx.send((engine.clock(), callbacks)).unwrap();
            engine
        },
        observers,
        config,
    )
    .unwrap();
    let (clock, callbacks) = clock_rx.recv().unwrap();
    let ticker = spawn_ticker(clock, callbacks, Duration::from_millis(1), 500).unwrap();

    let player = service.handle();
    player.play_track(tracks, TrackId::new("c")).unwrap();

    // c -> a (wrap) -> b
    wait_for(&player, |state| state.current_index == Some(1));
    let state = player.current_state().unwrap();
    assert_ne!(state.status, TransportStatus::EndOfQueue);

    service.shutdown().unwrap();
    ticker.join().unwrap();

    assert!(events_rx.try_iter().all(|event| event.error.is_none()));
}

#[test]
fn test_finish_from_a_replaced_track_is_dropped() {
    let manifest = write_manifest(MANIFEST);
    let tracks = load_manifest(manifest.path())
        .unwrap()
        .list_tracks()
        .unwrap();

    // No ticker: events are posted by hand to pin down the interleaving
    let (clock_tx, clock_rx) = bounded(1);
    let engine_tracks = tracks.clone();
    let service = PlayerService::start(
        move |callbacks| {
            let engine = SimulatedEngine::new(&engine_tracks);
            clock_tx.send((engine.clock(), callbacks)).unwrap();
            engine
        },
        Vec::new(),
        ServiceConfig::default(),
    )
    .unwrap();
    let (clock, callbacks) = clock_rx.recv().unwrap();
    let player = service.handle();

    player.play_track(tracks, TrackId::new("a")).unwrap();
    let playing_a = clock.generation();

    // The user skips while the end of "a" is still on its way
    player.skip_next().unwrap();
    callbacks
        .post_stamped(playing_a, EngineEvent::Position(1_000))
        .unwrap();
    callbacks
        .post_stamped(playing_a, EngineEvent::Finished)
        .unwrap();

    let state = player.current_state().unwrap();
    assert_eq!(state.current_index, Some(1));
    assert_eq!(state.position_ms, 0);
    assert_eq!(state.status, TransportStatus::Playing);

    // Events from the track that is loaded now still count
    callbacks
        .post_stamped(clock.generation(), EngineEvent::Finished)
        .unwrap();
    assert_eq!(player.current_state().unwrap().current_index, Some(2));

    service.shutdown().unwrap();
}
