/// Pocket Sim - drive the Pocket Player service from a terminal
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::bounded;
use pocket_core::{TrackCatalog, TrackId};
use pocket_mobile::{NotificationObserver, PlayerService, ServiceError};
use pocket_playback::{PlaybackObserver, RepeatMode};
use pocket_sim::{
    config::SimulatorConfig,
    console::{
        format_state, format_track, parse_line, parse_repeat, ConsoleCommand, ConsoleNotification,
        HELP,
    },
    engine::{spawn_ticker, SimulatedEngine},
    manifest::load_manifest,
};
use std::{io::BufRead, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pocket-sim")]
#[command(about = "Pocket Player simulator with a virtual transport engine", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "POCKET_CONFIG")]
    config: Option<PathBuf>,

    /// Track manifest (overrides the configured one)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive player (default)
    Run {
        /// Start with shuffle on
        #[arg(long)]
        shuffle: bool,

        /// Initial repeat mode (off, one, all)
        #[arg(long, value_parser = parse_repeat)]
        repeat: Option<RepeatMode>,

        /// Queue the catalog and start playing this track id
        #[arg(long)]
        play: Option<String>,
    },
    /// Print the normalized catalog
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SimulatorConfig::load(cli.config.as_deref())?;
    if let Some(manifest) = cli.manifest {
        config.manifest = manifest;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Commands::Run {
        shuffle: false,
        repeat: None,
        play: None,
    }) {
        Commands::Run {
            shuffle,
            repeat,
            play,
        } => {
            if shuffle {
                config.playback.shuffle = true;
            }
            if let Some(repeat) = repeat {
                config.playback.repeat = repeat;
            }
            run(&config, play.map(TrackId::new))?;
        }
        Commands::List => {
            list(&config)?;
        }
    }

    Ok(())
}

fn list(config: &SimulatorConfig) -> Result<()> {
    let catalog = load_manifest(&config.manifest)?;
    for track in catalog.list_tracks()? {
        println!("{}", format_track(&track));
    }
    Ok(())
}

fn run(config: &SimulatorConfig, start: Option<TrackId>) -> Result<()> {
    let tracks = load_manifest(&config.manifest)?.list_tracks()?;
    tracing::info!(
        "Loaded {} tracks from {}",
        tracks.len(),
        config.manifest.display()
    );

    let observers: Vec<Box<dyn PlaybackObserver>> = vec![Box::new(NotificationObserver::new(
        ConsoleNotification::new(std::io::stdout()),
    ))];

    // The engine is built on the dispatcher thread; its clock comes back here
    let (clock_tx, clock_rx) = bounded(1);
    let engine_tracks = tracks.clone();
    let service = PlayerService::start(
        move |callbacks| {
            let engine = SimulatedEngine::new(&engine_tracks);
            let _ = clock_tx.send((engine.clock(), callbacks));
            engine
        },
        observers,
        config.service(),
    )
    .context("Failed to start player service")?;

    let (clock, callbacks) = clock_rx.recv().context("Engine was not created")?;
    let ticker = spawn_ticker(
        clock,
        callbacks,
        Duration::from_millis(config.tick_ms),
        config.speed,
    )
    .context("Failed to start engine clock")?;

    let player = service.handle();
    match start {
        Some(id) => report(player.play_track(tracks.clone(), id))?,
        None if !tracks.is_empty() => report(player.set_queue(tracks.clone(), None))?,
        None => println!("Catalog is empty; check {}", config.manifest.display()),
    }

    println!("{}", HELP);

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read command")?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::List => {
                for track in &tracks {
                    println!("{}", format_track(track));
                }
            }
            ConsoleCommand::State => {
                let state = player.current_state()?;
                let track = state
                    .current_queue_index()
                    .and_then(|index| tracks.get(index));
                println!("{}", format_state(&state, track));
            }
            ConsoleCommand::Queue(start) => report(player.set_queue(tracks.clone(), start))?,
            ConsoleCommand::Pick(id) => report(player.play_track(tracks.clone(), id))?,
            ConsoleCommand::Player(command) => report(player.send(command))?,
        }
    }

    tracing::info!("Shutting down");
    service.shutdown()?;
    ticker
        .join()
        .map_err(|_| anyhow!("Engine clock thread panicked"))?;

    Ok(())
}

/// Print rejected commands; only a dead service is fatal
fn report(result: pocket_mobile::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(ServiceError::Disconnected) => Err(ServiceError::Disconnected.into()),
        Err(e) => {
            eprintln!("! {}", e);
            Ok(())
        }
    }
}
