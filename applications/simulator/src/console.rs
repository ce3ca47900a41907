//! Interactive console: command parsing and terminal output

use anyhow::{anyhow, bail, Context, Result};
use pocket_core::{Track, TrackId};
use pocket_mobile::{Command, NotificationSink, NowPlayingCard};
use pocket_playback::{PlaybackState, RepeatMode, TransportStatus};
use std::io::Write;

/// Help text printed by `help`
pub const HELP: &str = "\
commands:
  list                 show the catalog
  queue [id]           queue the whole catalog, optionally starting at id
  pick <id>            queue the catalog and play id
  play | pause         start or pause playback
  next | prev          skip forward or back
  seek <seconds>       jump within the current track
  shuffle              toggle shuffle
  repeat <off|one|all> set the repeat mode
  state                print the player state
  quit                 shut down";

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// A command that needs no catalog lookup
    Player(Command),

    /// Queue the catalog, optionally starting at a track
    Queue(Option<TrackId>),

    /// Queue the catalog and play a track
    Pick(TrackId),

    List,
    State,
    Help,
    Quit,
}

/// Parse a console line; `None` for blank input
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "play" => ConsoleCommand::Player(Command::Play),
        "pause" => ConsoleCommand::Player(Command::Pause),
        "next" | "n" => ConsoleCommand::Player(Command::SkipNext),
        "prev" | "previous" | "p" => ConsoleCommand::Player(Command::SkipPrevious),
        "shuffle" | "s" => ConsoleCommand::Player(Command::ToggleShuffle),
        "seek" => {
            let seconds: f64 = argument
                .ok_or_else(|| anyhow!("seek needs a position in seconds"))?
                .parse()
                .context("Invalid seek position")?;
            if !seconds.is_finite() || seconds < 0.0 {
                bail!("Seek position must be a non-negative number of seconds");
            }
            ConsoleCommand::Player(Command::Seek((seconds * 1000.0) as u64))
        }
        "repeat" => {
            let mode = argument.ok_or_else(|| anyhow!("repeat needs off, one or all"))?;
            ConsoleCommand::Player(Command::SetRepeatMode(parse_repeat(mode)?))
        }
        "queue" => ConsoleCommand::Queue(argument.map(TrackId::from)),
        "pick" => ConsoleCommand::Pick(TrackId::from(
            argument.ok_or_else(|| anyhow!("pick needs a track id"))?,
        )),
        "list" | "ls" => ConsoleCommand::List,
        "state" => ConsoleCommand::State,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => bail!("Unknown command '{}' (try 'help')", other),
    };

    Ok(Some(command))
}

/// Parse a repeat mode name
pub fn parse_repeat(name: &str) -> Result<RepeatMode> {
    match name.to_ascii_lowercase().as_str() {
        "off" => Ok(RepeatMode::Off),
        "one" => Ok(RepeatMode::One),
        "all" => Ok(RepeatMode::All),
        other => bail!("Unknown repeat mode '{}' (expected off, one or all)", other),
    }
}

/// `m:ss`
pub fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_track(track: &Track) -> String {
    format!(
        "{:>6}  {} - {} ({})",
        track.id,
        track.title,
        track.artist,
        format_time(track.duration_ms)
    )
}

pub fn format_state(state: &PlaybackState, track: Option<&Track>) -> String {
    let status = match state.status {
        TransportStatus::Empty => "empty",
        TransportStatus::Stopped => "stopped",
        TransportStatus::Playing => "playing",
        TransportStatus::Paused => "paused",
        TransportStatus::EndOfQueue => "end of queue",
    };
    let now = track.map_or_else(
        || "-".to_string(),
        |track| {
            format!(
                "{} {}/{}",
                track.title,
                format_time(state.position_ms),
                format_time(track.duration_ms)
            )
        },
    );

    format!(
        "[{}] {} | position {:?} of {} | shuffle {} | repeat {:?}",
        status,
        now,
        state.current_index,
        state.play_order.len(),
        if state.shuffle_enabled { "on" } else { "off" },
        state.repeat_mode
    )
}

/// Renders the now-playing notification as a terminal line
pub struct ConsoleNotification<W> {
    out: W,
}

impl<W: Write + Send> ConsoleNotification<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> NotificationSink for ConsoleNotification<W> {
    fn show(&mut self, card: &NowPlayingCard) {
        let buttons: Vec<&str> = card.actions.iter().map(|action| action.label()).collect();
        let pin = if card.ongoing { "*" } else { " " };
        if let Err(e) = writeln!(
            self.out,
            "{} {} - {}  [{}]",
            pin,
            card.title,
            card.text,
            buttons.join(" | ")
        ) {
            tracing::warn!("Failed to render notification: {}", e);
        }
    }

    fn clear(&mut self) {
        if let Err(e) = writeln!(self.out, "  (notification removed)") {
            tracing::warn!("Failed to render notification: {}", e);
        }
    }
}
