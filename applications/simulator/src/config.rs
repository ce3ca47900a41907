/// Simulator configuration
use anyhow::{bail, Context, Result};
use pocket_mobile::ServiceConfig;
use pocket_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default tracing filter when neither `RUST_LOG` nor `log_filter` is set
pub const DEFAULT_LOG_FILTER: &str = "pocket_sim=info,pocket_playback=info,pocket_mobile=info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Track manifest (TOML)
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Engine clock period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Simulated milliseconds per real millisecond
    #[serde(default = "default_speed")]
    pub speed: u64,

    #[serde(default)]
    pub log_filter: Option<String>,

    /// Dispatcher channel capacity
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            tick_ms: default_tick_ms(),
            speed: default_speed(),
            log_filter: None,
            command_capacity: default_command_capacity(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` when given (it must exist), otherwise `pocket.toml` in
    /// the working directory if present. `POCKET__*` variables override
    /// both, e.g. `POCKET__PLAYBACK__SHUFFLE=true`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(true),
            ),
            None => settings.add_source(config::File::with_name("pocket").required(false)),
        };

        settings = settings.add_source(
            config::Environment::with_prefix("POCKET")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .context("Failed to read simulator configuration")?
            .try_deserialize()
            .context("Invalid simulator configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be greater than 0");
        }
        if self.speed == 0 {
            bail!("speed must be greater than 0");
        }
        self.service()
            .validate()
            .context("Invalid playback configuration")?;
        Ok(())
    }

    /// Tracing filter to install when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Settings for the player service
    pub fn service(&self) -> ServiceConfig {
        ServiceConfig {
            command_capacity: self.command_capacity,
            playback: self.playback.clone(),
        }
    }
}

// Default values
fn default_manifest() -> PathBuf {
    PathBuf::from("tracks.toml")
}

fn default_tick_ms() -> u64 {
    250
}

fn default_speed() -> u64 {
    1
}

fn default_command_capacity() -> usize {
    ServiceConfig::default().command_capacity
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_playback::RepeatMode;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.speed, 1);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let file = write_config(
            r#"
            manifest = "library.toml"
            speed = 20
            log_filter = "pocket_playback=debug"

            [playback]
            shuffle = true
            repeat = "all"
            shuffle_seed = 7
            "#,
        );

        let config = SimulatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.manifest, PathBuf::from("library.toml"));
        assert_eq!(config.speed, 20);
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.log_filter(), "pocket_playback=debug");
        assert!(config.playback.shuffle);
        assert_eq!(config.playback.repeat, RepeatMode::All);
        assert_eq!(config.playback.shuffle_seed, Some(7));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SimulatorConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = write_config("tick_ms = 0\n");
        assert!(SimulatorConfig::load(Some(file.path())).is_err());

        let file = write_config("[playback]\nprevious_restart_threshold_ms = 0\n");
        let error = SimulatorConfig::load(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", error).contains("previous_restart_threshold_ms"));
    }
}
