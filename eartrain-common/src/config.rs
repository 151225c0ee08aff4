//! Configuration loading and default resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`EARTRAIN_*`, resolved by the binary's clap layer)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::note::Note;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming the clip directory
pub const SOUND_DIR_ENV: &str = "EARTRAIN_SOUND_DIR";

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "EARTRAIN_CONFIG";

/// Configuration loaded from a TOML file
///
/// Every field is optional; missing values fall back to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Directory holding the note clips
    #[serde(default)]
    pub sound_dir: Option<PathBuf>,

    /// Output device name (None = system default)
    #[serde(default)]
    pub audio_device: Option<String>,

    /// Master volume (0.0-1.0)
    #[serde(default)]
    pub volume: Option<f32>,

    /// RNG seed for reproducible target sequences
    #[serde(default)]
    pub seed: Option<u64>,

    /// Round timing
    #[serde(default)]
    pub timing: TimingConfig,

    /// Per-note clip file overrides, keyed by note letter
    #[serde(default)]
    pub clips: BTreeMap<String, String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[timing]` table; all values in milliseconds
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    #[serde(default)]
    pub note_duration_ms: Option<u64>,
    #[serde(default)]
    pub advance_delay_ms: Option<u64>,
    #[serde(default)]
    pub cue_repeats: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config file if one is present.
    ///
    /// An explicitly requested file must exist; the default location is
    /// optional and silently skipped when absent.
    pub fn load_optional(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timing.note_duration_ms == Some(0) {
            return Err(Error::Config(
                "timing.note_duration_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(volume) = self.volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(Error::Config(format!(
                    "volume must be between 0.0 and 1.0, got {}",
                    volume
                )));
            }
        }

        // Keys are case-insensitive, so "c" and "C" name the same note
        let mut seen: BTreeMap<Note, &str> = BTreeMap::new();
        for key in self.clips.keys() {
            let note = key
                .parse::<Note>()
                .map_err(|_| Error::Config(format!("Unknown note in [clips]: {:?}", key)))?;
            if let Some(previous) = seen.insert(note, key) {
                return Err(Error::Config(format!(
                    "Duplicate note {} in [clips]: {:?} and {:?}",
                    note, previous, key
                )));
            }
        }

        Ok(())
    }

    /// Clip file map with TOML overrides applied over the defaults
    pub fn clip_map(&self) -> Result<ClipMap> {
        let mut map = ClipMap::default();
        for (key, file) in &self.clips {
            let note: Note = key
                .parse()
                .map_err(|_| Error::Config(format!("Unknown note in [clips]: {:?}", key)))?;
            map.set(note, file.clone());
        }
        Ok(map)
    }
}

/// Round timing used by the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTiming {
    /// How long each scale/cue note sounds before the next step
    pub note_duration: Duration,
    /// Pause between judging a guess and starting the next round
    pub advance_delay: Duration,
    /// How many times the cue note repeats after the scale
    pub cue_repeats: u32,
}

impl Default for GameTiming {
    fn default() -> Self {
        Self {
            note_duration: Duration::from_millis(1000),
            advance_delay: Duration::from_millis(1000),
            cue_repeats: 2,
        }
    }
}

impl GameTiming {
    /// Layer optional overrides (CLI) over the TOML timing table over defaults
    pub fn resolve(
        cli_note_ms: Option<u64>,
        cli_advance_ms: Option<u64>,
        cli_cue_repeats: Option<u32>,
        toml: &TimingConfig,
    ) -> Result<Self> {
        let defaults = Self::default();

        let note_duration_ms = cli_note_ms
            .or(toml.note_duration_ms)
            .unwrap_or(defaults.note_duration.as_millis() as u64);
        if note_duration_ms == 0 {
            return Err(Error::Config(
                "note duration must be greater than zero".to_string(),
            ));
        }

        let advance_delay_ms = cli_advance_ms
            .or(toml.advance_delay_ms)
            .unwrap_or(defaults.advance_delay.as_millis() as u64);

        Ok(Self {
            note_duration: Duration::from_millis(note_duration_ms),
            advance_delay: Duration::from_millis(advance_delay_ms),
            cue_repeats: cli_cue_repeats
                .or(toml.cue_repeats)
                .unwrap_or(defaults.cue_repeats),
        })
    }
}

/// Static note -> clip file name mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipMap {
    files: [String; 7],
}

impl Default for ClipMap {
    fn default() -> Self {
        Self {
            files: Note::ALL.map(|note| note.default_clip_file().to_string()),
        }
    }
}

impl ClipMap {
    /// File name configured for a note
    pub fn file(&self, note: Note) -> &str {
        &self.files[note.index()]
    }

    /// Override the file for a note
    pub fn set(&mut self, note: Note, file: String) {
        self.files[note.index()] = file;
    }

    /// Full clip path for a note under `sound_dir`
    pub fn path(&self, sound_dir: &Path, note: Note) -> PathBuf {
        sound_dir.join(self.file(note))
    }
}

/// Sound directory resolution:
/// 1. Command-line argument or environment variable (clap merges both)
/// 2. TOML config file
/// 3. OS-dependent default if it exists, else `./data/sound`
pub fn resolve_sound_dir(cli_or_env: Option<PathBuf>, toml: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_or_env {
        return path;
    }

    if let Some(path) = toml {
        return path.to_path_buf();
    }

    get_default_sound_dir()
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("eartrain").join("config.toml"))
}

/// Default log file path for the terminal front end
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("eartrain").join("eartrain.log"))
}

/// OS-dependent default sound folder
fn get_default_sound_dir() -> PathBuf {
    let local = PathBuf::from("data").join("sound");

    match dirs::data_local_dir().map(|d| d.join("eartrain").join("sound")) {
        Some(path) if path.exists() => path,
        _ => local,
    }
}
