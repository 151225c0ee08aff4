//! Ear Trainer (eartrain) - Main entry point
//!
//! Plays the C major scale, a cue note and a random target, then asks the
//! player to name the target. Runs as an interactive terminal UI, or as a
//! line-oriented JSON process with `--headless`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eartrain_common::config::{self, GameTiming, TomlConfig, CONFIG_PATH_ENV, SOUND_DIR_ENV};
use eartrain_common::events::EventBus;
use eartrain_game::audio::{AudioOutput, AudioPlayer, ClipLibrary, DevicePlayer, SilentPlayer, VoiceSlot};
use eartrain_game::session::{GameController, UniformPicker};
use eartrain_game::ui;

/// Command-line arguments for eartrain
#[derive(Parser, Debug)]
#[command(name = "eartrain")]
#[command(about = "Ear training game: name the note you hear")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Folder containing the note clips
    #[arg(short, long, env = SOUND_DIR_ENV)]
    sound_dir: Option<PathBuf>,

    /// How long each scale and cue note sounds, in milliseconds
    #[arg(long)]
    note_duration_ms: Option<u64>,

    /// Pause after a guess before the next round, in milliseconds
    #[arg(long)]
    advance_delay_ms: Option<u64>,

    /// Number of cue notes after the scale
    #[arg(long)]
    cue_repeats: Option<u32>,

    /// Audio output device name
    #[arg(short, long)]
    device: Option<String>,

    /// Master volume (0.0 - 1.0)
    #[arg(long)]
    volume: Option<f32>,

    /// Seed for the target note sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Run without opening an audio device
    #[arg(long)]
    mute: bool,

    /// Read commands from stdin and print events as JSON lines
    #[arg(long)]
    headless: bool,

    /// Log file for the terminal UI (headless mode logs to stderr)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print available audio output devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_devices {
        for name in AudioOutput::list_devices().context("Failed to list audio devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let toml_config = TomlConfig::load_optional(args.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&args, &toml_config)?;

    let timing = GameTiming::resolve(
        args.note_duration_ms,
        args.advance_delay_ms,
        args.cue_repeats,
        &toml_config.timing,
    )
    .context("Invalid timing configuration")?;

    let volume = args.volume.or(toml_config.volume).unwrap_or(1.0);
    if !(0.0..=1.0).contains(&volume) {
        anyhow::bail!("Volume must be between 0.0 and 1.0, got {}", volume);
    }

    let sound_dir = config::resolve_sound_dir(args.sound_dir.clone(), toml_config.sound_dir.as_deref());
    let clip_map = toml_config.clip_map().context("Invalid [clips] table")?;

    info!("Starting eartrain v{}", env!("CARGO_PKG_VERSION"));
    info!("Sound folder: {}", sound_dir.display());
    info!(
        "Timing: note {}ms, advance {}ms, cue x{}",
        timing.note_duration.as_millis(),
        timing.advance_delay.as_millis(),
        timing.cue_repeats
    );

    // Output must outlive the game; dropping it stops the stream.
    let mut output = None;
    let player: Arc<dyn AudioPlayer> = if args.mute {
        info!("Audio muted");
        Arc::new(SilentPlayer)
    } else {
        let device = args.device.as_deref().or(toml_config.audio_device.as_deref());
        match AudioOutput::open(device, volume) {
            Ok(mut opened) => {
                let clips = ClipLibrary::load(&sound_dir, &clip_map, opened.sample_rate());
                let missing = clips.missing_notes();
                if !missing.is_empty() {
                    warn!("No clip loaded for {:?}; those notes will be silent", missing);
                }

                let slot = Arc::new(VoiceSlot::new());
                opened
                    .start(Arc::clone(&slot))
                    .context("Failed to start audio output")?;
                output = Some(opened);
                Arc::new(DevicePlayer::new(Arc::new(clips), slot))
            }
            Err(e) => {
                warn!("Audio output unavailable, continuing silently: {}", e);
                Arc::new(SilentPlayer)
            }
        }
    };

    let controller = GameController::new(
        player,
        Box::new(UniformPicker::new(args.seed.or(toml_config.seed))),
        timing,
        EventBus::default(),
    );

    if args.headless {
        ui::headless::run(controller).await.context("Headless session failed")?;
    } else {
        ui::terminal::run(controller).await.context("Terminal session failed")?;
    }

    if let Some(mut output) = output {
        if output.error_count() > 0 {
            warn!("Audio stream reported {} errors", output.error_count());
        }
        output.stop().context("Failed to stop audio output")?;
    }

    info!("eartrain stopped");
    Ok(())
}

/// RUST_LOG wins over the configured level. The terminal UI owns the screen,
/// so its logs go to a file; headless mode logs to stderr.
fn init_logging(args: &Args, toml_config: &TomlConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&toml_config.logging.level))
        .context("Invalid log level")?;

    if args.headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(());
    }

    let Some(path) = args
        .log_file
        .clone()
        .or_else(|| toml_config.logging.file.clone())
        .or_else(config::default_log_path)
    else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log folder {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
