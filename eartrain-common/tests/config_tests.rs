//! Config file loading against the public API
//!
//! Unit tests in `src/config.rs` cover parsing; these exercise real files and
//! the way the binary layers CLI values over them.

use eartrain_common::config::{resolve_sound_dir, GameTiming, TomlConfig};
use eartrain_common::{Error, Note};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_clip_paths() {
    let dir = TempDir::new().unwrap();
    let sounds = dir.path().join("sounds");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "sound_dir = {:?}\n\n[clips]\nG = \"g-piano.wav\"\n",
            sounds.display().to_string()
        ),
    )
    .unwrap();

    let config = TomlConfig::load(&config_path).unwrap();
    let sound_dir = resolve_sound_dir(None, config.sound_dir.as_deref());
    assert_eq!(sound_dir, sounds);

    let clips = config.clip_map().unwrap();
    assert_eq!(clips.path(&sound_dir, Note::G), sounds.join("g-piano.wav"));
    assert_eq!(clips.path(&sound_dir, Note::A), sounds.join("a4.mp3"));
}

#[test]
fn test_cli_values_layer_over_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[timing]\nnote_duration_ms = 400\nadvance_delay_ms = 2000\n",
    )
    .unwrap();

    let config = TomlConfig::load_optional(Some(&config_path)).unwrap();
    let timing = GameTiming::resolve(None, Some(500), None, &config.timing).unwrap();

    assert_eq!(timing.note_duration, Duration::from_millis(400));
    assert_eq!(timing.advance_delay, Duration::from_millis(500));
    assert_eq!(timing.cue_repeats, GameTiming::default().cue_repeats);
}

#[test]
fn test_broken_file_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "volume = \"loud\"\n").unwrap();

    let err = TomlConfig::load(&config_path).unwrap_err();
    assert!(matches!(err, Error::TomlParse(_)), "got {:?}", err);
}

#[test]
fn test_clip_keys_differing_only_in_case_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[clips]\nc = \"c-soft.wav\"\nC = \"c-loud.wav\"\n\" g \" = \"g.wav\"\n",
    )
    .unwrap();

    let err = TomlConfig::load(&config_path).unwrap_err();
    match err {
        Error::Config(message) => {
            assert!(message.contains("Duplicate note C"), "got {:?}", message);
        }
        other => panic!("expected config error, got {:?}", other),
    }
}
