//! Note clip library
//!
//! Decodes each note's clip once at startup and keeps it in RAM at the output
//! sample rate. A clip that cannot be loaded is logged and left out; the game
//! plays silence for that note instead of failing.

use crate::audio::decoder::ClipDecoder;
use crate::audio::resampler::Resampler;
use crate::audio::types::ClipBuffer;
use crate::error::Result;
use eartrain_common::config::ClipMap;
use eartrain_common::Note;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Decoded clips keyed by note
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: HashMap<Note, ClipBuffer>,
}

impl ClipLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every note's clip from `sound_dir`, resampled to `sample_rate`.
    ///
    /// Never fails as a whole: missing or broken files are skipped with a warning.
    pub fn load(sound_dir: &Path, clip_map: &ClipMap, sample_rate: u32) -> Self {
        let mut library = Self::empty();

        for note in Note::ALL {
            let path = clip_map.path(sound_dir, note);
            match Self::load_clip(&path, sample_rate) {
                Ok(clip) => {
                    debug!("Clip for note {}: {} ms", note, clip.duration_ms());
                    library.insert(note, clip);
                }
                Err(e) => {
                    warn!("Clip for note {} unavailable ({}): {}", note, path.display(), e);
                }
            }
        }

        info!(
            "Loaded {}/{} note clips from {}",
            library.len(),
            Note::ALL.len(),
            sound_dir.display()
        );
        library
    }

    fn load_clip(path: &Path, sample_rate: u32) -> Result<ClipBuffer> {
        let (samples, source_rate) = ClipDecoder::decode_file(path)?;
        let samples = Resampler::resample(&samples, source_rate, sample_rate, 2)?;
        Ok(ClipBuffer::new(samples, sample_rate))
    }

    /// Add or replace a clip; it must already be at the output sample rate
    pub fn insert(&mut self, note: Note, clip: ClipBuffer) {
        self.clips.insert(note, clip);
    }

    pub fn get(&self, note: Note) -> Option<&ClipBuffer> {
        self.clips.get(&note)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Notes that will play silence, in scale order
    pub fn missing_notes(&self) -> Vec<Note> {
        Note::ALL
            .into_iter()
            .filter(|note| !self.clips.contains_key(note))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * channels as usize {
            let sample = ((i % 100) as i16 - 50) * 200;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn wav_clip_map() -> ClipMap {
        let mut map = ClipMap::default();
        for note in Note::ALL {
            map.set(note, format!("{}.wav", note.letter().to_lowercase()));
        }
        map
    }

    #[test]
    fn test_missing_directory_yields_empty_library() {
        let library = ClipLibrary::load(Path::new("/nonexistent/sound"), &ClipMap::default(), 44100);
        assert!(library.is_empty());
        assert_eq!(library.missing_notes(), Note::ALL.to_vec());
    }

    #[test]
    fn test_loads_available_clips_and_skips_the_rest() {
        let dir = TempDir::new().unwrap();
        write_wav(&dir.path().join("c.wav"), 44100, 1, 4410);
        write_wav(&dir.path().join("g.wav"), 44100, 2, 4410);
        std::fs::write(dir.path().join("a.wav"), b"not a wav file").unwrap();

        let library = ClipLibrary::load(dir.path(), &wav_clip_map(), 44100);

        assert_eq!(library.len(), 2);
        assert!(library.get(Note::C).is_some());
        assert!(library.get(Note::G).is_some());
        assert!(library.get(Note::A).is_none());
        assert_eq!(
            library.missing_notes(),
            vec![Note::D, Note::E, Note::F, Note::A, Note::B]
        );

        let c = library.get(Note::C).unwrap();
        assert!((4400..=4410).contains(&c.frame_count));
        assert_eq!(c.sample_rate, 44100);
    }

    #[test]
    fn test_clips_resampled_to_output_rate() {
        let dir = TempDir::new().unwrap();
        write_wav(&dir.path().join("e.wav"), 22050, 1, 2205);

        let library = ClipLibrary::load(dir.path(), &wav_clip_map(), 44100);
        let e = library.get(Note::E).unwrap();

        assert_eq!(e.sample_rate, 44100);
        assert!(
            (4400..=4420).contains(&e.frame_count),
            "Expected ~4410 frames, got {}",
            e.frame_count
        );
    }
}
