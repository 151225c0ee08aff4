//! Clip decoder using symphonia
//!
//! Decodes a note clip (MP3, WAV, FLAC, Vorbis) to interleaved stereo f32 PCM.

use crate::error::{Error, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Whole-file decoder for short clips.
pub struct ClipDecoder;

impl ClipDecoder {
    /// Decode an entire audio file.
    ///
    /// # Returns
    /// - `samples`: Interleaved stereo f32 samples (mono duplicated, extra channels dropped)
    /// - `sample_rate`: Source sample rate (before resampling)
    ///
    /// # Errors
    /// - Failed to open file
    /// - Unsupported audio format
    /// - No decodable audio track
    pub fn decode_file(path: &Path) -> Result<(Vec<f32>, u32)> {
        debug!("Decoding clip: {}", path.display());

        let file = std::fs::File::open(path)
            .map_err(|e| Error::Decode(format!("Failed to open file {}: {}", path.display(), e)))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext_str) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext_str);
        }

        let detected = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to detect format: {}", e)))?;

        let mut format = detected.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| Error::Decode("Sample rate not found".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut stereo = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!("Decode error: {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count();

            let buf = sample_buf
                .get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
            if buf.capacity() < decoded.frames() * channels {
                *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
            }
            buf.copy_interleaved_ref(decoded);

            Self::append_as_stereo(buf.samples(), channels, &mut stereo);
        }

        if stereo.is_empty() {
            return Err(Error::Decode(format!(
                "No audio decoded from {}",
                path.display()
            )));
        }

        debug!(
            "Decoded {} frames at {}Hz from {}",
            stereo.len() / 2,
            sample_rate,
            path.display()
        );

        Ok((stereo, sample_rate))
    }

    /// Append interleaved samples with `channels` channels as interleaved stereo.
    ///
    /// Mono is duplicated to both sides; channels beyond the first two are dropped.
    fn append_as_stereo(samples: &[f32], channels: usize, output: &mut Vec<f32>) {
        if channels == 0 {
            return;
        }

        for frame in samples.chunks_exact(channels) {
            let left = frame[0];
            let right = if channels > 1 { frame[1] } else { frame[0] };
            output.push(left);
            output.push(right);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_duplicated_to_stereo() {
        let mut out = Vec::new();
        ClipDecoder::append_as_stereo(&[0.1, 0.2], 1, &mut out);
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_surround_downmixed_to_front_pair() {
        let mut out = Vec::new();
        ClipDecoder::append_as_stereo(&[0.1, 0.2, 0.9, 0.3, 0.4, 0.9], 3, &mut out);
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = ClipDecoder::decode_file(Path::new("/nonexistent/c4.mp3"));
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
