//! Core audio data types
//!
//! Structures for decoded note clips and the frames handed to the output callback.

use std::sync::Arc;

/// Decoded note clip ready for playback.
///
/// **Format:**
/// - Samples are f32 (floating point -1.0 to 1.0)
/// - Stereo interleaved: [L, R, L, R, ...]
/// - Sample rate matches the output device after resampling
#[derive(Debug, Clone)]
pub struct ClipBuffer {
    /// PCM audio samples (interleaved stereo)
    pub samples: Arc<Vec<f32>>,

    /// Sample rate of `samples`
    pub sample_rate: u32,

    /// Number of stereo frames (samples.len() / 2)
    pub frame_count: usize,
}

impl ClipBuffer {
    /// Wrap interleaved stereo samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let frame_count = samples.len() / 2;
        Self {
            samples: Arc::new(samples),
            sample_rate,
            frame_count,
        }
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frame_count as u64 * 1000) / self.sample_rate as u64
    }

    /// Frame at `index`, or None past the end of the clip
    pub fn frame(&self, index: usize) -> Option<AudioFrame> {
        if index >= self.frame_count {
            return None;
        }
        let base = index * 2;
        Some(AudioFrame::from_stereo(
            self.samples[base],
            self.samples[base + 1],
        ))
    }
}

/// Single stereo audio frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFrame {
    /// Left channel sample
    pub left: f32,

    /// Right channel sample
    pub right: f32,
}

impl AudioFrame {
    /// Create a silent frame (0.0, 0.0)
    pub fn zero() -> Self {
        AudioFrame { left: 0.0, right: 0.0 }
    }

    /// Create a frame from left and right samples
    pub fn from_stereo(left: f32, right: f32) -> Self {
        AudioFrame { left, right }
    }

    /// Apply volume scaling to both channels
    pub fn apply_volume(&mut self, volume: f32) {
        self.left *= volume;
        self.right *= volume;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_buffer_frames() {
        let clip = ClipBuffer::new(vec![0.1, 0.2, 0.3, 0.4], 2);
        assert_eq!(clip.frame_count, 2);
        assert_eq!(clip.duration_ms(), 1000);
        assert_eq!(clip.frame(1), Some(AudioFrame::from_stereo(0.3, 0.4)));
        assert_eq!(clip.frame(2), None);
    }

    #[test]
    fn test_apply_volume() {
        let mut frame = AudioFrame::from_stereo(0.5, -0.5);
        frame.apply_volume(0.5);
        assert_eq!(frame, AudioFrame::from_stereo(0.25, -0.25));
    }
}
