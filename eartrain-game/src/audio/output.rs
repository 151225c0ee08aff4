//! Audio output using cpal
//!
//! Opens the output device and runs a stream whose callback pulls frames from
//! the shared `VoiceSlot`.

use crate::audio::types::AudioFrame;
use crate::audio::voice::VoiceSlot;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Preferred stream sample rate (clips are resampled to whatever is chosen)
const PREFERRED_SAMPLE_RATE: u32 = 44100;

/// Audio output manager using cpal.
///
/// `Stream` is not `Send`; keep this on the thread that created it.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    /// Master volume stored as f32 bits so the callback reads it lock-free
    volume: Arc<AtomicU32>,
    /// Count of stream errors reported by cpal
    error_count: Arc<AtomicU32>,
}

impl AudioOutput {
    /// List available audio output devices.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open audio device for output.
    ///
    /// If the requested device cannot be found, falls back to the default device.
    pub fn open(device_name: Option<&str>, volume: f32) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let mut devices = host.output_devices().map_err(|e| {
                    Error::AudioOutput(format!("Failed to enumerate devices: {}", e))
                })?;

                match devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                    Some(dev) => {
                        info!("Found requested audio device: {}", name);
                        dev
                    }
                    None => {
                        warn!("Requested device '{}' not found, falling back to default device", name);
                        host.default_output_device().ok_or_else(|| {
                            Error::AudioOutput(format!(
                                "Device '{}' not found and no default device available",
                                name
                            ))
                        })?
                    }
                }
            }
            None => host
                .default_output_device()
                .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?,
        };

        info!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let (config, sample_format) = Self::get_best_config(&device)?;

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            volume: Arc::new(AtomicU32::new(volume.clamp(0.0, 1.0).to_bits())),
            error_count: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Prefer 44.1kHz stereo f32; otherwise take the device default.
    fn get_best_config(device: &Device) -> Result<(StreamConfig, SampleFormat)> {
        let mut supported_configs = device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?;

        let preferred = supported_configs.find(|config| {
            config.channels() == 2
                && config.min_sample_rate().0 <= PREFERRED_SAMPLE_RATE
                && config.max_sample_rate().0 >= PREFERRED_SAMPLE_RATE
                && config.sample_format() == SampleFormat::F32
        });

        if let Some(supported_config) = preferred {
            let sample_format = supported_config.sample_format();
            let config = supported_config
                .with_sample_rate(cpal::SampleRate(PREFERRED_SAMPLE_RATE))
                .config();
            return Ok((config, sample_format));
        }

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;

        let sample_format = supported_config.sample_format();
        Ok((supported_config.config(), sample_format))
    }

    /// Stream sample rate; clips must be resampled to this
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Number of stream errors cpal has reported
    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Start the output stream reading from `slot`.
    pub fn start(&mut self, slot: Arc<VoiceSlot>) -> Result<()> {
        info!("Starting audio stream");

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(slot)?,
            SampleFormat::I16 => self.build_stream::<i16>(slot)?,
            SampleFormat::U16 => self.build_stream::<u16>(slot)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn build_stream<T>(&self, slot: Arc<VoiceSlot>) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = self.config.channels as usize;
        let volume = Arc::clone(&self.volume);
        let error_count = Arc::clone(&self.error_count);
        let mut frames: Vec<AudioFrame> = Vec::new();

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let current_volume = f32::from_bits(volume.load(Ordering::Relaxed));

                    frames.resize(data.len() / channels, AudioFrame::zero());
                    slot.fill(&mut frames);

                    for (frame, audio_frame) in data.chunks_mut(channels).zip(frames.iter_mut()) {
                        audio_frame.apply_volume(current_volume);

                        let left = audio_frame.left.clamp(-1.0, 1.0);
                        let right = audio_frame.right.clamp(-1.0, 1.0);

                        for (idx, sample) in frame.iter_mut().enumerate() {
                            let value = if idx % 2 == 0 { left } else { right };
                            *sample = <T as cpal::Sample>::from_sample(value);
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_count.fetch_add(1, Ordering::Relaxed);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
    }

    /// Stop audio playback and drop the stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            info!("Stopping audio stream");
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        }
        Ok(())
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Error stopping audio output: {}", e);
        }
    }
}
