//! Single-voice playback shared with the output callback
//!
//! `VoiceSlot` holds at most one clip at a time. Starting a voice replaces
//! whatever was playing; stopping checks the voice id so a stale handle can
//! never silence its successor.

use super::{AudioPlayer, ClipLibrary, PlaybackHandle, SilentHandle};
use crate::audio::types::{AudioFrame, ClipBuffer};
use eartrain_common::Note;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

struct Voice {
    id: u64,
    clip: ClipBuffer,
    position: usize,
}

/// The clip currently feeding the output stream
pub struct VoiceSlot {
    voice: Mutex<Option<Voice>>,
    next_id: AtomicU64,
}

impl VoiceSlot {
    pub fn new() -> Self {
        Self {
            voice: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Voice>> {
        self.voice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current voice with `clip`, returning the new voice id
    pub fn start(&self, clip: ClipBuffer) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        *self.lock() = Some(Voice {
            id,
            clip,
            position: 0,
        });
        id
    }

    /// Stop voice `id` if it is still the current one
    pub fn stop(&self, id: u64) -> bool {
        let mut voice = self.lock();
        match voice.as_ref() {
            Some(current) if current.id == id => {
                *voice = None;
                true
            }
            _ => false,
        }
    }

    /// Id of the voice still producing audio
    pub fn active_voice(&self) -> Option<u64> {
        self.lock().as_ref().map(|v| v.id)
    }

    /// Fill one device buffer under a single lock; silence once the voice
    /// runs out. Finished voices are released.
    pub fn fill(&self, frames: &mut [AudioFrame]) {
        let mut slot = self.lock();
        let mut written = 0;

        if let Some(voice) = slot.as_mut() {
            for out in frames.iter_mut() {
                match voice.clip.frame(voice.position) {
                    Some(frame) => {
                        *out = frame;
                        voice.position += 1;
                        written += 1;
                    }
                    None => break,
                }
            }
            if voice.clip.frame(voice.position).is_none() {
                *slot = None;
            }
        }

        frames[written..].fill(AudioFrame::zero());
    }
}

impl Default for VoiceSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// `AudioPlayer` backed by decoded clips and a cpal stream reading the slot
pub struct DevicePlayer {
    clips: Arc<ClipLibrary>,
    slot: Arc<VoiceSlot>,
}

impl DevicePlayer {
    pub fn new(clips: Arc<ClipLibrary>, slot: Arc<VoiceSlot>) -> Self {
        Self { clips, slot }
    }
}

impl AudioPlayer for DevicePlayer {
    fn play(&self, note: Note) -> Box<dyn PlaybackHandle> {
        match self.clips.get(note) {
            Some(clip) => {
                let id = self.slot.start(clip.clone());
                debug!("Started voice {} for note {}", id, note);
                Box::new(DeviceHandle {
                    slot: Arc::clone(&self.slot),
                    id,
                })
            }
            None => {
                // Keep the one-clip invariant: whatever was audible stops.
                if let Some(previous) = self.slot.active_voice() {
                    self.slot.stop(previous);
                }
                warn!("No clip loaded for note {}, playing silence", note);
                Box::new(SilentHandle)
            }
        }
    }
}

struct DeviceHandle {
    slot: Arc<VoiceSlot>,
    id: u64,
}

impl PlaybackHandle for DeviceHandle {
    fn stop(&mut self) {
        if self.slot.stop(self.id) {
            debug!("Stopped voice {}", self.id);
        }
    }
}
