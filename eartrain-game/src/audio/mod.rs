//! Audio collaborator for the session controller
//!
//! The controller only sees `AudioPlayer`: give it a note, get back a handle
//! that is already playing and can be stopped. It never waits for a clip to
//! finish; round timing comes from the controller's own timers, so stopping a
//! clip before its natural end is normal.

pub mod clips;
pub mod decoder;
pub mod output;
pub mod resampler;
pub mod types;
pub mod voice;

pub use clips::ClipLibrary;
pub use output::AudioOutput;
pub use types::{AudioFrame, ClipBuffer};
pub use voice::{DevicePlayer, VoiceSlot};

use eartrain_common::Note;

/// Starts note playback.
pub trait AudioPlayer: Send + Sync {
    /// Begin playing `note` and return the handle owning that playback.
    ///
    /// Must not block. A note without a playable clip still returns a handle;
    /// the round keeps running on its timers.
    fn play(&self, note: Note) -> Box<dyn PlaybackHandle>;
}

/// One started playback.
pub trait PlaybackHandle: Send {
    /// Stop this playback. Calling it again, or after another clip replaced
    /// this one, has no effect.
    fn stop(&mut self);
}

/// Player that produces no sound.
///
/// Used for `--mute` and as the fallback when no output device can be opened.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&self, _note: Note) -> Box<dyn PlaybackHandle> {
        Box::new(SilentHandle)
    }
}

/// Handle for a playback that has nothing to stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHandle;

impl PlaybackHandle for SilentHandle {
    fn stop(&mut self) {}
}
