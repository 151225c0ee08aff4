//! Session state
//!
//! The single mutable record behind the controller. Created once, reset at the
//! start of every round, mutated in place for the life of the process.

use crate::audio::{AudioPlayer, PlaybackHandle};
use eartrain_common::Note;
use serde::Serialize;

/// Start control / guess input enablement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start_enabled: bool,
    pub input_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            start_enabled: true,
            input_enabled: false,
        }
    }
}

/// The clip the controller currently owns
pub(crate) struct ActivePlayback {
    pub(crate) note: Note,
    pub(crate) handle: Box<dyn PlaybackHandle>,
}

/// Complete session state
#[derive(Default)]
pub struct SessionState {
    /// True from scale start until a guess is judged
    pub in_progress: bool,
    /// Set by quit; polled at every sequence checkpoint
    pub cancel_requested: bool,
    /// Note to guess; None until the target starts playing
    pub target_note: Option<Note>,
    /// Round counter; a sequence only proceeds while it still owns the round
    pub round: u64,
    /// A judged round is waiting out the advance delay
    pub advance_pending: bool,
    pub controls: Controls,
    pub(crate) active_playback: Option<ActivePlayback>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new round and return its number
    pub(crate) fn begin_round(&mut self) -> u64 {
        self.round += 1;
        self.in_progress = true;
        self.cancel_requested = false;
        self.advance_pending = false;
        self.target_note = None;
        self.controls = Controls {
            start_enabled: false,
            input_enabled: false,
        };
        self.round
    }

    /// Whether the sequence for `round` may take its next step
    pub(crate) fn may_continue(&self, round: u64) -> bool {
        !self.cancel_requested && self.round == round
    }

    /// Stop whatever is playing, then start `note` as the only playback
    pub(crate) fn start_playback(&mut self, player: &dyn AudioPlayer, note: Note) {
        self.stop_playback();
        let handle = player.play(note);
        self.active_playback = Some(ActivePlayback { note, handle });
    }

    /// Stop and release the active playback, if any
    pub(crate) fn stop_playback(&mut self) -> Option<Note> {
        self.active_playback.take().map(|mut active| {
            active.handle.stop();
            active.note
        })
    }

    pub fn playing_note(&self) -> Option<Note> {
        self.active_playback.as_ref().map(|a| a.note)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            in_progress: self.in_progress,
            cancel_requested: self.cancel_requested,
            target_note: self.target_note,
            round: self.round,
            advance_pending: self.advance_pending,
            playing: self.playing_note(),
            controls: self.controls,
        }
    }
}

/// Comparable copy of the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub in_progress: bool,
    pub cancel_requested: bool,
    pub target_note: Option<Note>,
    pub round: u64,
    pub advance_pending: bool,
    pub playing: Option<Note>,
    pub controls: Controls,
}

impl SessionSnapshot {
    /// Nothing will change without new input: no sequence is playing and no
    /// auto-advance is scheduled
    pub fn is_settled(&self) -> bool {
        !self.advance_pending && (!self.in_progress || self.target_note.is_some())
    }
}
