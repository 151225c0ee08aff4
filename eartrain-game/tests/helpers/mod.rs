//! Shared fakes for controller tests

#![allow(dead_code)]

use eartrain_common::config::GameTiming;
use eartrain_common::events::{EventBus, GameEvent};
use eartrain_common::Note;
use eartrain_game::audio::{AudioPlayer, PlaybackHandle};
use eartrain_game::session::{GameController, TargetPicker};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCall {
    Started(Note),
    Stopped(Note),
}

/// Player that records every start and stop
#[derive(Clone, Default)]
pub struct RecordingPlayer {
    log: Arc<Mutex<Vec<PlayerCall>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<Note> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlayerCall::Started(note) => Some(note),
                PlayerCall::Stopped(_) => None,
            })
            .collect()
    }

    /// Notes started but not yet stopped, in start order
    pub fn active(&self) -> Vec<Note> {
        let mut active = Vec::new();
        for call in self.calls() {
            match call {
                PlayerCall::Started(note) => active.push(note),
                PlayerCall::Stopped(note) => {
                    if let Some(pos) = active.iter().position(|n| *n == note) {
                        active.remove(pos);
                    }
                }
            }
        }
        active
    }

    /// Walk the log and fail if two clips were ever audible together
    pub fn assert_single_voice(&self) {
        let mut audible = 0i32;
        for (i, call) in self.calls().iter().enumerate() {
            match call {
                PlayerCall::Started(_) => audible += 1,
                PlayerCall::Stopped(_) => audible -= 1,
            }
            assert!(
                (0..=1).contains(&audible),
                "{} clips audible after call {} ({:?})",
                audible,
                i,
                call
            );
        }
    }
}

impl AudioPlayer for RecordingPlayer {
    fn play(&self, note: Note) -> Box<dyn PlaybackHandle> {
        self.log.lock().unwrap().push(PlayerCall::Started(note));
        Box::new(RecordingHandle {
            note,
            log: Arc::clone(&self.log),
            stopped: false,
        })
    }
}

struct RecordingHandle {
    note: Note,
    log: Arc<Mutex<Vec<PlayerCall>>>,
    stopped: bool,
}

impl PlaybackHandle for RecordingHandle {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.log.lock().unwrap().push(PlayerCall::Stopped(self.note));
        }
    }
}

/// Picker returning queued notes, then C once the queue runs dry
pub struct ScriptedPicker {
    targets: VecDeque<Note>,
}

impl ScriptedPicker {
    pub fn new(targets: impl IntoIterator<Item = Note>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }
}

impl TargetPicker for ScriptedPicker {
    fn pick(&mut self) -> Note {
        self.targets.pop_front().unwrap_or(Note::C)
    }
}

/// Controller with default timing (1s notes, 1s advance, cue twice)
pub fn controller_with(
    targets: impl IntoIterator<Item = Note>,
) -> (GameController, RecordingPlayer) {
    let player = RecordingPlayer::new();
    let controller = GameController::new(
        Arc::new(player.clone()),
        Box::new(ScriptedPicker::new(targets)),
        GameTiming::default(),
        EventBus::new(1024),
    );
    (controller, player)
}

/// Everything currently queued on a receiver
pub fn drain(receiver: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
