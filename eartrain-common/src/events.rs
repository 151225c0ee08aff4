//! Event types for the eartrain event system
//!
//! The session controller's only outputs besides audio are `GameEvent`s. They
//! are broadcast on an `EventBus`; the terminal and headless front ends fold
//! them into what the player sees.

use crate::note::Note;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Status line content reported by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Status {
    /// No round has been started yet
    Idle,
    /// Reference scale and cue are playing
    PlayingScale,
    /// Target note is playing, guess input is open
    AwaitingGuess,
    /// Last guess matched the target
    Correct,
    /// Last guess did not match; carries the actual target
    Incorrect { answer: Note },
    /// Player quit the round
    Stopped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("Press Ctrl+S to start"),
            Status::PlayingScale => f.write_str("Playing the scale..."),
            Status::AwaitingGuess => f.write_str("Which note did you hear?"),
            Status::Correct => f.write_str("Correct!"),
            Status::Incorrect { answer } => write!(f, "Wrong, the answer was {}", answer),
            Status::Stopped => f.write_str("Game stopped"),
        }
    }
}

/// eartrain event types
///
/// Events are broadcast via EventBus and serialize to tagged JSON for the
/// headless front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A new round began (scale about to play)
    RoundStarted {
        round: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Status line changed
    StatusChanged { status: Status },

    /// Start control / guess input enablement changed
    ControlsChanged {
        start_enabled: bool,
        input_enabled: bool,
    },

    /// Visual playback indicator for one note set or cleared
    NoteIndicator { note: Note, active: bool },

    /// All note indicators cleared at once (quit)
    IndicatorsCleared,

    /// A guess was judged
    RoundJudged {
        round: u64,
        guess: String,
        target: Note,
        correct: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Guess field should be cleared and focused before the next round
    InputReset,

    /// Player cancelled the current round
    RoundCancelled {
        round: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl GameEvent {
    /// Event type name (matches the serialized `type` tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::RoundStarted { .. } => "RoundStarted",
            GameEvent::StatusChanged { .. } => "StatusChanged",
            GameEvent::ControlsChanged { .. } => "ControlsChanged",
            GameEvent::NoteIndicator { .. } => "NoteIndicator",
            GameEvent::IndicatorsCleared => "IndicatorsCleared",
            GameEvent::RoundJudged { .. } => "RoundJudged",
            GameEvent::InputReset => "InputReset",
            GameEvent::RoundCancelled { .. } => "RoundCancelled",
        }
    }
}

/// Broadcast channel for `GameEvent`s
///
/// Cloning the bus clones the sender; all clones feed the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
