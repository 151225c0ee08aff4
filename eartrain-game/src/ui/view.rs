//! Render state folded from game events
//!
//! The view owns the guess input buffer; everything else mirrors what the
//! controller last reported.

use eartrain_common::events::{GameEvent, Status};
use eartrain_common::Note;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub status: Status,
    /// Underline state per note, indexed by `Note::index`
    pub indicators: [bool; 7],
    pub start_enabled: bool,
    pub input_enabled: bool,
    pub input: String,
    pub round: u64,
    /// Tally for the current run of the program (not persisted)
    pub correct: u32,
    pub judged: u32,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            indicators: [false; 7],
            start_enabled: true,
            input_enabled: false,
            input: String::new(),
            round: 0,
            correct: 0,
            judged: 0,
        }
    }
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RoundStarted { round, .. } => self.round = *round,
            GameEvent::StatusChanged { status } => self.status = status.clone(),
            GameEvent::ControlsChanged {
                start_enabled,
                input_enabled,
            } => {
                self.start_enabled = *start_enabled;
                self.input_enabled = *input_enabled;
            }
            GameEvent::NoteIndicator { note, active } => {
                self.indicators[note.index()] = *active;
            }
            GameEvent::IndicatorsCleared => self.indicators = [false; 7],
            GameEvent::RoundJudged { correct, .. } => {
                self.judged += 1;
                if *correct {
                    self.correct += 1;
                }
            }
            GameEvent::InputReset => self.input.clear(),
            GameEvent::RoundCancelled { .. } => {}
        }
    }

    pub fn is_underlined(&self, note: Note) -> bool {
        self.indicators[note.index()]
    }

    /// Typed characters are dropped while input is disabled
    pub fn push_char(&mut self, c: char) {
        if self.input_enabled && !c.is_control() {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.input_enabled {
            self.input.pop();
        }
    }

    /// Text to submit, if the submit control is live
    pub fn submission(&self) -> Option<&str> {
        self.input_enabled.then_some(self.input.as_str())
    }
}
