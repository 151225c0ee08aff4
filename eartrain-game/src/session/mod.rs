//! Session management: round state machine, target selection
//!
//! # Components
//! - `controller.rs`: GameController driving rounds and playback
//! - `state.rs`: SessionState record and snapshots
//! - `picker.rs`: Target note selection

pub mod controller;
pub mod picker;
pub mod state;

pub use controller::{GameController, Judgement, RoundOutcome};
pub use picker::{TargetPicker, UniformPicker};
pub use state::{Controls, SessionSnapshot, SessionState};
