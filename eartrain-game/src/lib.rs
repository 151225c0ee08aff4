//! # eartrain Game Library (eartrain-game)
//!
//! Ear-training game: plays a reference scale and cue note, then a random
//! target note, and judges the player's typed guess.
//!
//! **Architecture:** one session controller owning all round state, driving an
//! `AudioPlayer` collaborator (symphonia + rubato + cpal) and reporting to the
//! front ends through `GameEvent`s.

pub mod audio;
pub mod error;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
pub use session::{GameController, RoundOutcome};
