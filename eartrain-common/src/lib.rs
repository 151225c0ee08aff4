//! # eartrain Common Library
//!
//! Shared code for the eartrain workspace:
//! - The fixed note set and its clip file names
//! - Event types (GameEvent enum) and the EventBus
//! - TOML configuration loading and default resolution

pub mod config;
pub mod error;
pub mod events;
pub mod note;

pub use error::{Error, Result};
pub use note::Note;
