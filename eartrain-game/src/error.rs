//! Error types for eartrain-game
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! The game logic itself never fails; these cover the ambient layers (config,
//! audio device, clip decoding, terminal I/O).

use thiserror::Error;

/// Main error type for eartrain-game
#[derive(Error, Debug)]
pub enum Error {
    /// Errors bubbled up from the common crate (config parsing, note lookup)
    #[error(transparent)]
    Common(#[from] eartrain_common::Error),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Terminal setup or rendering errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Event serialization errors (headless output)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File and stream I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using eartrain-game Error
pub type Result<T> = std::result::Result<T, Error>;
