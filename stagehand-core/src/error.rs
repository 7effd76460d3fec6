//! Error types for stagehand-core.

use thiserror::Error;

/// Main error type for the stagehand-core library.
///
/// Only configuration problems and playback start failures surface here.
/// Out-of-order calls (pausing a stopped timer, stopping a released sound)
/// are ignored by the runtime instead of being reported.
#[derive(Error, Debug)]
pub enum Error {
    // Config errors
    #[error("Failed to load config '{0}': {1}")]
    ConfigLoad(String, String),

    #[error("Failed to parse config '{0}': {1}")]
    ConfigParse(String, String),

    #[error("Config validation error in '{0}': {1}")]
    ConfigValidation(String, String),

    // Timer errors
    #[error("Invalid timer duration: {0} (must be finite and >= 0)")]
    InvalidDuration(f64),

    // Audio errors
    #[error("Audio buffer is empty")]
    EmptyBuffer,

    #[error("Invalid jitter range [{min}, {max}]")]
    InvalidJitter { min: f32, max: f32 },

    #[error("Failed to start playback: {0}")]
    PlaybackStart(String),

    #[error("No audio output device available: {0}")]
    NoAudioDevice(String),

    #[error("Failed to decode sound '{0}': {1}")]
    SoundDecode(String, String),

    // Generic errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
