//! Stagehand Core - per-frame runtime pieces for interactive applications.
//!
//! This library provides:
//! - A countdown timer with milestone and completion notifications
//! - An audio instance registry with exclusive music, concurrent effects and fade-out release
//! - A kira-backed playback port (feature `kira`, on by default)
//! - Configuration loading and validation for both
//! - FFI layer for engine hosts
//!
//! Both subsystems are advanced by the host once per frame with the elapsed
//! time; nothing blocks or spawns threads.
//!
//! # Example
//!
//! ```rust,no_run
//! use stagehand_core::timer::CountdownTimer;
//!
//! let mut timer = CountdownTimer::new(3.0).unwrap();
//! timer.on_milestone(|n| println!("{}...", n));
//! timer.on_complete(|| println!("go"));
//! timer.restart();
//!
//! // Once per frame:
//! timer.tick(1.0 / 60.0);
//! ```

pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod ffi;
pub mod timer;

pub use error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::audio::{
        AudioInstanceRegistry, Category, FadeState, InstanceId, InstanceSnapshot, PlayOptions,
        PlaybackHandle, PlaybackParams, SoundBuffer, SoundPlaybackPort,
    };
    #[cfg(feature = "kira")]
    pub use crate::audio::{KiraPlaybackPort, KiraSound};
    pub use crate::clock::{FrameClock, SystemFrameClock};
    pub use crate::config::{
        AudioConfig, ConfigLoader, DisplayMode, JitterRange, StagehandConfig, TimerConfig,
    };
    pub use crate::error::{Error, Result};
    pub use crate::timer::{CountdownTimer, DisplayPort, ListenerId, TimerState};
}
