//! Playback port: the boundary between the registry and an audio backend.

use crate::error::Result;

/// Decoded audio data that can be started any number of times.
pub trait SoundBuffer {
    /// Natural playback length in seconds at unit pitch.
    fn length_secs(&self) -> f64;

    /// True when the buffer holds no audio frames.
    fn is_empty(&self) -> bool;
}

/// A started sound owned by the registry until it is released.
pub trait PlaybackHandle {
    /// Sets the instance volume (linear, 0.0-1.0).
    fn set_volume(&mut self, volume: f32);

    /// Stops output and frees the backend resource. Must tolerate repeated calls.
    fn stop_and_release(&mut self);

    /// True if the backend already stopped this sound on its own.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Parameters for starting a sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParams {
    /// Linear volume (0.0-1.0).
    pub volume: f32,
    /// Playback rate multiplier (1.0 is the recorded pitch).
    pub pitch: f32,
    pub looping: bool,
    /// Seconds between the request and audible output.
    pub delay: f64,
}

/// Audio backend that turns buffers into playing handles.
pub trait SoundPlaybackPort {
    type Buffer: SoundBuffer;
    type Handle: PlaybackHandle;

    /// Starts `buffer` with `params`. An error means nothing was started.
    fn start(&mut self, buffer: &Self::Buffer, params: &PlaybackParams) -> Result<Self::Handle>;

    /// Sets the global output gain applied on top of every instance volume.
    fn set_output_gain(&mut self, gain: f32);
}
