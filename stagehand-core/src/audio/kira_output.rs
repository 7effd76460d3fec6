//! Playback port backed by a kira `AudioManager`.
//!
//! One `AudioManager` (a single cpal stream with kira's internal mixer) serves
//! every instance. The port owns the manager, so whoever owns the registry owns
//! the audio output; there is no process-wide handle.

use std::path::Path;
use std::time::Duration;

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::sound::PlaybackState;
use kira::{
    AudioManager, AudioManagerSettings, Decibels, DefaultBackend, PlaybackRate, StartTime, Tween,
};

use crate::audio::port::{PlaybackHandle, PlaybackParams, SoundBuffer, SoundPlaybackPort};
use crate::error::{Error, Result};

/// Converts a linear volume (0.0-1.0) to kira decibels.
pub fn volume_to_db(volume: f32) -> Decibels {
    if volume <= 0.001 {
        Decibels::SILENCE
    } else {
        Decibels((20.0 * volume.log10()).max(Decibels::SILENCE.0))
    }
}

fn immediate() -> Tween {
    Tween {
        duration: Duration::ZERO,
        ..Default::default()
    }
}

/// Decoded sound data that can be played any number of times.
#[derive(Clone)]
pub struct KiraSound {
    data: StaticSoundData,
}

impl KiraSound {
    /// Loads and decodes an audio file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = StaticSoundData::from_file(path)
            .map_err(|e| Error::SoundDecode(path.display().to_string(), e.to_string()))?;
        tracing::debug!(
            "Loaded {} ({:.2}s)",
            path.display(),
            data.duration().as_secs_f64()
        );
        Ok(Self { data })
    }
}

impl SoundBuffer for KiraSound {
    fn length_secs(&self) -> f64 {
        self.data.duration().as_secs_f64()
    }

    fn is_empty(&self) -> bool {
        self.data.num_frames() == 0
    }
}

/// A playing kira sound.
pub struct KiraHandle {
    handle: StaticSoundHandle,
}

impl PlaybackHandle for KiraHandle {
    fn set_volume(&mut self, volume: f32) {
        self.handle.set_volume(volume_to_db(volume), immediate());
    }

    fn stop_and_release(&mut self) {
        self.handle.stop(immediate());
    }

    fn is_finished(&self) -> bool {
        matches!(self.handle.state(), PlaybackState::Stopped)
    }
}

/// [`SoundPlaybackPort`] playing through the default audio device.
pub struct KiraPlaybackPort {
    manager: AudioManager<DefaultBackend>,
}

impl KiraPlaybackPort {
    /// Opens the default output device.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| Error::NoAudioDevice(e.to_string()))?;
        tracing::info!("Audio output initialized (kira)");
        Ok(Self { manager })
    }
}

impl SoundPlaybackPort for KiraPlaybackPort {
    type Buffer = KiraSound;
    type Handle = KiraHandle;

    fn start(&mut self, buffer: &KiraSound, params: &PlaybackParams) -> Result<KiraHandle> {
        let data = buffer
            .data
            .clone()
            .volume(volume_to_db(params.volume))
            .playback_rate(PlaybackRate(f64::from(params.pitch)))
            .start_time(StartTime::Delayed(Duration::from_secs_f64(params.delay.max(0.0))));
        let data = if params.looping {
            data.loop_region(..)
        } else {
            data
        };

        let handle = self
            .manager
            .play(data)
            .map_err(|e| Error::PlaybackStart(e.to_string()))?;
        Ok(KiraHandle { handle })
    }

    fn set_output_gain(&mut self, gain: f32) {
        self.manager
            .main_track()
            .set_volume(volume_to_db(gain), Tween::default());
    }
}
