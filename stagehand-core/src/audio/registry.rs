//! Registry owning every playing sound instance.
//!
//! Callers start sounds through [`AudioInstanceRegistry::play_effect`] and
//! [`AudioInstanceRegistry::play_music`] and get back an [`InstanceId`]. The
//! backend handle stays inside the registry. Every stop (explicit, natural end,
//! or displacement by newer music) ramps the volume down over a short fade that
//! is advanced by [`AudioInstanceRegistry::tick`]; the handle is released once
//! the fade reaches zero.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::instance::{AudioInstance, Category, FadeState, InstanceId, InstanceSnapshot};
use crate::audio::port::{PlaybackParams, SoundBuffer, SoundPlaybackPort};
use crate::config::{AudioConfig, ConfigValidator, JitterRange};
use crate::error::{Error, Result};

/// Per-request options for [`AudioInstanceRegistry::play_effect`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayOptions {
    pub looping: bool,
    pub volume_jitter: JitterRange,
    pub pitch_jitter: JitterRange,
}

impl PlayOptions {
    /// A looping sound without jitter.
    pub fn looping() -> Self {
        Self {
            looping: true,
            ..Self::default()
        }
    }

    /// One-shot options using the jitter ranges from `config`.
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            looping: false,
            volume_jitter: config.volume_jitter,
            pitch_jitter: config.pitch_jitter,
        }
    }
}

/// Bookkeeping for all sound instances started through one playback port.
///
/// At most one music instance is in the `Playing` state at any time; starting
/// new music fades the previous one out while the new one starts.
pub struct AudioInstanceRegistry<P: SoundPlaybackPort> {
    port: P,
    config: AudioConfig,
    instances: HashMap<InstanceId, AudioInstance<P::Handle>>,
    next_id: u64,
    muted: bool,
    rng: StdRng,
}

impl<P: SoundPlaybackPort> AudioInstanceRegistry<P> {
    /// Creates a registry with an entropy-seeded jitter source.
    ///
    /// `config` goes through the same validation as a loaded file.
    pub fn new(port: P, config: AudioConfig) -> Result<Self> {
        Self::with_rng(port, config, StdRng::from_entropy())
    }

    /// Creates a registry with a deterministic jitter source.
    pub fn with_seed(port: P, config: AudioConfig, seed: u64) -> Result<Self> {
        Self::with_rng(port, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(port: P, config: AudioConfig, rng: StdRng) -> Result<Self> {
        ConfigValidator::new().validate_audio(&config)?;
        Ok(Self {
            port,
            config,
            instances: HashMap::new(),
            next_id: 0,
            muted: false,
            rng,
        })
    }

    /// Starts a sound effect that plays alongside everything else.
    ///
    /// Volume and pitch are each scaled by `1 + x` with `x` drawn uniformly from
    /// the matching jitter range. Non-looping effects fade out on their own once
    /// the buffer length has elapsed.
    pub fn play_effect(&mut self, buffer: &P::Buffer, options: PlayOptions) -> Result<InstanceId> {
        check_request(buffer, &[options.volume_jitter, options.pitch_jitter])?;

        let params = PlaybackParams {
            volume: self.config.effect_volume * self.sample_multiplier(options.volume_jitter),
            pitch: self.sample_multiplier(options.pitch_jitter),
            looping: options.looping,
            delay: f64::from(self.config.pre_roll_delay),
        };
        let handle = self.start(Category::Effect, buffer, &params)?;
        let fade_duration = f64::from(self.config.effect_fade_duration);

        Ok(self.insert(Category::Effect, handle, &params, buffer.length_secs(), fade_duration))
    }

    /// Starts a music track, fading out the one currently playing.
    ///
    /// The previous track is only displaced once the new one has started, so a
    /// failed start leaves the current music untouched.
    pub fn play_music(
        &mut self,
        buffer: &P::Buffer,
        looping: bool,
        pitch_jitter: JitterRange,
    ) -> Result<InstanceId> {
        check_request(buffer, &[pitch_jitter])?;

        let params = PlaybackParams {
            volume: self.config.music_volume,
            pitch: self.sample_multiplier(pitch_jitter),
            looping,
            delay: f64::from(self.config.pre_roll_delay),
        };
        let handle = self.start(Category::Music, buffer, &params)?;
        let fade_duration = f64::from(self.config.music_fade_duration);

        for instance in self.instances.values_mut() {
            if instance.category == Category::Music && instance.begin_fade(fade_duration) {
                tracing::info!("Music {} displaced, fading out", instance.id.raw());
            }
        }

        Ok(self.insert(Category::Music, handle, &params, buffer.length_secs(), fade_duration))
    }

    /// Fades out an instance using its category's fade duration.
    ///
    /// Returns false if the instance is already fading or has been released.
    pub fn stop(&mut self, id: InstanceId) -> bool {
        let duration = match self.instances.get(&id) {
            Some(instance) => instance.fade_duration,
            None => {
                tracing::debug!("Ignoring stop for released instance {}", id.raw());
                return false;
            }
        };
        self.fade_out(id, duration as f32)
    }

    /// Fades out an instance over `duration` seconds.
    pub fn fade_out(&mut self, id: InstanceId, duration: f32) -> bool {
        match self.instances.get_mut(&id) {
            Some(instance) => {
                let started = instance.begin_fade(f64::from(duration));
                if started {
                    tracing::debug!(
                        "Fading out {} instance {} over {}s",
                        instance.category.as_str(),
                        id.raw(),
                        duration
                    );
                }
                started
            }
            None => false,
        }
    }

    /// Fades out every playing instance. Returns how many fades were started.
    pub fn stop_all(&mut self) -> usize {
        let duration = f64::from(self.config.stop_all_fade_duration);
        let count = self
            .instances
            .values_mut()
            .map(|instance| instance.begin_fade(duration))
            .filter(|started| *started)
            .count();

        tracing::info!("stop_all: fading out {} instances", count);
        count
    }

    /// Flips the global mute flag. Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.muted;
        self.set_muted(muted);
        muted
    }

    /// Forces global output gain to zero while muted. Instance volumes are untouched.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.port.set_output_gain(if muted { 0.0 } else { 1.0 });
        tracing::info!("Audio {}", if muted { "muted" } else { "unmuted" });
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Advances natural-end detection and every fade by `dt` seconds,
    /// releasing instances whose fade has finished.
    pub fn tick(&mut self, dt: f64) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        for instance in self.instances.values_mut() {
            instance.advance(dt);
        }

        self.instances.retain(|id, instance| {
            if instance.is_released() {
                tracing::debug!("Released {} instance {}", instance.category.as_str(), id.raw());
                false
            } else {
                true
            }
        });
    }

    /// Returns a view of an instance, or `None` once it has been released.
    pub fn snapshot(&self, id: InstanceId) -> Option<InstanceSnapshot> {
        self.instances.get(&id).map(|instance| instance.snapshot())
    }

    /// Views of every tracked instance, ordered by creation.
    pub fn snapshots(&self) -> Vec<InstanceSnapshot> {
        let mut all: Vec<InstanceSnapshot> =
            self.instances.values().map(|instance| instance.snapshot()).collect();
        all.sort_by_key(|snapshot| snapshot.id);
        all
    }

    /// The music instance currently playing (not fading), if any.
    pub fn active_music(&self) -> Option<InstanceId> {
        self.instances
            .values()
            .find(|instance| instance.category == Category::Music && instance.is_playing())
            .map(|instance| instance.id)
    }

    /// Number of tracked instances, including those still fading out.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    fn start(
        &mut self,
        category: Category,
        buffer: &P::Buffer,
        params: &PlaybackParams,
    ) -> Result<P::Handle> {
        self.port.start(buffer, params).map_err(|e| {
            tracing::warn!("Failed to start {}: {}", category.as_str(), e);
            e
        })
    }

    fn insert(
        &mut self,
        category: Category,
        handle: P::Handle,
        params: &PlaybackParams,
        length: f64,
        fade_duration: f64,
    ) -> InstanceId {
        let id = InstanceId::new(self.next_id);
        self.next_id += 1;

        self.instances.insert(
            id,
            AudioInstance {
                id,
                category,
                handle,
                volume: params.volume,
                pitch: params.pitch,
                looping: params.looping,
                length: if params.looping { None } else { Some(length) },
                fade_duration,
                elapsed: 0.0,
                fade: FadeState::Playing,
            },
        );

        tracing::info!(
            "Started {} instance {} (volume {:.2}, pitch {:.2}, loop {})",
            category.as_str(),
            id.raw(),
            params.volume,
            params.pitch,
            params.looping
        );
        id
    }

    fn sample_multiplier(&mut self, jitter: JitterRange) -> f32 {
        if jitter.is_none() {
            return 1.0;
        }
        let offset = self
            .rng
            .gen_range(f64::from(jitter.min)..=f64::from(jitter.max));
        (1.0 + offset).max(0.0) as f32
    }
}

fn check_request<B: SoundBuffer>(buffer: &B, jitters: &[JitterRange]) -> Result<()> {
    if buffer.is_empty() {
        tracing::warn!("Rejected play request with an empty buffer");
        return Err(Error::EmptyBuffer);
    }
    for jitter in jitters {
        if !jitter.is_valid() {
            return Err(Error::InvalidJitter {
                min: jitter.min,
                max: jitter.max,
            });
        }
    }
    Ok(())
}
