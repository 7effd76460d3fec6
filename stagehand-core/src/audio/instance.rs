//! Registry entries for playing sounds.

use crate::audio::port::PlaybackHandle;

/// Opaque reference to a sound started through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Whether a sound displaces others (music) or plays alongside them (effect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Music,
    Effect,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Effect => "fx",
        }
    }
}

/// Fade progression of an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeState {
    Playing,
    FadingOut {
        start_volume: f32,
        elapsed: f64,
        duration: f64,
    },
    Released,
}

/// Read-only view of an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSnapshot {
    pub id: InstanceId,
    pub category: Category,
    pub volume: f32,
    pub pitch: f32,
    pub looping: bool,
    pub elapsed: f64,
    pub fade: FadeState,
}

pub(crate) struct AudioInstance<H> {
    pub(crate) id: InstanceId,
    pub(crate) category: Category,
    pub(crate) handle: H,
    pub(crate) volume: f32,
    pub(crate) pitch: f32,
    pub(crate) looping: bool,
    /// Natural length for non-looping sounds.
    pub(crate) length: Option<f64>,
    /// Fade used for explicit stops and the natural end.
    pub(crate) fade_duration: f64,
    pub(crate) elapsed: f64,
    pub(crate) fade: FadeState,
}

impl<H: PlaybackHandle> AudioInstance<H> {
    pub(crate) fn is_playing(&self) -> bool {
        self.fade == FadeState::Playing
    }

    pub(crate) fn is_released(&self) -> bool {
        self.fade == FadeState::Released
    }

    /// Moves a playing instance into `FadingOut`. Returns false in any other state.
    pub(crate) fn begin_fade(&mut self, duration: f64) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.fade = FadeState::FadingOut {
            start_volume: self.volume,
            elapsed: 0.0,
            duration: duration.max(0.0),
        };
        true
    }

    /// Advances playback and fade bookkeeping by `dt` seconds.
    pub(crate) fn advance(&mut self, dt: f64) {
        if self.is_released() {
            return;
        }
        self.elapsed += dt;

        if self.handle.is_finished() {
            tracing::debug!(
                "{} instance {} ended in the backend, releasing",
                self.category.as_str(),
                self.id.raw()
            );
            self.release();
            return;
        }

        match self.fade {
            FadeState::Playing => {
                if let Some(length) = self.length {
                    if self.elapsed >= length {
                        self.begin_fade(self.fade_duration);
                    }
                }
            }
            FadeState::FadingOut {
                start_volume,
                elapsed,
                duration,
            } => {
                let elapsed = elapsed + dt;
                let volume = if duration > 0.0 {
                    (start_volume * (1.0 - (elapsed / duration) as f32)).max(0.0)
                } else {
                    0.0
                };

                if volume <= 0.0 || elapsed >= duration {
                    self.volume = 0.0;
                    self.handle.set_volume(0.0);
                    self.release();
                } else {
                    self.volume = volume;
                    self.handle.set_volume(volume);
                    self.fade = FadeState::FadingOut {
                        start_volume,
                        elapsed,
                        duration,
                    };
                }
            }
            FadeState::Released => {}
        }
    }

    pub(crate) fn release(&mut self) {
        self.handle.stop_and_release();
        self.volume = 0.0;
        self.fade = FadeState::Released;
    }

    pub(crate) fn snapshot(&self) -> InstanceSnapshot {
        InstanceSnapshot {
            id: self.id,
            category: self.category,
            volume: self.volume,
            pitch: self.pitch,
            looping: self.looping,
            elapsed: self.elapsed,
            fade: self.fade,
        }
    }
}
