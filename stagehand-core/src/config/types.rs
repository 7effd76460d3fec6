//! Configuration types for the countdown timer and audio registry.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration loaded from YAML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StagehandConfig {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Countdown timer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimerConfig {
    /// Highest milestone announced per run. A run notifies `top_milestone, ..., 1`.
    #[serde(default = "default_top_milestone")]
    pub top_milestone: u32,
    /// How remaining time is rendered on an attached display.
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// When true, a formatted value of `"0"` is replaced by `ready_text`.
    #[serde(default)]
    pub countdown_mode: bool,
    /// Marker shown in place of `"0"` in countdown mode.
    #[serde(default = "default_ready_text")]
    pub ready_text: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            top_milestone: default_top_milestone(),
            display_mode: DisplayMode::default(),
            countdown_mode: false,
            ready_text: default_ready_text(),
        }
    }
}

/// Largest accepted `top_milestone`: one announcement per second for a day.
pub const MAX_TOP_MILESTONE: u32 = 86_400;

fn default_top_milestone() -> u32 {
    3
}

fn default_ready_text() -> String {
    "GO!".to_string()
}

/// Display formatting for remaining time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Whole seconds within the hour and hundredths, e.g. `75:50`.
    Minutes,
    /// Seconds of the current minute only, e.g. `7`.
    Seconds,
    /// Seconds of the current minute and hundredths, e.g. `7:25`.
    #[default]
    Milli,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Minutes => "minutes",
            DisplayMode::Seconds => "seconds",
            DisplayMode::Milli => "milli",
        }
    }
}

/// Audio registry configuration. All durations are in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Fade applied to a music instance when stopped or displaced.
    #[serde(default = "default_fade")]
    pub music_fade_duration: f32,
    /// Fade applied to an effect instance when stopped or at its natural end.
    #[serde(default = "default_fade")]
    pub effect_fade_duration: f32,
    /// Fade applied to every instance by `stop_all`.
    #[serde(default = "default_fade")]
    pub stop_all_fade_duration: f32,
    /// Delay between a play request and audible output.
    #[serde(default = "default_pre_roll")]
    pub pre_roll_delay: f32,
    /// Base volume for effect instances before jitter (0.0-1.0).
    #[serde(default = "default_base_volume")]
    pub effect_volume: f32,
    /// Base volume for music instances (0.0-1.0).
    #[serde(default = "default_base_volume")]
    pub music_volume: f32,
    /// Default volume jitter for effects.
    #[serde(default)]
    pub volume_jitter: JitterRange,
    /// Default pitch jitter for effects and music.
    #[serde(default)]
    pub pitch_jitter: JitterRange,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music_fade_duration: default_fade(),
            effect_fade_duration: default_fade(),
            stop_all_fade_duration: default_fade(),
            pre_roll_delay: default_pre_roll(),
            effect_volume: default_base_volume(),
            music_volume: default_base_volume(),
            volume_jitter: JitterRange::default(),
            pitch_jitter: JitterRange::default(),
        }
    }
}

fn default_fade() -> f32 {
    0.1
}

fn default_pre_roll() -> f32 {
    0.1
}

fn default_base_volume() -> f32 {
    1.0
}

/// Relative random variation applied to a playback parameter.
///
/// A sampled offset `x` in `[min, max]` scales the base value by `1 + x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct JitterRange {
    #[serde(default)]
    pub min: f32,
    #[serde(default)]
    pub max: f32,
}

impl JitterRange {
    pub const NONE: JitterRange = JitterRange { min: 0.0, max: 0.0 };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if the bounds are finite and ordered, `min >= -1.0`, and
    /// the span `max - min` is itself finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.min >= -1.0
            && (self.max - self.min).is_finite()
    }

    /// Returns true if sampling always yields zero.
    pub fn is_none(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }
}
