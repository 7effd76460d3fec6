//! Configuration validation.

use crate::config::types::{
    AudioConfig, JitterRange, StagehandConfig, TimerConfig, MAX_TOP_MILESTONE,
};
use crate::error::{Error, Result};

/// Validator for runtime configurations.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates a runtime configuration.
    pub fn validate(&self, config: &StagehandConfig) -> Result<()> {
        self.validate_timer(&config.timer)?;
        self.validate_audio(&config.audio)?;
        Ok(())
    }

    /// Validates the timer section on its own.
    pub fn validate_timer(&self, timer: &TimerConfig) -> Result<()> {
        if timer.top_milestone > MAX_TOP_MILESTONE {
            return Err(Error::ConfigValidation(
                "timer.top_milestone".to_string(),
                format!(
                    "must be at most {}, got {}",
                    MAX_TOP_MILESTONE, timer.top_milestone
                ),
            ));
        }
        Ok(())
    }

    /// Validates the audio section on its own.
    pub fn validate_audio(&self, audio: &AudioConfig) -> Result<()> {
        self.validate_duration("audio.music_fade_duration", audio.music_fade_duration)?;
        self.validate_duration("audio.effect_fade_duration", audio.effect_fade_duration)?;
        self.validate_duration("audio.stop_all_fade_duration", audio.stop_all_fade_duration)?;
        self.validate_duration("audio.pre_roll_delay", audio.pre_roll_delay)?;
        self.validate_volume("audio.effect_volume", audio.effect_volume)?;
        self.validate_volume("audio.music_volume", audio.music_volume)?;
        self.validate_jitter("audio.volume_jitter", &audio.volume_jitter)?;
        self.validate_jitter("audio.pitch_jitter", &audio.pitch_jitter)?;
        Ok(())
    }

    fn validate_duration(&self, field: &str, value: f32) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::ConfigValidation(
                field.to_string(),
                format!("Duration must be finite and >= 0, got {}", value),
            ));
        }
        Ok(())
    }

    fn validate_volume(&self, field: &str, value: f32) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::ConfigValidation(
                field.to_string(),
                format!("Volume must be finite and >= 0, got {}", value),
            ));
        }
        Ok(())
    }

    fn validate_jitter(&self, field: &str, jitter: &JitterRange) -> Result<()> {
        // A multiplier of 1 + min must not flip the sign of the parameter.
        if jitter.min < -1.0 {
            return Err(Error::ConfigValidation(
                field.to_string(),
                format!("min ({}) cannot be below -1.0", jitter.min),
            ));
        }
        if !jitter.is_valid() {
            return Err(Error::ConfigValidation(
                field.to_string(),
                format!(
                    "range [{}, {}] must be finite and ordered",
                    jitter.min, jitter.max
                ),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
