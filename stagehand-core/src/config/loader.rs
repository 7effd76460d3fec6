//! YAML configuration loader.

use std::fs;
use std::path::Path;

use crate::config::types::StagehandConfig;
use crate::config::validator::ConfigValidator;
use crate::error::{Error, Result};

/// Loads and validates a [`StagehandConfig`].
pub struct ConfigLoader {
    validator: ConfigValidator,
}

impl ConfigLoader {
    /// Creates a new config loader.
    pub fn new() -> Self {
        Self {
            validator: ConfigValidator::new(),
        }
    }

    /// Loads a config file from disk.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<StagehandConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigLoad(path.display().to_string(), e.to_string()))?;

        let config = self.parse(&path.display().to_string(), &content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads a config from an optional path, falling back to defaults when none is given.
    pub fn load_or_default<P: AsRef<Path>>(&self, path: Option<P>) -> Result<StagehandConfig> {
        match path {
            Some(path) => self.load(path),
            None => Ok(StagehandConfig::default()),
        }
    }

    /// Parses YAML text. `source` names the origin in error messages.
    pub fn parse(&self, source: &str, content: &str) -> Result<StagehandConfig> {
        // An empty document is a valid "all defaults" config.
        let config: StagehandConfig = if content.trim().is_empty() {
            StagehandConfig::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| Error::ConfigParse(source.to_string(), e.to_string()))?
        };

        self.validator.validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
