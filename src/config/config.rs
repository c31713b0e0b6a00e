use super::validator::validate_config;
use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Gesture machine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Time a gesture may stay open without any action before it is abandoned
    pub gesture_timeout_ms: u64,
    pub stroke: StrokeConfig,
}

/// Stroke recognition settings. Distances are in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Travel needed before the first direction is recorded
    pub start_threshold: f32,
    /// Travel needed to record a turn
    pub direction_change_threshold: f32,
    /// Travel needed to keep extending the current direction
    pub extension_threshold: f32,
    pub watch_interval_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            gesture_timeout_ms: 1000,
            stroke: StrokeConfig::default(),
        }
    }
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            start_threshold: 10.0,
            direction_change_threshold: 20.0,
            extension_threshold: 10.0,
            watch_interval_ms: 10,
        }
    }
}

impl StrokeConfig {
    #[must_use]
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

impl GestureConfig {
    #[must_use]
    pub fn gesture_timeout(&self) -> Duration {
        Duration::from_millis(self.gesture_timeout_ms)
    }

    /// Load and validate a config file. `.toml` files are read as TOML,
    /// anything else as RON.
    #[allow(clippy::missing_errors_doc)]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = if is_toml(path) {
            Self::from_toml_str(&content)?
        } else {
            Self::from_ron_str(&content)?
        };

        let report = validate_config(&config);
        for warning in &report.warnings {
            warn!("{}: {}", path.display(), warning);
        }
        if !report.errors.is_empty() {
            return Err(ConfigError::Invalid(report.errors));
        }
        Ok(config)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save config, picking the format from the extension like `load`
    #[allow(clippy::missing_errors_doc)]
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            let pretty = ron::ser::PrettyConfig::default();
            ron::ser::to_string_pretty(self, pretty)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get default config path
    #[allow(clippy::missing_errors_doc)]
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("chordmux").join("config.ron"))
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
