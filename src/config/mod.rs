pub mod config;
pub mod config_manager;
pub mod validator;

pub use config::{GestureConfig, StrokeConfig};
pub use config_manager::ConfigManager;
pub use validator::{validate_config, ValidationReport};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("config rejected: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("failed to get config dir")]
    NoConfigDir,
}
