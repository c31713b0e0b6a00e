//! Config Manager - reload support
//!
//! Keeps the active configuration shared between the host and whatever
//! rebuilds machines when the file changes.
use super::GestureConfig;
use crate::lock_read;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Configuration manager with reload support
#[derive(Clone)]
pub struct ConfigManager {
    /// Current active configuration
    config: Arc<RwLock<GestureConfig>>,
    /// Path to the config file
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let config = GestureConfig::load(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get the current configuration
    pub fn get_config(&self) -> GestureConfig {
        lock_read(&self.config).clone()
    }

    /// Get the config file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    /// Re-read the file. Returns whether the configuration changed; on error
    /// the previous configuration stays active.
    pub fn reload(&self) -> Result<bool> {
        let fresh = GestureConfig::load(&self.config_path)
            .with_context(|| format!("Failed to reload config from {:?}", self.config_path))?;

        let mut current = self
            .config
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *current == fresh {
            return Ok(false);
        }
        *current = fresh;
        info!("Reloaded config from {:?}", self.config_path);
        Ok(true)
    }
}
