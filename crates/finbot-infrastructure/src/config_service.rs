//! Configuration service implementation.
//!
//! Loads the root configuration from `~/.config/finbot/config.toml` (or an
//! explicit path) and the optional response-table file it points to.

use finbot_core::config::FinbotConfig;
use finbot_core::error::{FinbotError, Result};
use finbot_core::responder::ResponseTableSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::paths::FinbotPaths;

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<FinbotConfig>>>,
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService {
    /// Service reading the platform default config file.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Service reading an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(FinbotPaths::config_file()?),
        }
    }

    /// Gets the configuration, loading it from file on first access.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn get_config(&self) -> Result<FinbotConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load_config(&self.config_path()?)?;

        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    fn load_config(path: &Path) -> Result<FinbotConfig> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(FinbotConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: FinbotConfig = toml::from_str(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

/// Loads the response tables named by `config.tables_path`, or the builtin set.
pub fn load_tables(config: &FinbotConfig) -> Result<ResponseTableSet> {
    match &config.tables_path {
        Some(path) => load_tables_file(path),
        None => Ok(ResponseTableSet::builtin()),
    }
}

/// Reads and validates a TOML table file.
pub fn load_tables_file(path: &Path) -> Result<ResponseTableSet> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FinbotError::io(format!("Failed to read tables file {:?}: {}", path, e))
    })?;
    let tables = ResponseTableSet::from_toml_str(&content)?;
    tracing::info!(
        glossary = tables.glossary.entries().len(),
        scenarios = tables.scenarios.entries().len(),
        keywords = tables.keywords.entries().len(),
        "Loaded response tables from {:?}",
        path
    );
    Ok(tables)
}
