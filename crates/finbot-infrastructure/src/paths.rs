//! Unified path management for FinBot files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/finbot/            # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/finbot/       # Data directory
//! └── fingenius-budget.json    # Budget snapshot
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "finbot";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for finbot_core::FinbotError {
    fn from(err: PathError) -> Self {
        finbot_core::FinbotError::config(err.to_string())
    }
}

pub struct FinbotPaths;

impl FinbotPaths {
    /// Returns the FinBot configuration directory (e.g., `~/.config/finbot/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the FinBot data directory (e.g., `~/.local/share/finbot/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
