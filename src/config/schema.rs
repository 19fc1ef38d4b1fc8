//! Configuration schema for memorizer
//!
//! Configuration is stored at `~/.config/memorizer/config.toml`, with
//! per-project overrides in `.memorizer.toml`.

use crate::store::{DEFAULT_INDENT, DEFAULT_STATE_FILE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache store settings
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// State file path, relative paths resolve against the working directory
    pub path: PathBuf,

    /// Indentation width of the saved state file
    pub indent: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_FILE),
            indent: DEFAULT_INDENT,
        }
    }
}
