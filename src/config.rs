//! Application configuration loaded from `~/.config/crashlens/config.toml`.
//! Every field has a default, so a missing file means default behavior.

use std::path::{Path, PathBuf};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::aggregate::{GEO_SAMPLE_SEED, GEO_SAMPLE_SIZE};

const APP_NAME: &str = "crashlens";

/// Rows the CSV reader inspects to infer column types.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Cap on geolocated points returned per report.
    pub geo_sample_size: usize,
    /// Seed for the deterministic geo subsample.
    pub geo_sample_seed: u64,
    /// Rows the CSV reader inspects to infer column types.
    pub infer_schema_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            geo_sample_size: GEO_SAMPLE_SIZE,
            geo_sample_seed: GEO_SAMPLE_SEED,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl AppConfig {
    /// Loads the user config file, or the defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Ok(path) if path.exists() => Self::from_path(&path),
            _ => Ok(AppConfig::default()),
        }
    }

    /// `~/.config/crashlens/config.toml` (platform equivalent).
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(APP_NAME);
        Ok(dir.join("config.toml"))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file at {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file at {}: {}", path.display(), e))
    }
}
