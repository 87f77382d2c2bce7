//! `AppConfig` struct and TOML loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Guide source settings.
    #[serde(default)]
    pub guide: GuideConfig,
    /// Channel selection settings.
    #[serde(default)]
    pub channels: ChannelsConfig,
}

/// Guide source configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct GuideConfig {
    /// Default XMLTV file used when `--file` is not given.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Channel selection configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct ChannelsConfig {
    /// Channel ids to show when no `--channel` filter is given.
    #[serde(default)]
    pub selected: Vec<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}
