//! Application configuration module.
//!
//! Manages a TOML config file for user settings: the default XMLTV guide
//! file and the channels selected for display.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
pub use paths::resolve_config_path;
