//! Configuration utilities.

/// TOML configuration file and hot-reloading manager.
pub mod toml_config;

pub use toml_config::{ConfigError, ConfigManager, PatlawConfig};
