//! Configuration for the resolution engine.
//!
//! Layered: built-in defaults, then an optional `mandox.toml`, then
//! environment variable overrides.
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `MANDOX_` and use double
//! underscores to separate nested levels:
//! - `MANDOX_PARSE_DEPTH=2` sets `parse_depth`
//! - `MANDOX_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The parse-depth sentinel meaning "descend into nested function literals
/// without limit".
pub const UNLIMITED_DEPTH: i32 = -1;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// How many nested function-literal scopes symbol extraction descends
    /// into. `-1` means unlimited.
    #[serde(default = "default_parse_depth")]
    pub parse_depth: i32,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `extractor = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_parse_depth() -> i32 {
    UNLIMITED_DEPTH
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parse_depth: default_parse_depth(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from `mandox.toml` in the working directory,
    /// layered under `MANDOX_*` environment overrides.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from("mandox.toml")
    }

    /// Load configuration from a specific TOML file path.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore separates nested levels; single underscores
            // stay inside field names.
            .merge(Env::prefixed("MANDOX_").split("__"))
            .extract()
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.parse_depth, UNLIMITED_DEPTH);
        assert_eq!(settings.logging.default, "warn");
        assert!(settings.logging.modules.is_empty());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings =
            Settings::load_from("definitely-missing.toml").expect("defaults should extract");
        assert_eq!(settings.parse_depth, UNLIMITED_DEPTH);
    }

    #[test]
    fn test_settings_serde_round_trip() {
        let settings = Settings {
            parse_depth: 2,
            logging: LoggingConfig {
                default: "info".to_string(),
                modules: HashMap::from([("extractor".to_string(), "debug".to_string())]),
            },
        };

        let json = serde_json::to_string(&settings).expect("serialize");
        let back: Settings = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.parse_depth, 2);
        assert_eq!(back.logging.modules["extractor"], "debug");
    }
}
