//! Configuration management.
//!
//! Build configuration is resolved from several layers, highest priority
//! first:
//! 1. Environment variables
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```rust,ignore
//! use gki_core::config::BuildConfig;
//!
//! let config = BuildConfig::load_from("board.yml")?;
//! let facts = config.board;
//! ```

use gki_types::{BoardConfig, GkiError, LogConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::fs;
use tracing::debug;

/// Environment variable overriding `board.kernel_binaries`.
pub const ENV_KERNEL_BINARIES: &str = "GKI_BOARD_KERNEL_BINARIES";

/// Environment variable overriding `board.supported_kmi_versions`.
pub const ENV_KMI_VERSIONS: &str = "GKI_BOARD_KMI_VERSIONS";

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

const LOWEST_FIRST: [ConfigLayer; 4] = [
    ConfigLayer::Default,
    ConfigLayer::Loaded,
    ConfigLayer::Set,
    ConfigLayer::Environment,
];

/// Layered configuration over untyped values.
///
/// This is the low-level configuration type; see [`BuildConfig`] for the
/// typed view.
#[derive(Clone, Debug, Default)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
}

impl Config {
    /// Load a configuration file.
    ///
    /// If the file doesn't exist, an empty configuration is created.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut layers = HashMap::new();

        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| GkiError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

            let value: Value = crate::util::load_yaml(&content)
                .map_err(|e| GkiError::Config(format!("Failed to parse config {}: {}", path.display(), e)))?;

            // An empty document parses as null.
            if !value.is_null() {
                layers.insert(ConfigLayer::Loaded, value);
            }
        } else {
            debug!("Config file {} not found, using defaults", path.display());
        }

        Ok(Self { layers })
    }

    /// Replace the whole content of a layer.
    pub fn with_layer(mut self, layer: ConfigLayer, value: Value) -> Self {
        self.layers.insert(layer, value);
        self
    }

    /// Get a configuration value by dotted key, respecting layer priority.
    ///
    /// Returns None if the key doesn't exist in any layer.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        for layer in LOWEST_FIRST.iter().rev() {
            if let Some(layer_data) = self.layers.get(layer) {
                if let Some(value) = crate::util::data::get_path(layer_data, key) {
                    if let Ok(typed_value) = serde_json::from_value(value.clone()) {
                        return Some(typed_value);
                    }
                }
            }
        }

        None
    }

    /// Set a configuration value programmatically.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        self.set_in(ConfigLayer::Set, key, value)
    }

    /// Apply environment overrides from `(name, value)` pairs.
    ///
    /// Only the board variables are recognised; everything else is ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in vars {
            let key = match name.as_ref() {
                ENV_KERNEL_BINARIES => "board.kernel_binaries",
                ENV_KMI_VERSIONS => "board.supported_kmi_versions",
                _ => continue,
            };
            debug!("Overriding {} from {}", key, name.as_ref());
            self.set_in(
                ConfigLayer::Environment,
                key,
                BoardConfig::split_list(value.as_ref()),
            )?;
        }
        Ok(())
    }

    /// Get merged data from all layers.
    pub fn merged_data(&self) -> Value {
        let mut merged = Value::Object(serde_json::Map::new());

        for layer in &LOWEST_FIRST {
            if let Some(layer_data) = self.layers.get(layer) {
                merged = crate::util::data::deep_merge(merged, layer_data.clone());
            }
        }

        merged
    }

    fn set_in(&mut self, layer: ConfigLayer, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| GkiError::Config(format!("Failed to serialize value: {}", e)))?;

        let target = self
            .layers
            .entry(layer)
            .or_insert_with(|| Value::Object(Default::default()));

        crate::util::data::set_path(target, key, value)
    }
}

/// Typed build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Board facts consulted for eligibility
    #[serde(default)]
    pub board: BoardConfig,

    /// Log configurations
    #[serde(default)]
    pub logs: Vec<LogConfig>,
}

impl BuildConfig {
    /// Load from a file, applying environment overrides from the process.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Config::load(path)?;
        config.apply_env(std::env::vars())?;
        Self::from_config(&config)
    }

    /// Build the typed view of a layered configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        serde_json::from_value(config.merged_data())
            .map_err(|e| GkiError::Config(format!("Failed to parse build config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_layers() {
        let config = Config::default()
            .with_layer(ConfigLayer::Default, serde_json::json!({"key": "default_value"}))
            .with_layer(ConfigLayer::Loaded, serde_json::json!({"key": "loaded_value"}));

        let value: String = config.get("key").unwrap();
        assert_eq!(value, "loaded_value");
    }

    #[test]
    fn test_set_overrides_loaded() {
        let mut config = Config::default()
            .with_layer(ConfigLayer::Loaded, serde_json::json!({"board": {"kernel_binaries": ["kernel"]}}));
        config.set("board.kernel_binaries", vec!["kernel-5.10"]).unwrap();

        let binaries: Vec<String> = config.get("board.kernel_binaries").unwrap();
        assert_eq!(binaries, vec!["kernel-5.10"]);
    }

    #[test]
    fn test_build_config_from_file_with_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "board:\n  kernel_binaries: [kernel-5.4]\n  supported_kmi_versions: [\"5.4-android12-0\"]\nlogs:\n  - level: DEBUG\n    format: compact\n"
        )
        .unwrap();

        let mut config = Config::load(file.path()).unwrap();
        config
            .apply_env([
                (ENV_KMI_VERSIONS, "5.4-android12-0 5.10-android12-0"),
                ("UNRELATED", "ignored"),
            ])
            .unwrap();
        let build = BuildConfig::from_config(&config).unwrap();

        assert_eq!(build.board.kernel_binaries, vec!["kernel-5.4"]);
        assert_eq!(
            build.board.supported_kmi_versions,
            vec!["5.4-android12-0", "5.10-android12-0"]
        );
        assert_eq!(build.logs.len(), 1);
        assert_eq!(build.logs[0].level, gki_types::LogLevel::Debug);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.yml")).unwrap();
        let build = BuildConfig::from_config(&config).unwrap();
        assert_eq!(build, BuildConfig::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "board: [unterminated").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, GkiError::Config(_)));
    }
}
