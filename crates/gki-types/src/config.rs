//! Configuration types and structures.

use serde::{Deserialize, Serialize};

/// Facts about the target board, read once per build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Kernel binary names built for the board, e.g. `kernel-5.4`.
    ///
    /// Empty when the board builds a single `kernel`.
    #[serde(default)]
    pub kernel_binaries: Vec<String>,

    /// KMI versions the board declares support for
    #[serde(default)]
    pub supported_kmi_versions: Vec<String>,
}

impl BoardConfig {
    /// Parse a whitespace separated make-style list.
    pub fn split_list(value: &str) -> Vec<String> {
        value.split_whitespace().map(str::to_string).collect()
    }
}

/// Log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level for this output
    #[serde(default = "default_log_level")]
    pub level: crate::LogLevel,
    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> crate::LogLevel {
    crate::LogLevel::Info
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    Pretty,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_config_defaults() {
        let board: BoardConfig = serde_yaml::from_str("kernel_binaries: [kernel-5.4]\n").unwrap();
        assert_eq!(board.kernel_binaries, vec!["kernel-5.4"]);
        assert!(board.supported_kmi_versions.is_empty());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            BoardConfig::split_list("  kernel-5.4 \tkernel-5.4-lz4\n"),
            vec!["kernel-5.4", "kernel-5.4-lz4"]
        );
        assert!(BoardConfig::split_list("").is_empty());
    }

    #[test]
    fn test_log_config_defaults() {
        let log: LogConfig = serde_yaml::from_str("format: json\n").unwrap();
        assert_eq!(log.level, crate::LogLevel::Info);
        assert_eq!(log.format, LogFormat::Json);
    }
}
