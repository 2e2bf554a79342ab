//! Logging system.
//!
//! Installs a `tracing` subscriber. `RUST_LOG` always wins over configured
//! levels.

use gki_types::{GkiError, LogConfig, LogFormat, LogLevel, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG`, a config entry nor a command line
/// flag sets a level.
pub const DEFAULT_FILTER: &str = "gki=info";

/// Filter directive for the given configuration.
///
/// `level_override` (from command line flags) beats the first config entry.
/// With neither, [`DEFAULT_FILTER`] applies.
pub fn directive_for(configs: &[LogConfig], level_override: Option<LogLevel>) -> String {
    match level_override.or_else(|| configs.first().map(|config| config.level)) {
        Some(level) => level.as_filter().to_string(),
        None => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize logging from configuration.
///
/// Only the first entry is honoured.
pub fn init_from_config(configs: &[LogConfig], level_override: Option<LogLevel>) -> Result<()> {
    let directive = directive_for(configs, level_override);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let format = configs.first().map_or(LogFormat::Pretty, |config| config.format);
    init(filter, format)
}

fn init(filter: EnvFilter, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| GkiError::Config(format!("Failed to initialize logging: {}", e)))
}
