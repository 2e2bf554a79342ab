//! # GKI Core
//!
//! Core utilities, configuration management, and logging for GKI package
//! generation.
//!
//! This crate provides:
//!
//! - **Configuration**: Layered build configuration (defaults, file, environment)
//! - **Logging**: `tracing` subscriber setup driven by configuration
//! - **File Operations**: YAML handling, declaration discovery, marker files
//! - **Time Utilities**: Timestamps written into marker files
//!
//! ## Example
//!
//! ```rust,ignore
//! use gki_core::{config::BuildConfig, log};
//!
//! let config = BuildConfig::load_from("board.yml")?;
//! log::init_from_config(&config.logs, None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod util;
pub mod time;

// Re-export commonly used items
pub use config::{BuildConfig, Config};
pub use gki_types::{GkiError, Result};
