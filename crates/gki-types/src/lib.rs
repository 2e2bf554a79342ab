//! # GKI Types
//!
//! Core types, traits, and enums shared across all GKI crates.
//!
//! This crate provides the fundamental building blocks for generating GKI
//! packages, including:
//!
//! - The KMI version model and its canonical renderings
//! - The kernel release model embedded in built kernels
//! - Board configuration and logging configuration types
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use gki_types::KmiVersion;
//!
//! let kmi = KmiVersion::parse("5.4-android12-0").unwrap();
//! assert_eq!(kmi.to_string(), "5.4-android12-0");
//! assert_eq!(kmi.to_package_suffix(), "kmi_5_4_android12_0");
//! assert_eq!(kmi.package_name(), "com.android.gki.kmi_5_4_android12_0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{GkiError, Result};
pub use identifiers::{KernelRelease, KmiVersion, KMI_VERSION_PATTERN, PACKAGE_PREFIX};
pub use enums::{LogLevel, NodeRole};
pub use traits::{InlineRelease, ReleaseSource};
pub use config::{BoardConfig, LogConfig, LogFormat};
