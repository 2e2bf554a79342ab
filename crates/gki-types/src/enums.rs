//! Common enumerations used throughout the GKI crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{GkiError, Result};

/// Log level enumeration for the logging system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Detailed trace messages
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = GkiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NONE" | "OFF" => Ok(LogLevel::None),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(GkiError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::None => write!(f, "NONE"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Trace => write!(f, "TRACE"),
        }
    }
}

/// The role a node plays in a GKI package pipeline.
///
/// Together with the owning declaration's name this forms the node's
/// identity; see [`NodeRole::suffix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    /// Boot image imported from the product output directory
    BootImage,
    /// Kernel release text extracted from the boot image
    KernelRelease,
    /// OTA payload and its properties generated from the boot image
    OtaPayloadGen,
    /// Payload binary installed into the package
    OtaPayload,
    /// Payload properties installed into the package
    OtaPayloadProperties,
    /// Package manifest
    Manifest,
    /// Check that the kernel release matches the declared KMI version
    KmiCheck,
    /// The final package
    Package,
    /// Phony aggregate carrying the overridden legacy modules
    Aggregate,
}

impl NodeRole {
    /// Suffix appended to the owner's name to form the node name.
    pub fn suffix(&self) -> &'static str {
        match self {
            NodeRole::BootImage => "_bootimage",
            NodeRole::KernelRelease => "_kernel_release",
            NodeRole::OtaPayloadGen => "_ota_payload_gen",
            NodeRole::OtaPayload => "_ota_payload",
            NodeRole::OtaPayloadProperties => "_ota_payload_properties",
            NodeRole::Manifest => "_apex_manifest",
            NodeRole::KmiCheck => "_kmi_check",
            NodeRole::Package => "",
            NodeRole::Aggregate => "_overrides",
        }
    }

    /// Pipeline stage (1-based) the role belongs to.
    ///
    /// The two install copies share a stage.
    pub fn stage(&self) -> u8 {
        match self {
            NodeRole::BootImage => 1,
            NodeRole::KernelRelease => 2,
            NodeRole::OtaPayloadGen => 3,
            NodeRole::OtaPayload | NodeRole::OtaPayloadProperties => 4,
            NodeRole::Manifest => 5,
            NodeRole::KmiCheck => 6,
            NodeRole::Package => 7,
            NodeRole::Aggregate => 8,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::BootImage => write!(f, "boot-image"),
            NodeRole::KernelRelease => write!(f, "kernel-release"),
            NodeRole::OtaPayloadGen => write!(f, "ota-payload-gen"),
            NodeRole::OtaPayload => write!(f, "ota-payload"),
            NodeRole::OtaPayloadProperties => write!(f, "ota-payload-properties"),
            NodeRole::Manifest => write!(f, "manifest"),
            NodeRole::KmiCheck => write!(f, "kmi-check"),
            NodeRole::Package => write!(f, "package"),
            NodeRole::Aggregate => write!(f, "aggregate"),
        }
    }
}
