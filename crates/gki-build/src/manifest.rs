//! Package manifest model.

use gki_types::{KmiVersion, Result};
use serde::{Deserialize, Serialize};

/// Version number given to factory packages.
pub const FACTORY_VERSION: u64 = 0;

/// Hook run before the package is installed.
pub const PRE_INSTALL_HOOK: &str = "bin/com.android.gki.preinstall";

/// Hook run after the package is installed.
pub const POST_INSTALL_HOOK: &str = "bin/com.android.gki.postinstall";

/// Manifest bundled into a GKI package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApexManifest {
    /// Canonical package name
    pub name: String,
    /// Package version
    pub version: u64,
    /// Pre-install hook path
    pub pre_install_hook: String,
    /// Post-install hook path
    pub post_install_hook: String,
}

impl ApexManifest {
    /// Manifest for `name` at `version` with the standard hooks.
    pub fn new(name: impl Into<String>, version: u64) -> Self {
        Self {
            name: name.into(),
            version,
            pre_install_hook: PRE_INSTALL_HOOK.to_string(),
            post_install_hook: POST_INSTALL_HOOK.to_string(),
        }
    }

    /// Factory manifest, fully determined by the KMI version.
    pub fn factory(kmi: &KmiVersion) -> Self {
        Self::new(kmi.package_name(), FACTORY_VERSION)
    }

    /// Render as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What the manifest builder derives the manifest from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestRequest {
    /// Kernel release text passed as the node's input
    FromKernelRelease {
        /// Canonical package name
        package_name: String,
    },
    /// Declared KMI version with the factory sentinel version
    Factory {
        /// Declared KMI version
        kmi: KmiVersion,
    },
}

impl ManifestRequest {
    /// Flags passed to the manifest builder.
    pub fn args(&self) -> Vec<String> {
        match self {
            ManifestRequest::FromKernelRelease { package_name } => vec![
                "--apex_name".to_string(),
                package_name.clone(),
                "--kernel_release_file".to_string(),
            ],
            ManifestRequest::Factory { kmi } => vec![
                "--kmi_version".to_string(),
                kmi.to_string(),
                "--factory".to_string(),
            ],
        }
    }
}
