//! KMI version and kernel release types.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{GkiError, Result};

/// Grammar every declared KMI version must match, anchored at both ends.
pub const KMI_VERSION_PATTERN: &str = r"^([0-9]+)[.]([0-9]+)-(android[0-9]+)-([0-9]+)$";

/// Prefix of every generated package name.
pub const PACKAGE_PREFIX: &str = "com.android.gki.";

static KMI_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(KMI_VERSION_PATTERN).expect("KMI version pattern is a valid regex")
});

/// A validated Kernel Module Interface version, e.g. `5.4-android12-0`.
///
/// All four fields are kept as the digit strings they were declared with, so
/// rendering a parsed version reproduces its input exactly.
///
/// # Example
///
/// ```
/// use gki_types::KmiVersion;
///
/// let kmi: KmiVersion = "5.10-android13-2".parse().unwrap();
/// assert_eq!(kmi.version(), "5");
/// assert_eq!(kmi.patch_level(), "10");
/// assert_eq!(kmi.android_release(), "android13");
/// assert_eq!(kmi.kmi_generation(), "2");
///
/// // Short forms are rejected outright
/// assert!(KmiVersion::parse("5.10").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KmiVersion {
    version: String,
    patch_level: String,
    android_release: String,
    kmi_generation: String,
}

impl KmiVersion {
    /// Parse a declared KMI version.
    ///
    /// # Errors
    ///
    /// Returns [`GkiError::Grammar`] carrying the input and
    /// [`KMI_VERSION_PATTERN`] when the string does not match.
    pub fn parse(s: &str) -> Result<Self> {
        let caps = KMI_VERSION_RE.captures(s).ok_or_else(|| GkiError::Grammar {
            input: s.to_string(),
            pattern: KMI_VERSION_PATTERN.to_string(),
        })?;

        Ok(Self {
            version: caps[1].to_string(),
            patch_level: caps[2].to_string(),
            android_release: caps[3].to_string(),
            kmi_generation: caps[4].to_string(),
        })
    }

    /// Kernel major version, e.g. `5`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Kernel patch level, e.g. `4`.
    pub fn patch_level(&self) -> &str {
        &self.patch_level
    }

    /// Android release token, e.g. `android12`.
    pub fn android_release(&self) -> &str {
        &self.android_release
    }

    /// KMI generation, e.g. `0`.
    pub fn kmi_generation(&self) -> &str {
        &self.kmi_generation
    }

    /// Sanitized form used as the suffix of the package name,
    /// e.g. `kmi_5_4_android12_0`.
    pub fn to_package_suffix(&self) -> String {
        format!(
            "kmi_{}_{}_{}_{}",
            self.version, self.patch_level, self.android_release, self.kmi_generation
        )
    }

    /// Canonical package name, e.g. `com.android.gki.kmi_5_4_android12_0`.
    pub fn package_name(&self) -> String {
        format!("{}{}", PACKAGE_PREFIX, self.to_package_suffix())
    }
}

impl fmt::Display for KmiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}-{}-{}",
            self.version, self.patch_level, self.android_release, self.kmi_generation
        )
    }
}

impl FromStr for KmiVersion {
    type Err = GkiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KmiVersion {
    type Error = GkiError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<KmiVersion> for String {
    fn from(kmi: KmiVersion) -> Self {
        kmi.to_string()
    }
}

/// A kernel release as reported by a GKI kernel, e.g. `5.4.42-android12-0`.
///
/// Unlike [`KmiVersion`], every component is numeric so releases can be
/// ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelRelease {
    /// Kernel major version
    pub version: u64,
    /// Kernel patch level
    pub patch_level: u64,
    /// Kernel sub level
    pub sub_level: u64,
    /// Number following `android`
    pub android_release: u64,
    /// KMI generation
    pub generation: u64,
}

static KERNEL_RELEASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)-android([0-9]+)-([0-9]+)")
        .expect("kernel release pattern is a valid regex")
});

impl KernelRelease {
    /// Parse a kernel release string.
    ///
    /// With `allow_suffix`, trailing content after the generation is
    /// ignored (as in `uname -r` output such as `5.4.42-android12-0-g1234`).
    /// Otherwise the whole string must be consumed. Returns `None` for
    /// anything that is not a GKI release.
    pub fn parse(s: &str, allow_suffix: bool) -> Option<Self> {
        let caps = KERNEL_RELEASE_RE.captures(s)?;
        let consumed = caps.get(0)?.end();
        if !allow_suffix && consumed != s.len() {
            return None;
        }

        Some(Self {
            version: caps[1].parse().ok()?,
            patch_level: caps[2].parse().ok()?,
            sub_level: caps[3].parse().ok()?,
            android_release: caps[4].parse().ok()?,
            generation: caps[5].parse().ok()?,
        })
    }

    /// The KMI portion as an ordered tuple.
    pub fn kmi_tuple(&self) -> (u64, u64, u64, u64) {
        (self.version, self.patch_level, self.android_release, self.generation)
    }

    /// The kernel version portion as an ordered tuple.
    pub fn kernel_version_tuple(&self) -> (u64, u64, u64) {
        (self.version, self.patch_level, self.sub_level)
    }

    /// The KMI version embedded in this release.
    pub fn kmi_version(&self) -> KmiVersion {
        KmiVersion {
            version: self.version.to_string(),
            patch_level: self.patch_level.to_string(),
            android_release: format!("android{}", self.android_release),
            kmi_generation: self.generation.to_string(),
        }
    }
}

impl fmt::Display for KernelRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-android{}-{}",
            self.version, self.patch_level, self.sub_level, self.android_release, self.generation
        )
    }
}
