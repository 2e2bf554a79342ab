//! Consistency check between a declared KMI version and a built kernel.
//!
//! The kernel release must look like
//! `<version>.<patchLevel>.<subLevel>-<androidRelease>-<kmiGeneration>`,
//! optionally followed by content that does not start with a digit
//! (e.g. `-g0123abcd`). The sub level is free-running.
//!
//! All four KMI fields are enforced. Some historical build rules only
//! compared `version.patchLevel.subLevel`; that weaker form is not offered.

use gki_core::{time, util};
use gki_types::{GkiError, KmiVersion, ReleaseSource, Result};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// A KMI version check bound to the artifact it inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KmiCheck {
    /// Declared KMI version
    pub kmi_version: KmiVersion,
    /// Description of the checked artifact, used in diagnostics
    pub source: String,
}

impl KmiCheck {
    /// Create a check of `source` against `kmi_version`.
    pub fn new(kmi_version: KmiVersion, source: impl Into<String>) -> Self {
        Self {
            kmi_version,
            source: source.into(),
        }
    }

    /// Anchored pattern a matching kernel release satisfies.
    pub fn pattern(&self) -> String {
        let kmi = &self.kmi_version;
        format!(
            "^{}[.]{}[.][0-9]+-{}-{}([^0-9].*)?$",
            regex::escape(kmi.version()),
            regex::escape(kmi.patch_level()),
            regex::escape(kmi.android_release()),
            regex::escape(kmi.kmi_generation()),
        )
    }

    /// One-line description of what the check does.
    pub fn description(&self) -> String {
        format!("check KMI version is {} in {}", self.kmi_version, self.source)
    }

    /// Verify release text.
    ///
    /// Trailing newlines are ignored, as when the text is read with `$(cat ...)`.
    ///
    /// # Errors
    ///
    /// [`GkiError::KmiMismatch`] naming the source, the release read and the
    /// expected KMI version.
    pub fn verify(&self, release: &str) -> Result<()> {
        let release = release.trim_end_matches(|c| c == '\n' || c == '\r');
        let re = Regex::new(&self.pattern())
            .map_err(|e| GkiError::Bug(format!("KMI check pattern does not compile: {}", e)))?;

        if re.is_match(release) {
            debug!("{}: '{}' matches", self.description(), release);
            Ok(())
        } else {
            Err(GkiError::KmiMismatch {
                artifact: self.source.clone(),
                actual: release.to_string(),
                expected: self.kmi_version.to_string(),
            })
        }
    }

    /// Read release text from `source` and verify it.
    pub fn verify_source(&self, source: &dyn ReleaseSource) -> Result<()> {
        debug!("Reading kernel release from {}", source.describe());
        let release = source.read_release()?;
        self.verify(&release)
    }

    /// Verify `source` and, on success, write the completion marker.
    ///
    /// Nothing is written when the check fails, so the package depending on
    /// the marker cannot be completed.
    pub fn run(&self, source: &dyn ReleaseSource, marker: &Path) -> Result<()> {
        self.verify_source(source)?;
        util::write_marker(marker, &format!("{}\n", time::timestamp()))?;
        info!("KMI version {} verified in {}", self.kmi_version, self.source);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gki_types::InlineRelease;
    use proptest::prelude::*;

    fn check(kmi: &str) -> KmiCheck {
        KmiCheck::new(KmiVersion::parse(kmi).unwrap(), "boot.img")
    }

    #[test]
    fn test_pattern() {
        assert_eq!(
            check("5.4-android12-3").pattern(),
            "^5[.]4[.][0-9]+-android12-3([^0-9].*)?$"
        );
    }

    #[test]
    fn test_matching_release_passes() {
        let c = check("5.4-android12-3");
        c.verify("5.4.99-android12-3").unwrap();
        c.verify("5.4.99-android12-3\n").unwrap();
        c.verify("5.4.0-android12-3-g0123abcd").unwrap();
        c.verify("5.4.99-android12-3-ab7654321").unwrap();
    }

    #[test]
    fn test_mismatch_reports_all_three_parts() {
        let err = check("5.4-android12-3").verify("5.4.99-android12-4").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("boot.img"), "{}", msg);
        assert!(msg.contains("5.4.99-android12-4"), "{}", msg);
        assert!(msg.contains("5.4-android12-3"), "{}", msg);
    }

    #[test]
    fn test_strict_field_matching() {
        let c = check("5.4-android12-3");
        for bad in [
            "5.4.99-android12-33",
            "5.4.99-android13-3",
            "5.10.99-android12-3",
            "15.4.99-android12-3",
            "5.4-android12-3",
            "5.4.x-android12-3",
            "",
        ] {
            assert!(
                matches!(c.verify(bad), Err(GkiError::KmiMismatch { .. })),
                "{:?} should not match",
                bad
            );
        }
    }

    #[test]
    fn test_run_writes_marker_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let c = check("5.10-android13-1");

        let marker = dir.path().join("ok-timestamp");
        c.run(&InlineRelease::new("boot.img", "5.10.43-android13-1\n"), &marker)
            .unwrap();
        assert!(marker.exists());

        let marker = dir.path().join("bad-timestamp");
        assert!(c
            .run(&InlineRelease::new("boot.img", "5.10.43-android13-2\n"), &marker)
            .is_err());
        assert!(!marker.exists());
    }

    #[test]
    fn test_run_reads_release_file() {
        let dir = tempfile::tempdir().unwrap();
        let release = dir.path().join("kernel_release.txt");
        std::fs::write(&release, "5.10.43-android13-1\n").unwrap();

        let marker = dir.path().join("out").join("timestamp");
        check("5.10-android13-1").run(&release, &marker).unwrap();
        assert!(marker.exists());

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            check("5.10-android13-1").run(&missing, &marker),
            Err(GkiError::Io(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_sub_level_is_free(
            major in 1u32..10,
            minor in 0u32..20,
            sub in 0u32..500,
            release in 11u32..20,
            generation in 0u32..10,
            suffix in "(-g[0-9a-f]{8})?",
        ) {
            let kmi = KmiVersion::parse(&format!("{}.{}-android{}-{}", major, minor, release, generation)).unwrap();
            let c = KmiCheck::new(kmi, "boot.img");

            let good = format!("{}.{}.{}-android{}-{}{}", major, minor, sub, release, generation, suffix);
            prop_assert!(c.verify(&good).is_ok());

            let bad = format!("{}.{}.{}-android{}-{}{}", major, minor, sub, release, generation + 1, suffix);
            prop_assert!(c.verify(&bad).is_err());
        }
    }
}
