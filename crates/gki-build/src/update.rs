//! Kernel update policy.
//!
//! Decides whether a device running `old` may take an update carrying `new`.
//! An empty `new` means the update does not carry a GKI kernel.

use gki_types::{GkiError, KernelRelease, Result};
use tracing::info;

/// An allowed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The running kernel is not GKI, so any update is allowed
    FromLegacy,
    /// A GKI to GKI update that does not go backwards
    Permitted {
        /// Running release
        from: KernelRelease,
        /// Incoming release
        to: KernelRelease,
    },
}

/// Check whether updating from `old` to `new` is allowed.
///
/// # Errors
///
/// [`GkiError::UpdateRejected`] when `old` is empty, `new` is not a GKI
/// release, a GKI kernel would be replaced by a non-GKI one, or any of the
/// KMI version, Android release or kernel version would decrease.
pub fn check_kernel_update(old: &str, new: &str) -> Result<UpdateOutcome> {
    if old.is_empty() {
        return reject("unable to get kernel release".to_string());
    }

    let new_release = if new.is_empty() {
        info!("New build does not contain GKI");
        None
    } else {
        match KernelRelease::parse(new, false) {
            Some(release) => Some(release),
            None => return reject(format!("'{}' is not a valid GKI kernel release", new)),
        }
    };

    let Some(old_release) = KernelRelease::parse(old, true) else {
        info!("Current build does not contain GKI, permitting update to '{}'", new);
        return Ok(UpdateOutcome::FromLegacy);
    };

    let Some(new_release) = new_release else {
        return reject(format!("cannot update from GKI '{}' to a non-GKI build", old_release));
    };

    let reason = if old_release.kmi_tuple() > new_release.kmi_tuple() {
        Some("KMI version decreases")
    } else if old_release.android_release > new_release.android_release {
        Some("Android release decreases")
    } else if old_release.kernel_version_tuple() > new_release.kernel_version_tuple() {
        Some("kernel version decreases")
    } else {
        None
    };

    if let Some(reason) = reason {
        return reject(format!(
            "cannot update from {} to {}: {}",
            old_release, new_release, reason
        ));
    }

    info!("Allowing update from {} to {}", old_release, new_release);
    Ok(UpdateOutcome::Permitted {
        from: old_release,
        to: new_release,
    })
}

// Rejections are only reported through the returned error.
fn reject<T>(message: String) -> Result<T> {
    Err(GkiError::UpdateRejected(message))
}
