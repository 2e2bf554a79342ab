//! Arguments for the OTA payload generator.

use gki_types::{bail, GkiError, Result};
use std::fmt;
use std::str::FromStr;

/// A `NAME:IMAGE` pair mapping a partition to the image written to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArg {
    /// Partition name
    pub partition: String,
    /// Image path
    pub image: String,
}

impl ImageArg {
    /// Create a pair.
    pub fn new(partition: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            image: image.into(),
        }
    }
}

impl FromStr for ImageArg {
    type Err = GkiError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [partition, image] if !partition.is_empty() && !image.is_empty() => {
                Ok(Self::new(*partition, *image))
            }
            _ => bail!(Validation, "Incorrect format: {}", s),
        }
    }
}

impl fmt::Display for ImageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.partition, self.image)
    }
}

/// Flags for the payload generator: `--key <certificate>` when signing,
/// followed by the image pairs.
pub fn payload_args(images: &[ImageArg], certificate: Option<&str>) -> Vec<String> {
    let mut args = Vec::with_capacity(images.len() + 2);
    if let Some(cert) = certificate {
        args.push("--key".to_string());
        args.push(cert.to_string());
    }
    args.extend(images.iter().map(ToString::to_string));
    args
}
