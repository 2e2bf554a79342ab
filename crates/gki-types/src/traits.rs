//! Core trait definitions.

use std::path::PathBuf;
use crate::errors::Result;

/// Source of the kernel release text produced by the extraction step.
///
/// The consistency check reads through this trait so it can be pointed at
/// a generated file or at an in-memory value.
pub trait ReleaseSource {
    /// Human-readable description used in diagnostics.
    fn describe(&self) -> String;

    /// Read the raw release text.
    fn read_release(&self) -> Result<String>;
}

impl ReleaseSource for PathBuf {
    fn describe(&self) -> String {
        self.display().to_string()
    }

    fn read_release(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self)?)
    }
}

/// Release text already held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRelease {
    /// Where the text came from
    pub description: String,
    /// The release text
    pub text: String,
}

impl InlineRelease {
    /// Create a new in-memory release source.
    pub fn new(description: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            text: text.into(),
        }
    }
}

impl ReleaseSource for InlineRelease {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn read_release(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}
