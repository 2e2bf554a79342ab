//! Error types for GKI operations.

use thiserror::Error;

/// The main error type for GKI operations.
///
/// Declaration errors are raised before any graph is built. Consistency
/// failures are raised while executing a check node and only concern the
/// package that owns it.
#[derive(Error, Debug)]
pub enum GkiError {
    /// A KMI version string does not match the grammar
    #[error("Poorly formed KMI version: '{input}' must match '{pattern}'")]
    Grammar {
        /// The offending string
        input: String,
        /// The expected pattern, verbatim
        pattern: String,
    },

    /// A module declaration is invalid
    #[error("{module}: invalid '{field}': {message}")]
    Declaration {
        /// Declared module name (may be empty when the name itself is missing)
        module: String,
        /// Offending declaration field
        field: String,
        /// Human-readable description
        message: String,
    },

    /// Two declarations produce a node with the same name
    #[error("Duplicate build node '{0}'")]
    DuplicateNode(String),

    /// A node references a predecessor that has not been declared
    #[error("Build node '{node}' references undeclared node '{input}'")]
    UnknownNode {
        /// Node holding the dangling reference
        node: String,
        /// Referenced name
        input: String,
    },

    /// The kernel release embedded in an artifact disagrees with the declared KMI version
    #[error("KMI version mismatch in {artifact}: kernel release is '{actual}', expected KMI version {expected}")]
    KmiMismatch {
        /// Description of the artifact that was read
        artifact: String,
        /// The release string actually read
        actual: String,
        /// The declared `version.patchLevel-androidRelease-generation`
        expected: String,
    },

    /// A kernel update is not allowed
    #[error("Kernel update rejected: {0}")]
    UpdateRejected(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal bug - should never happen in production
    #[error("Bug detected: {0}\n\nThis is an internal error. Please report it to the gki-rs maintainers.")]
    Bug(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl GkiError {
    /// Build a declaration error for `field` of `module`.
    pub fn declaration(
        module: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GkiError::Declaration {
            module: module.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error was caused by the declaration rather than the build.
    pub fn is_declaration_error(&self) -> bool {
        matches!(self, GkiError::Grammar { .. } | GkiError::Declaration { .. })
    }
}

/// A specialized Result type for GKI operations.
pub type Result<T> = std::result::Result<T, GkiError>;

/// Helper macro to bail out with a GkiError
///
/// # Example
///
/// ```ignore
/// if !valid {
///     bail!(Validation, "Invalid image argument: {}", arg);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::GkiError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::GkiError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::GkiError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::GkiError::Other(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_message_carries_input_and_pattern() {
        let err = GkiError::Grammar {
            input: "5.4".to_string(),
            pattern: "^x$".to_string(),
        };
        assert_eq!(err.to_string(), "Poorly formed KMI version: '5.4' must match '^x$'");
        assert!(err.is_declaration_error());
    }

    #[test]
    fn test_kmi_mismatch_message() {
        let err = GkiError::KmiMismatch {
            artifact: "boot.img".to_string(),
            actual: "5.4.99-android12-4".to_string(),
            expected: "5.4-android12-3".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("boot.img"));
        assert!(msg.contains("5.4.99-android12-4"));
        assert!(msg.contains("5.4-android12-3"));
        assert!(!err.is_declaration_error());
    }

    fn fails_validation() -> Result<()> {
        bail!(Validation, "bad value {}", 3);
    }

    #[test]
    fn test_bail_macro() {
        let err = fails_validation().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: bad value 3");
    }
}
