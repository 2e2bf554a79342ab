//! Per-board eligibility of declarations.
//!
//! An ineligible declaration is not an error. It simply contributes no nodes,
//! which lets one source tree declare packages for several KMI versions and
//! boot image layouts at once.

use crate::declaration::ValidatedDeclaration;
use gki_types::BoardConfig;
use std::collections::BTreeSet;
use std::fmt;

/// Board facts consulted by the eligibility predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityFacts {
    /// Kernel binary names built for the board, in declaration order
    pub kernel_binaries: Vec<String>,
    /// KMI versions the board supports
    pub supported_kmi_versions: BTreeSet<String>,
}

impl EligibilityFacts {
    /// Build facts from explicit lists.
    pub fn new<K, V>(kernel_binaries: K, supported_kmi_versions: V) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            kernel_binaries: kernel_binaries.into_iter().map(Into::into).collect(),
            supported_kmi_versions: supported_kmi_versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `path` names a boot image the board produces.
    ///
    /// With no kernel binaries only `boot.img` qualifies. Otherwise each
    /// `kernel-X` binary maps to `boot-X.img`.
    pub fn boot_image_is_eligible(&self, path: &str) -> bool {
        if self.kernel_binaries.is_empty() {
            return path == "boot.img";
        }
        self.kernel_binaries
            .iter()
            .any(|kernel| format!("{}.img", kernel.replace("kernel", "boot")) == path)
    }

    /// Whether the board supports `kmi_version`.
    pub fn kmi_version_is_eligible(&self, kmi_version: &str) -> bool {
        self.supported_kmi_versions.contains(kmi_version)
    }

    /// Evaluate both predicates for a declaration.
    ///
    /// Factory declarations have no boot image, so only the version
    /// predicate applies to them.
    pub fn evaluate(&self, decl: &ValidatedDeclaration) -> Eligibility {
        if let Some(path) = decl.product_out_path() {
            if !self.boot_image_is_eligible(path) {
                return Eligibility::BootImageNotBuilt(path.to_string());
            }
        }

        let kmi = decl.kmi_version().to_string();
        if !self.kmi_version_is_eligible(&kmi) {
            return Eligibility::KmiVersionUnsupported(kmi);
        }

        Eligibility::Eligible
    }
}

impl From<&BoardConfig> for EligibilityFacts {
    fn from(board: &BoardConfig) -> Self {
        Self::new(
            board.kernel_binaries.iter().cloned(),
            board.supported_kmi_versions.iter().cloned(),
        )
    }
}

impl From<BoardConfig> for EligibilityFacts {
    fn from(board: BoardConfig) -> Self {
        Self::new(board.kernel_binaries, board.supported_kmi_versions)
    }
}

/// Result of an eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Both predicates hold
    Eligible,
    /// The board does not build the declared boot image
    BootImageNotBuilt(String),
    /// The board does not support the declared KMI version
    KmiVersionUnsupported(String),
}

impl Eligibility {
    /// Whether the declaration should produce nodes.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible => write!(f, "eligible"),
            Eligibility::BootImageNotBuilt(path) => {
                write!(f, "boot image '{}' is not built for this board", path)
            }
            Eligibility::KmiVersionUnsupported(kmi) => {
                write!(f, "KMI version {} is not supported by this board", kmi)
            }
        }
    }
}

/// Whether `decl` should produce nodes for the board described by `facts`.
pub fn is_eligible(decl: &ValidatedDeclaration, facts: &EligibilityFacts) -> bool {
    facts.evaluate(decl).is_eligible()
}
