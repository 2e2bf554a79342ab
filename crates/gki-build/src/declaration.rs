//! Module declarations.
//!
//! A [`RawDeclaration`] is what a caller writes. It is turned into a
//! [`ValidatedDeclaration`] once, and graph assembly only ever sees the
//! validated form.

use gki_core::util;
use gki_types::{GkiError, KmiVersion, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A module declaration as written by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDeclaration {
    /// Unique module name
    #[serde(default)]
    pub name: String,

    /// Declares a factory package instead of an OTA-bearing one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<bool>,

    /// Boot image path relative to the product output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_out_path: Option<String>,

    /// Declared KMI version, e.g. `5.4-android12-0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kmi_version: Option<String>,

    /// Certificate used to sign the OTA payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ota_payload_certificate: Option<String>,

    /// Legacy modules superseded by this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeclarationDocument {
    Many(Vec<RawDeclaration>),
    One(RawDeclaration),
}

impl RawDeclaration {
    /// Parse a YAML document holding one declaration or a list of them.
    pub fn from_yaml(content: &str) -> Result<Vec<Self>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        match util::load_yaml::<DeclarationDocument>(content)? {
            DeclarationDocument::Many(list) => Ok(list),
            DeclarationDocument::One(single) => Ok(vec![single]),
        }
    }

    /// Validate the declaration.
    ///
    /// # Errors
    ///
    /// [`GkiError::Declaration`] naming the offending field when:
    /// - `name` is empty
    /// - `kmi_version` is missing or malformed
    /// - both or neither of `factory` and `product_out_path` are set
    /// - `product_out_path` or `ota_payload_certificate` is empty
    /// - `name` or `product_out_path` has surrounding whitespace
    /// - a factory module's name differs from its canonical package name
    pub fn validate(self) -> Result<ValidatedDeclaration> {
        let name = self.name;
        if name.trim().is_empty() {
            return Err(GkiError::declaration("<unnamed>", "name", "a module name is required"));
        }
        if name.trim() != name {
            return Err(GkiError::declaration(&name, "name", "must not have surrounding whitespace"));
        }

        let kmi_version = match self.kmi_version.as_deref() {
            None => return Err(GkiError::declaration(&name, "kmi_version", "a KMI version is required")),
            Some(raw) => KmiVersion::parse(raw)
                .map_err(|e| GkiError::declaration(&name, "kmi_version", e.to_string()))?,
        };

        let factory = self.factory.unwrap_or(false);
        let variant = match (factory, self.product_out_path) {
            (true, Some(_)) => {
                return Err(GkiError::declaration(
                    &name,
                    "factory",
                    "factory and product_out_path are mutually exclusive",
                ))
            }
            (true, None) => {
                let package_name = kmi_version.package_name();
                if name != package_name {
                    return Err(GkiError::declaration(
                        &name,
                        "name",
                        format!("a factory module must be named '{}'", package_name),
                    ));
                }
                Variant::Factory
            }
            (false, None) => {
                return Err(GkiError::declaration(
                    &name,
                    "product_out_path",
                    "required unless factory is set",
                ))
            }
            (false, Some(path)) => {
                if path.trim().is_empty() {
                    return Err(GkiError::declaration(&name, "product_out_path", "must not be empty"));
                }
                if path.trim() != path {
                    return Err(GkiError::declaration(
                        &name,
                        "product_out_path",
                        "must not have surrounding whitespace",
                    ));
                }
                Variant::Ota {
                    product_out_path: path,
                }
            }
        };

        let certificate = match self.ota_payload_certificate {
            Some(cert) if cert.trim().is_empty() => {
                return Err(GkiError::declaration(&name, "ota_payload_certificate", "must not be empty"))
            }
            Some(_) if variant == Variant::Factory => {
                warn!("{}: ota_payload_certificate is ignored for factory packages", name);
                None
            }
            other => other,
        };

        if let Some(pos) = self.overrides.iter().position(|o| o.trim().is_empty()) {
            return Err(GkiError::declaration(
                &name,
                "overrides",
                format!("entry {} is empty", pos),
            ));
        }

        Ok(ValidatedDeclaration {
            name,
            kmi_version,
            variant,
            certificate,
            overrides: self.overrides,
        })
    }
}

impl TryFrom<RawDeclaration> for ValidatedDeclaration {
    type Error = GkiError;

    fn try_from(raw: RawDeclaration) -> Result<Self> {
        raw.validate()
    }
}

/// Which pipeline a declaration asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Factory package: manifest only, directly installable
    Factory,
    /// Full pipeline from a boot image, delivered as an update payload
    Ota {
        /// Boot image path relative to the product output directory
        product_out_path: String,
    },
}

/// A declaration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDeclaration {
    name: String,
    kmi_version: KmiVersion,
    variant: Variant,
    certificate: Option<String>,
    overrides: Vec<String>,
}

impl ValidatedDeclaration {
    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared KMI version.
    pub fn kmi_version(&self) -> &KmiVersion {
        &self.kmi_version
    }

    /// Requested pipeline.
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Whether this is a factory declaration.
    pub fn is_factory(&self) -> bool {
        self.variant == Variant::Factory
    }

    /// Boot image path, for OTA declarations.
    pub fn product_out_path(&self) -> Option<&str> {
        match &self.variant {
            Variant::Ota { product_out_path } => Some(product_out_path),
            Variant::Factory => None,
        }
    }

    /// OTA payload signing certificate.
    pub fn certificate(&self) -> Option<&str> {
        self.certificate.as_deref()
    }

    /// Superseded legacy modules.
    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }

    /// Canonical package name.
    pub fn package_name(&self) -> String {
        self.kmi_version.package_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ota(name: &str, kmi: &str, path: &str) -> RawDeclaration {
        RawDeclaration {
            name: name.to_string(),
            product_out_path: Some(path.to_string()),
            kmi_version: Some(kmi.to_string()),
            ..Default::default()
        }
    }

    fn field_of(err: GkiError) -> String {
        match err {
            GkiError::Declaration { field, .. } => field,
            other => panic!("expected a declaration error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_ota_declaration() {
        let decl = ota("pkg_kmi_5_4_android12_0", "5.4-android12-0", "boot.img")
            .validate()
            .unwrap();
        assert_eq!(decl.name(), "pkg_kmi_5_4_android12_0");
        assert_eq!(decl.product_out_path(), Some("boot.img"));
        assert!(!decl.is_factory());
        assert_eq!(decl.package_name(), "com.android.gki.kmi_5_4_android12_0");
    }

    #[test]
    fn test_factory_and_path_are_exclusive() {
        let mut raw = ota("com.android.gki.kmi_5_4_android12_0", "5.4-android12-0", "boot.img");
        raw.factory = Some(true);
        assert_eq!(field_of(raw.validate().unwrap_err()), "factory");
    }

    #[test]
    fn test_neither_factory_nor_path() {
        let mut raw = ota("pkg", "5.4-android12-0", "boot.img");
        raw.product_out_path = None;
        assert_eq!(field_of(raw.clone().validate().unwrap_err()), "product_out_path");

        raw.factory = Some(false);
        assert_eq!(field_of(raw.validate().unwrap_err()), "product_out_path");
    }

    #[test]
    fn test_empty_path() {
        let raw = ota("pkg", "5.4-android12-0", "  ");
        assert_eq!(field_of(raw.validate().unwrap_err()), "product_out_path");
    }

    #[test]
    fn test_padded_path_and_name_rejected() {
        let err = ota("pkg", "5.4-android12-0", " boot.img ").validate().unwrap_err();
        assert!(err.to_string().contains("whitespace"), "{}", err);
        assert_eq!(field_of(err), "product_out_path");

        let raw = ota("pkg ", "5.4-android12-0", "boot.img");
        assert_eq!(field_of(raw.validate().unwrap_err()), "name");
    }

    #[test]
    fn test_malformed_version_names_field_and_pattern() {
        let err = ota("pkg", "5.4", "boot.img").validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'5.4'"), "{}", msg);
        assert!(msg.contains(gki_types::KMI_VERSION_PATTERN), "{}", msg);
        assert_eq!(field_of(err), "kmi_version");

        let mut raw = ota("pkg", "5.4-android12-0", "boot.img");
        raw.kmi_version = None;
        assert_eq!(field_of(raw.validate().unwrap_err()), "kmi_version");
    }

    #[test]
    fn test_factory_name_must_be_package_name() {
        let raw = RawDeclaration {
            name: "gki_factory".to_string(),
            factory: Some(true),
            kmi_version: Some("5.4-android12-0".to_string()),
            ..Default::default()
        };
        let err = raw.validate().unwrap_err();
        assert!(err.to_string().contains("com.android.gki.kmi_5_4_android12_0"));
        assert_eq!(field_of(err), "name");

        let raw = RawDeclaration {
            name: "com.android.gki.kmi_5_4_android12_0".to_string(),
            factory: Some(true),
            kmi_version: Some("5.4-android12-0".to_string()),
            ota_payload_certificate: Some("cert".to_string()),
            ..Default::default()
        };
        let decl = raw.validate().unwrap();
        assert!(decl.is_factory());
        assert_eq!(decl.certificate(), None);
    }

    #[test]
    fn test_empty_name_and_certificate() {
        let raw = ota("", "5.4-android12-0", "boot.img");
        assert_eq!(field_of(raw.validate().unwrap_err()), "name");

        let mut raw = ota("pkg", "5.4-android12-0", "boot.img");
        raw.ota_payload_certificate = Some(String::new());
        assert_eq!(field_of(raw.validate().unwrap_err()), "ota_payload_certificate");

        let mut raw = ota("pkg", "5.4-android12-0", "boot.img");
        raw.overrides = vec!["legacy".to_string(), " ".to_string()];
        assert_eq!(field_of(raw.validate().unwrap_err()), "overrides");
    }

    #[test]
    fn test_from_yaml_single_and_list() {
        let single = RawDeclaration::from_yaml(
            "name: pkg\nkmi_version: 5.4-android12-0\nproduct_out_path: boot.img\n",
        )
        .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].kmi_version.as_deref(), Some("5.4-android12-0"));

        let list = RawDeclaration::from_yaml(
            "- name: a\n  kmi_version: 5.4-android12-0\n  product_out_path: boot.img\n\
             - name: com.android.gki.kmi_5_4_android12_0\n  kmi_version: 5.4-android12-0\n  factory: true\n",
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].factory, Some(true));

        assert!(RawDeclaration::from_yaml("").unwrap().is_empty());
        assert!(RawDeclaration::from_yaml("name: a\nbogus: 1\n").is_err());
    }
}
