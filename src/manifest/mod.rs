//! Operator manifest documents
//!
//! This module handles:
//! - Parsing YAML manifest text into documents
//! - Classifying documents as CRD, CSV or package manifests
//! - Typed, lenient views over the three manifest kinds (see [`crd`], [`csv`], [`package`])
//!
//! Documents keep the raw parsed mapping so bundles can be re-serialized without
//! loss. The typed views never fail: a field with an unexpected shape reads as absent.

pub mod crd;
pub mod csv;
pub mod package;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::{Result, manifest::bad_yaml};

pub use crd::CustomResourceDefinition;
pub use csv::ClusterServiceVersion;
pub use package::PackageManifest;

/// `kind` of a custom resource definition manifest
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// `kind` of a cluster service version manifest
pub const CSV_KIND: &str = "ClusterServiceVersion";

/// Top-level key that marks a package manifest
pub const PACKAGE_NAME_KEY: &str = "packageName";

/// The kind of an operator artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    CustomResourceDefinition,
    ClusterServiceVersion,
    Package,
    Unknown,
}

impl ArtifactKind {
    /// Classify an already parsed YAML value.
    ///
    /// `packageName` wins over `kind` when a document carries both.
    pub fn of(value: &Value) -> Self {
        let Value::Mapping(mapping) = value else {
            return ArtifactKind::Unknown;
        };

        if mapping.contains_key(PACKAGE_NAME_KEY) {
            return ArtifactKind::Package;
        }

        match mapping.get("kind").and_then(Value::as_str) {
            Some(CRD_KIND) => ArtifactKind::CustomResourceDefinition,
            Some(CSV_KIND) => ArtifactKind::ClusterServiceVersion,
            _ => ArtifactKind::Unknown,
        }
    }

    /// Key of the bundle collection this kind is stored under
    pub fn bundle_key(self) -> Option<&'static str> {
        match self {
            ArtifactKind::CustomResourceDefinition => Some("customResourceDefinitions"),
            ArtifactKind::ClusterServiceVersion => Some("clusterServiceVersions"),
            ArtifactKind::Package => Some("packages"),
            ArtifactKind::Unknown => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::CustomResourceDefinition => CRD_KIND,
            ArtifactKind::ClusterServiceVersion => CSV_KIND,
            ArtifactKind::Package => "Package",
            ArtifactKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Parse YAML text, failing with `BadYaml` on any syntax error
///
/// # Errors
///
/// Returns `CourierError::BadYaml` if the text is not a single valid YAML document.
pub fn parse_yaml(text: &str, path: Option<&Path>) -> Result<Value> {
    serde_yaml::from_str(text).map_err(|e| {
        let label = path.map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
        bad_yaml(label, e.to_string())
    })
}

/// Classify YAML text as one of the operator artifact kinds
///
/// # Errors
///
/// Returns `CourierError::BadYaml` if the text cannot be parsed.
#[allow(dead_code)] // used in tests
pub fn classify(text: &str) -> Result<ArtifactKind> {
    parse_yaml(text, None).map(|value| ArtifactKind::of(&value))
}

/// A parsed manifest together with the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    path: Option<PathBuf>,
    kind: ArtifactKind,
    content: Value,
}

impl ManifestDocument {
    /// Parse and classify YAML text
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BadYaml` if the text cannot be parsed.
    pub fn parse(path: Option<PathBuf>, text: &str) -> Result<Self> {
        let content = parse_yaml(text, path.as_deref())?;
        Ok(Self::from_value(path, content))
    }

    /// Wrap an already parsed value
    pub fn from_value(path: Option<PathBuf>, content: Value) -> Self {
        let kind = ArtifactKind::of(&content);
        Self {
            path,
            kind,
            content,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Short label for log and report context: parent folder plus file name
    pub fn source_label(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        let file_name = path.file_name()?;
        let label = match path.parent().and_then(Path::file_name) {
            Some(parent) => Path::new(parent).join(file_name),
            None => PathBuf::from(file_name),
        };
        Some(label.display().to_string())
    }

    /// `metadata.name`, if the document defines one as a string
    pub fn metadata_name(&self) -> Option<&str> {
        self.content.get("metadata")?.get("name")?.as_str()
    }
}

/// Deserialize a field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_yaml::from_value(value).ok())
}

/// Deserialize a raw field so an explicit `null` reads as present
///
/// Plain `Option<Value>` folds `key: ~` into `None`, which would make a present
/// but empty key look missing.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Read a typed view out of a raw value, falling back to an empty view
fn view<T: DeserializeOwned + Default>(value: &Value) -> T {
    serde_yaml::from_value(value.clone()).unwrap_or_default()
}

/// Render a scalar value as a string (`1.0.0`, `true`, `42`)
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
