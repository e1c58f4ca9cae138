//! Bundle assembly
//!
//! A [`Bundle`] is the canonical aggregate of a set of manifests: its CRDs, CSVs
//! and packages, each list in input order. Bundles are built once and are
//! read-only while being validated or formatted.

pub mod format;

use std::path::PathBuf;

use serde_yaml::Value;
use tracing::debug;

use crate::config::UnknownKindPolicy;
use crate::error::{Result, manifest::unknown_artifact};
use crate::manifest::{ArtifactKind, ManifestDocument};

pub use format::{FormattedBundle, format, unformat};

/// Key holding the three manifest collections in serialized bundles
pub const DATA_KEY: &str = "data";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub custom_resource_definitions: Vec<ManifestDocument>,
    pub cluster_service_versions: Vec<ManifestDocument>,
    pub packages: Vec<ManifestDocument>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a document into the collection matching its kind.
    ///
    /// Returns the document back if it is of unknown kind.
    pub fn push(&mut self, document: ManifestDocument) -> std::result::Result<(), ManifestDocument> {
        match document.kind() {
            ArtifactKind::CustomResourceDefinition => self.custom_resource_definitions.push(document),
            ArtifactKind::ClusterServiceVersion => self.cluster_service_versions.push(document),
            ArtifactKind::Package => self.packages.push(document),
            ArtifactKind::Unknown => return Err(document),
        }
        Ok(())
    }

    #[allow(dead_code)] // used in tests
    pub fn is_empty(&self) -> bool {
        self.custom_resource_definitions.is_empty()
            && self.cluster_service_versions.is_empty()
            && self.packages.is_empty()
    }

    /// Build a bundle from the `data` mapping of a serialized (unformatted) bundle.
    ///
    /// Collections that are missing or not lists read as empty. Elements are kept
    /// in the collection they were found under, whatever their content.
    pub fn from_data(data: &Value) -> Self {
        let collection = |key: &str| -> Vec<ManifestDocument> {
            data.get(key)
                .and_then(Value::as_sequence)
                .map(|items| {
                    items
                        .iter()
                        .map(|item| ManifestDocument::from_value(None, item.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            custom_resource_definitions: collection("customResourceDefinitions"),
            cluster_service_versions: collection("clusterServiceVersions"),
            packages: collection("packages"),
        }
    }
}

/// Builds bundles from raw manifest text
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleBuilder {
    unknown_kinds: UnknownKindPolicy,
}

impl BundleBuilder {
    pub fn new(unknown_kinds: UnknownKindPolicy) -> Self {
        Self { unknown_kinds }
    }

    /// Parse, classify and aggregate `(path, yaml text)` pairs
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BadYaml` for unparsable input, and
    /// `CourierError::UnknownArtifact` for unknown documents under the reject policy.
    pub fn build<I>(&self, documents: I) -> Result<Bundle>
    where
        I: IntoIterator<Item = (Option<PathBuf>, String)>,
    {
        let parsed = documents
            .into_iter()
            .map(|(path, text)| ManifestDocument::parse(path, &text))
            .collect::<Result<Vec<_>>>()?;
        self.build_documents(parsed)
    }

    /// Aggregate already parsed documents
    ///
    /// # Errors
    ///
    /// Returns `CourierError::UnknownArtifact` for unknown documents under the reject policy.
    pub fn build_documents(&self, documents: Vec<ManifestDocument>) -> Result<Bundle> {
        let mut bundle = Bundle::new();

        for document in documents {
            if let Err(unknown) = bundle.push(document) {
                let label = unknown
                    .source_label()
                    .unwrap_or_else(|| "<memory>".to_string());
                match self.unknown_kinds {
                    UnknownKindPolicy::Skip => {
                        debug!(file = %label, "ignoring document of unknown kind");
                    }
                    UnknownKindPolicy::Reject => return Err(unknown_artifact(label)),
                }
            }
        }

        Ok(bundle)
    }
}

/// Build a bundle with the default policy (unknown documents are dropped)
///
/// # Errors
///
/// Returns `CourierError::BadYaml` for unparsable input.
#[allow(dead_code)] // used in tests
pub fn build<I>(documents: I) -> Result<Bundle>
where
    I: IntoIterator<Item = (Option<PathBuf>, String)>,
{
    BundleBuilder::default().build(documents)
}
