//! Wire format for bundles pushed to an app registry
//!
//! The registry expects each manifest collection as a single YAML string rather
//! than a list. An empty collection is the empty string. `serde_yaml` emits
//! multi-line scalars (CSV descriptions, the collection strings themselves) in
//! literal block style, which keeps the pushed document readable.
//!
//! `serde_yaml` has no per-scalar style control, so a single-line value such as
//! a one-line `alm-examples` JSON array is written as a quoted scalar instead of
//! a literal block. Both forms load back to the same string.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::Bundle;
use crate::error::{Result, manifest::bad_yaml};
use crate::manifest::ManifestDocument;

/// A push-ready bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedBundle {
    #[serde(default)]
    pub data: FormattedData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedData {
    #[serde(default)]
    pub custom_resource_definitions: String,
    #[serde(default)]
    pub cluster_service_versions: String,
    #[serde(default)]
    pub packages: String,
}

impl FormattedBundle {
    /// Serialize as the `bundle.yaml` document pushed to the registry
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BadYaml` if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| bad_yaml("bundle.yaml", e.to_string()))
    }

    /// Parse a `bundle.yaml` document
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BadYaml` if the text is not a formatted bundle.
    #[allow(dead_code)] // used in tests
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| bad_yaml("bundle.yaml", e.to_string()))
    }
}

/// Convert a bundle into its push-ready form
///
/// # Errors
///
/// Returns `CourierError::BadYaml` if a collection cannot be serialized.
pub fn format(bundle: &Bundle) -> Result<FormattedBundle> {
    Ok(FormattedBundle {
        data: FormattedData {
            custom_resource_definitions: dump(&bundle.custom_resource_definitions)?,
            cluster_service_versions: dump(&bundle.cluster_service_versions)?,
            packages: dump(&bundle.packages)?,
        },
    })
}

/// Convert a push-ready bundle back into lists of manifests
///
/// # Errors
///
/// Returns `CourierError::BadYaml` if a collection string is not valid YAML.
pub fn unformat(formatted: &FormattedBundle) -> Result<Bundle> {
    Ok(Bundle {
        custom_resource_definitions: load(&formatted.data.custom_resource_definitions)?,
        cluster_service_versions: load(&formatted.data.cluster_service_versions)?,
        packages: load(&formatted.data.packages)?,
    })
}

fn dump(documents: &[ManifestDocument]) -> Result<String> {
    if documents.is_empty() {
        return Ok(String::new());
    }
    let contents: Vec<&Value> = documents.iter().map(ManifestDocument::content).collect();
    serde_yaml::to_string(&contents).map_err(|e| bad_yaml("bundle.yaml", e.to_string()))
}

fn load(text: &str) -> Result<Vec<ManifestDocument>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_yaml::from_str(text).map_err(|e| bad_yaml("bundle.yaml", e.to_string()))?;
    let items = match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items,
        single => vec![single],
    };

    Ok(items
        .into_iter()
        .map(|item| ManifestDocument::from_value(None, item))
        .collect())
}
