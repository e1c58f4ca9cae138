//! Typed view of a ClusterServiceVersion manifest
//!
//! Leaf fields whose shape is itself validated (lists, strings vs booleans) stay
//! as raw [`Value`]s so rule checks can tell "absent" from "malformed". A key
//! written with an explicit `null` counts as present.

use serde::Deserialize;
use serde_yaml::Value;

use super::{lenient, present, scalar_to_string, view};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersion {
    #[serde(default, deserialize_with = "present")]
    pub api_version: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<CsvMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub spec: Option<CsvSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub annotations: Option<CsvAnnotations>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvAnnotations {
    #[serde(default, deserialize_with = "present")]
    pub categories: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub container_image: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub created_at: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub support: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub certified: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub capabilities: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub repository: Option<Value>,
    #[serde(default, rename = "alm-examples", deserialize_with = "present")]
    pub alm_examples: Option<Value>,
}

impl CsvAnnotations {
    /// Look an annotation up by its manifest key
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            "categories" => self.categories.as_ref(),
            "description" => self.description.as_ref(),
            "containerImage" => self.container_image.as_ref(),
            "createdAt" => self.created_at.as_ref(),
            "support" => self.support.as_ref(),
            "certified" => self.certified.as_ref(),
            "capabilities" => self.capabilities.as_ref(),
            "repository" => self.repository.as_ref(),
            "alm-examples" => self.alm_examples.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvSpec {
    #[serde(default, deserialize_with = "present")]
    pub display_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub version: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub provider: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub maturity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub install_modes: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub links: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub maintainers: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub install: Option<InstallStrategy>,
    #[serde(default, deserialize_with = "lenient")]
    pub customresourcedefinitions: Option<CrdDescriptions>,
}

impl CsvSpec {
    /// Look a spec field up by its manifest key
    pub fn has_field(&self, key: &str) -> bool {
        match key {
            "displayName" => self.display_name.is_some(),
            "description" => self.description.is_some(),
            "icon" => self.icon.is_some(),
            "version" => self.version.is_some(),
            "provider" => self.provider.is_some(),
            "maturity" => self.maturity.is_some(),
            "installModes" => self.install_modes.is_some(),
            "links" => self.links.is_some(),
            "maintainers" => self.maintainers.is_some(),
            "install" => self.install.is_some(),
            "customresourcedefinitions" => self.customresourcedefinitions.is_some(),
            _ => false,
        }
    }

    /// `spec.version` rendered as a string
    pub fn version_string(&self) -> Option<String> {
        self.version.as_ref().and_then(scalar_to_string)
    }

    /// Entries of `spec.customresourcedefinitions.owned`, if the list is present
    pub fn owned_crds(&self) -> Option<Vec<OwnedCrd>> {
        let owned = self.customresourcedefinitions.as_ref()?.owned.as_ref()?;
        Some(owned.iter().map(view).collect())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallStrategy {
    #[serde(default, deserialize_with = "present")]
    pub strategy: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub spec: Option<InstallSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallSpec {
    #[serde(default, deserialize_with = "present")]
    pub deployments: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub permissions: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub cluster_permissions: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdDescriptions {
    #[serde(default, deserialize_with = "lenient")]
    pub owned: Option<Vec<Value>>,
}

/// One entry of `spec.customresourcedefinitions.owned`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnedCrd {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
}

impl ClusterServiceVersion {
    pub fn from_value(value: &Value) -> Self {
        view(value)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    #[allow(dead_code)] // used in tests
    pub fn annotations(&self) -> Option<&CsvAnnotations> {
        self.metadata.as_ref()?.annotations.as_ref()
    }
}
