//! Typed view of a CustomResourceDefinition manifest

use serde::Deserialize;
use serde_yaml::Value;

use super::{lenient, present, view};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    #[serde(default, deserialize_with = "present")]
    pub api_version: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<CrdMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub spec: Option<CrdSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdSpec {
    #[serde(default, deserialize_with = "lenient")]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub names: Option<CrdNames>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub versions: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdNames {
    #[serde(default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub plural: Option<String>,
}

/// One entry of `spec.versions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdVersion {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub served: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub storage: Option<Value>,
}

impl CrdVersion {
    pub fn is_storage(&self) -> bool {
        matches!(self.storage, Some(Value::Bool(true)))
    }
}

impl CustomResourceDefinition {
    pub fn from_value(value: &Value) -> Self {
        view(value)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.spec.as_ref()?.names.as_ref()?.kind.as_deref()
    }

    /// `{spec.names.plural}.{spec.group}`, when both are defined
    pub fn qualified_name(&self) -> Option<String> {
        let spec = self.spec.as_ref()?;
        let plural = spec.names.as_ref()?.plural.as_deref()?;
        let group = spec.group.as_deref()?;
        Some(format!("{plural}.{group}"))
    }

    /// Entries of `spec.versions`; entries that are not mappings read as empty
    pub fn version_entries(&self) -> Vec<CrdVersion> {
        self.spec
            .as_ref()
            .and_then(|spec| spec.versions.as_ref())
            .map(|versions| versions.iter().map(view).collect())
            .unwrap_or_default()
    }

    /// Whether `version` is served by this CRD through either representation
    pub fn declares_version(&self, version: &str) -> bool {
        let Some(spec) = self.spec.as_ref() else {
            return false;
        };
        spec.version.as_deref() == Some(version)
            || self
                .version_entries()
                .iter()
                .any(|entry| entry.name.as_deref() == Some(version))
    }
}
