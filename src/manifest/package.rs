//! Typed view of a package manifest

use serde::Deserialize;
use serde_yaml::Value;

use super::{lenient, view};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default, deserialize_with = "lenient")]
    pub package_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub channels: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub default_channel: Option<String>,
}

/// A named release stream pointing at its current CSV
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, rename = "currentCSV", deserialize_with = "lenient")]
    pub current_csv: Option<String>,
}

impl PackageManifest {
    pub fn from_value(value: &Value) -> Self {
        view(value)
    }

    /// Channel entries; `None` when `channels` is missing or not a list
    pub fn channel_entries(&self) -> Option<Vec<Channel>> {
        self.channels
            .as_ref()
            .map(|channels| channels.iter().map(view).collect())
    }
}
