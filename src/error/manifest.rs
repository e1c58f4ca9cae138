//! Manifest parsing and classification errors

use super::CourierError;

/// Creates a malformed YAML error
pub fn bad_yaml(path: impl Into<String>, reason: impl Into<String>) -> CourierError {
    CourierError::BadYaml {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an unknown artifact error (only raised under the reject policy)
pub fn unknown_artifact(path: impl Into<String>) -> CourierError {
    CourierError::UnknownArtifact { path: path.into() }
}
