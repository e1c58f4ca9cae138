//! Push operation module
//!
//! Verifies a bundle directory against its target repository, stages the files
//! that make up the pushed bundle and sends them to the app registry.

use std::path::{Path, PathBuf};

use tracing::info;

use super::verify::{ManifestSource, VerifiedManifest, VerifyOptions, build_and_verify};
use crate::bundle::format;
use crate::common::fs::{BLACKLISTED_FILES, copy_file, write_text};
use crate::config::Settings;
use crate::error::{Result, bundle::structural};
use crate::manifest::ManifestDocument;
use crate::registry::{PushRequest, push_dir};
use crate::temp::staging_dir;

/// File name of the formatted bundle pushed for flat layouts
pub const BUNDLE_FILE: &str = "bundle.yaml";

/// Configuration options for push
#[derive(Debug, Clone)]
pub struct PushOptions {
    pub request: PushRequest,
    pub registry_host: String,
    pub verify: VerifyOptions,
}

impl PushOptions {
    pub fn new(request: PushRequest, settings: &Settings) -> Self {
        let verify = VerifyOptions {
            repository: Some(request.repository.clone()),
            ..VerifyOptions::from_settings(settings)
        };
        Self {
            request,
            registry_host: settings.registry_host.clone(),
            verify,
        }
    }
}

/// High-level push operation
pub struct PushOperation {
    options: PushOptions,
}

impl PushOperation {
    pub fn new(options: PushOptions) -> Self {
        Self { options }
    }

    /// Verify `source_dir`, then push it
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BundleInvalid` before any network traffic if the
    /// bundle does not validate, and registry errors if the push fails.
    pub fn execute(&self, source_dir: &Path, validation_output: Option<&Path>) -> Result<VerifiedManifest> {
        let verified = build_and_verify(
            &ManifestSource::Directory(source_dir.to_path_buf()),
            &self.options.verify,
            validation_output,
        )?;

        let staging = staging_dir("push")?;
        let dir = staging.path().join(&self.options.request.repository);
        let staged = stage(&verified, source_dir, &dir)?;
        info!(files = staged.len(), "staged bundle for push");

        push_dir(&self.options.registry_host, &dir, &self.options.request)?;
        Ok(verified)
    }
}

/// Write the files making up the pushed bundle into `dir`
///
/// Flat layouts become a single formatted `bundle.yaml`; nested layouts keep
/// their package and version folders.
fn stage(verified: &VerifiedManifest, source_dir: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    if let Some(bundle) = &verified.bundle {
        let path = dir.join(BUNDLE_FILE);
        write_text(&path, &format(bundle)?.to_yaml()?)?;
        return Ok(vec![path]);
    }

    let Some(scan) = &verified.scan else {
        return Err(structural("No manifests to push."));
    };
    let documents = std::iter::once(&scan.package).chain(
        scan.manifest_folders()
            .flat_map(|folder| folder.crds.iter().chain(&folder.csvs)),
    );

    let mut staged = Vec::new();
    for source in documents.filter_map(ManifestDocument::path) {
        let is_blacklisted = source
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| BLACKLISTED_FILES.contains(&name));
        if is_blacklisted {
            continue;
        }
        let target = dir.join(source.strip_prefix(source_dir).unwrap_or(source));
        copy_file(source, &target)?;
        staged.push(target);
    }
    Ok(staged)
}
