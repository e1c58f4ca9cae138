//! Verify operation module
//!
//! Builds bundles from a manifest source and validates them, producing one
//! merged [`ValidationReport`]. Directory sources are split into validation
//! groups by layout: a flat directory is one bundle, a nested directory is one
//! bundle per version folder (each with the root package).

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info};

use crate::bundle::{Bundle, BundleBuilder, DATA_KEY, FormattedBundle, unformat};
use crate::common::fs::{read_text, write_text};
use crate::config::{Settings, Severity, UnknownKindPolicy};
use crate::error::{
    Result,
    bundle::invalid,
    fs::not_found,
    manifest::bad_yaml,
};
use crate::layout::{FLAT_KEY, Layout, ManifestScan};
use crate::manifest::{ArtifactKind, ManifestDocument, parse_yaml};
use crate::validate::{ValidationOptions, ValidationReport, validate, validate_value};

/// Where the manifests to verify come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// A flat or nested bundle directory
    Directory(PathBuf),
    /// YAML documents held in memory, treated as one flat bundle
    Yamls(Vec<String>),
    /// A single serialized bundle file with a top-level `data` key
    BundleFile(PathBuf),
}

impl ManifestSource {
    /// A directory path is a bundle directory, a file path a bundle file
    ///
    /// # Errors
    ///
    /// Returns `CourierError::FileNotFound` if the path does not exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Ok(ManifestSource::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(ManifestSource::BundleFile(path.to_path_buf()))
        } else {
            Err(not_found(path))
        }
    }
}

/// Configuration options for verify
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Package name the bundle must carry
    pub repository: Option<String>,
    pub ui_validate: bool,
    pub unknown_kinds: UnknownKindPolicy,
    pub alm_examples_severity: Severity,
}

impl VerifyOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            unknown_kinds: settings.unknown_kinds,
            alm_examples_severity: settings.alm_examples_severity,
            ..Self::default()
        }
    }

    fn validation(&self, nested: bool) -> ValidationOptions {
        ValidationOptions {
            repository: self.repository.clone(),
            nested,
            ui_validate: self.ui_validate,
            alm_examples_severity: self.alm_examples_severity,
        }
    }
}

/// Outcome of verifying a manifest source
#[derive(Debug, Clone)]
pub struct VerifiedManifest {
    pub report: ValidationReport,
    /// The single bundle of a flat source; `None` for nested directories
    pub bundle: Option<Bundle>,
    /// The directory scan, for directory sources
    pub scan: Option<ManifestScan>,
    pub nested: bool,
}

impl VerifiedManifest {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// Write the report as JSON followed by a newline
    ///
    /// # Errors
    ///
    /// Returns `CourierError::FileWriteFailed` if the file cannot be written.
    pub fn write_validation_output(&self, path: &Path) -> Result<()> {
        write_report(&self.report, path)
    }
}

fn write_report(report: &ValidationReport, path: &Path) -> Result<()> {
    let mut json = report.to_json()?;
    json.push('\n');
    write_text(path, &json)?;
    info!(path = %path.display(), "validation output written");
    Ok(())
}

/// Build and validate every bundle in `source`
///
/// An invalid bundle is not an error here; check [`VerifiedManifest::is_valid`].
///
/// # Errors
///
/// Returns an error for unreadable or unparsable input and for directories that
/// are not a valid flat or nested layout.
pub fn verify(source: &ManifestSource, options: &VerifyOptions) -> Result<VerifiedManifest> {
    match source {
        ManifestSource::Directory(dir) => verify_directory(dir, options),
        ManifestSource::Yamls(yamls) => {
            let documents = yamls
                .iter()
                .map(|text| ManifestDocument::parse(None, text))
                .collect::<Result<Vec<_>>>()?;
            let (bundle, report) = verify_group(documents, options, false)?;
            Ok(VerifiedManifest {
                report,
                bundle: Some(bundle),
                scan: None,
                nested: false,
            })
        }
        ManifestSource::BundleFile(path) => verify_bundle_file(path, options),
    }
}

/// Verify `source`, writing the report to `validation_output` if given
///
/// The report is written before validity is decided, so an invalid bundle still
/// leaves its report behind.
///
/// # Errors
///
/// Returns `CourierError::BundleInvalid` carrying the report if any error was found,
/// plus everything [`verify`] can return.
pub fn build_and_verify(
    source: &ManifestSource,
    options: &VerifyOptions,
    validation_output: Option<&Path>,
) -> Result<VerifiedManifest> {
    let verified = verify(source, options)?;

    if let Some(path) = validation_output {
        verified.write_validation_output(path)?;
    }

    if verified.is_valid() {
        Ok(verified)
    } else {
        Err(invalid(verified.report))
    }
}

fn verify_directory(dir: &Path, options: &VerifyOptions) -> Result<VerifiedManifest> {
    let scan = ManifestScan::scan(dir)?;
    let layout = scan.layout()?;
    let nested = layout == Layout::Nested;

    let mut report = ValidationReport::default();
    let mut flat_bundle = None;
    for group in scan.groups(layout) {
        debug!(group = %group.key, "verifying manifest group");
        let (bundle, group_report) = verify_group(group.documents, options, nested)?;
        report.merge(group_report);
        if group.key == FLAT_KEY {
            flat_bundle = Some(bundle);
        }
    }

    Ok(VerifiedManifest {
        report,
        bundle: flat_bundle,
        scan: Some(scan),
        nested,
    })
}

fn verify_group(
    documents: Vec<ManifestDocument>,
    options: &VerifyOptions,
    nested: bool,
) -> Result<(Bundle, ValidationReport)> {
    let bundle = BundleBuilder::new(options.unknown_kinds).build_documents(documents)?;
    let (_, report) = validate(&bundle, &options.validation(nested));
    Ok((bundle, report))
}

fn verify_bundle_file(path: &Path, options: &VerifyOptions) -> Result<VerifiedManifest> {
    let text = read_text(path)?;
    let value = parse_yaml(&text, Some(path))?;
    let validation = options.validation(false);

    let Some(data) = value.get(DATA_KEY) else {
        let (_, report) = validate_value(&value, &validation);
        return Ok(VerifiedManifest {
            report,
            bundle: None,
            scan: None,
            nested: false,
        });
    };

    // Pushed bundles hold each collection as one YAML string; plain ones hold lists.
    let formatted = [
        ArtifactKind::CustomResourceDefinition,
        ArtifactKind::ClusterServiceVersion,
        ArtifactKind::Package,
    ]
    .into_iter()
    .filter_map(ArtifactKind::bundle_key)
    .any(|key| data.get(key).is_some_and(Value::is_string));

    let bundle = if formatted {
        let formatted: FormattedBundle = serde_yaml::from_value(value.clone())
            .map_err(|e| bad_yaml(path.display().to_string(), e.to_string()))?;
        unformat(&formatted)?
    } else {
        Bundle::from_data(data)
    };

    let (_, report) = validate(&bundle, &validation);
    Ok(VerifiedManifest {
        report,
        bundle: Some(bundle),
        scan: None,
        nested: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::format;
    use crate::error::CourierError;
    use crate::test_fixtures::{self, create_temp_dir, write_manifest};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verify_flat_directory() {
        let temp = create_temp_dir();
        test_fixtures::flat_widget_bundle(temp.path());

        let verified = verify(
            &ManifestSource::Directory(temp.path().to_path_buf()),
            &VerifyOptions::default(),
        )
        .unwrap();

        assert!(verified.is_valid(), "{:?}", verified.report);
        assert!(!verified.nested);
        let bundle = verified.bundle.unwrap();
        assert_eq!(bundle.cluster_service_versions.len(), 1);
        assert_eq!(bundle.custom_resource_definitions.len(), 1);
    }

    #[test]
    fn test_verify_nested_directory() {
        let temp = create_temp_dir();
        test_fixtures::nested_widget_bundle(temp.path());

        let verified = verify(
            &ManifestSource::Directory(temp.path().to_path_buf()),
            &VerifyOptions::default(),
        )
        .unwrap();

        assert!(verified.is_valid(), "{:?}", verified.report);
        assert!(verified.nested);
        assert!(verified.bundle.is_none());
        assert_eq!(verified.scan.unwrap().manifest_folders().count(), 2);
    }

    #[test]
    fn test_nested_reports_are_merged_in_folder_order() {
        let temp = create_temp_dir();
        test_fixtures::nested_widget_bundle(temp.path());
        // Owned CRD version the CRD in 2.0.0 does not declare
        write_manifest(
            temp.path(),
            "2.0.0/widget-operator.clusterserviceversion.yaml",
            &test_fixtures::widget_csv("2.0.0", "v2"),
        );

        let verified = verify(
            &ManifestSource::Directory(temp.path().to_path_buf()),
            &VerifyOptions::default(),
        )
        .unwrap();

        assert!(!verified.is_valid());
        assert!(
            verified
                .report
                .errors()
                .iter()
                .all(|f| f.file.as_deref().is_none_or(|file| file.starts_with("2.0.0")))
        );
    }

    #[test]
    fn test_repository_mismatch() {
        let temp = create_temp_dir();
        test_fixtures::flat_widget_bundle(temp.path());
        let options = VerifyOptions {
            repository: Some("gadget".to_string()),
            ..VerifyOptions::default()
        };

        let verified = verify(&ManifestSource::Directory(temp.path().to_path_buf()), &options).unwrap();
        assert_eq!(
            verified.report.error_messages(),
            vec![
                "The packageName (widget) in bundle does not match repository name (gadget) provided as command line argument."
            ]
        );
    }

    #[test]
    fn test_verify_yamls() {
        let source = ManifestSource::Yamls(vec![
            test_fixtures::WIDGET_CRD.to_string(),
            test_fixtures::widget_csv("1.0.0", "v1"),
            test_fixtures::package("widget", "widget-operator.v1.0.0"),
        ]);

        let verified = verify(&source, &VerifyOptions::default()).unwrap();
        assert!(verified.is_valid(), "{:?}", verified.report);
    }

    #[test]
    fn test_unknown_kind_rejected_by_policy() {
        let source = ManifestSource::Yamls(vec![
            test_fixtures::package("widget", "widget-operator.v1.0.0"),
            "kind: Deployment\n".to_string(),
        ]);
        let options = VerifyOptions {
            unknown_kinds: UnknownKindPolicy::Reject,
            ..VerifyOptions::default()
        };

        let err = verify(&source, &options).unwrap_err();
        assert!(matches!(err, CourierError::UnknownArtifact { .. }));
    }

    #[test]
    fn test_build_and_verify_writes_output_for_invalid_bundle() {
        let temp = create_temp_dir();
        write_manifest(
            temp.path(),
            "bundle/widget.package.yaml",
            &test_fixtures::package("widget", "widget-operator.v1.0.0"),
        );
        write_manifest(
            temp.path(),
            "bundle/widget-operator.clusterserviceversion.yaml",
            &test_fixtures::widget_csv("1.0.0", "v1"),
        );
        let output = temp.path().join("out/report.json");

        let err = build_and_verify(
            &ManifestSource::Directory(temp.path().join("bundle")),
            &VerifyOptions::default(),
            Some(&output),
        )
        .unwrap_err();

        assert!(matches!(err, CourierError::BundleInvalid { .. }));
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.ends_with('\n'));
        let parsed: ValidationReport = serde_json::from_str(&written).unwrap();
        assert_eq!(
            parsed.error_messages(),
            err.report().unwrap().error_messages()
        );
    }

    #[test]
    fn test_verify_formatted_bundle_file() {
        let temp = create_temp_dir();
        let bundle = crate::bundle::build(vec![
            (None, test_fixtures::WIDGET_CRD.to_string()),
            (None, test_fixtures::widget_csv("1.0.0", "v1")),
            (None, test_fixtures::package("widget", "widget-operator.v1.0.0")),
        ])
        .unwrap();
        let path = write_manifest(
            temp.path(),
            "bundle.yaml",
            &format(&bundle).unwrap().to_yaml().unwrap(),
        );

        let verified = verify(&ManifestSource::from_path(&path).unwrap(), &VerifyOptions::default()).unwrap();
        assert!(verified.is_valid(), "{:?}", verified.report);
        assert_eq!(verified.bundle.unwrap(), bundle);
    }

    #[test]
    fn test_bundle_file_without_data() {
        let temp = create_temp_dir();
        let path = write_manifest(temp.path(), "bundle.yaml", "metadata: {}\n");

        let verified = verify(&ManifestSource::BundleFile(path), &VerifyOptions::default()).unwrap();
        assert_eq!(
            verified.report.error_messages(),
            vec!["Bundle does not contain base data field."]
        );
    }

    #[test]
    fn test_missing_source() {
        let temp = create_temp_dir();
        let err = ManifestSource::from_path(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, CourierError::FileNotFound { .. }));
    }
}
