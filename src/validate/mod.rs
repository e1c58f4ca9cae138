//! Bundle validation
//!
//! The validator is a set of stateless rule checks over a [`Bundle`]. Every check
//! appends to one [`ValidationReport`] threaded through the pass and never stops
//! the others, except that a missing prerequisite (no `spec`, no `metadata`)
//! skips the checks nested under it.
//!
//! Rule sets:
//! - [`crd`]: required CRD fields and the `spec.versions` list
//! - [`csv`]: required CSV fields, install strategy, annotations and owned CRD cross-references
//! - [`package`]: the single package, its channels and their current CSVs
//! - [`ui`]: the extended field and format checks needed to render an operator in a catalog UI

mod crd;
mod csv;
mod package;
pub mod report;
mod ui;

use serde_yaml::Value;
use tracing::debug;

use crate::bundle::{Bundle, DATA_KEY};
use crate::manifest::{PackageManifest, scalar_to_string};

pub use crate::config::Severity;
pub use report::{Finding, ValidationReport};

/// Knobs for one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Package name the bundle must carry
    pub repository: Option<String>,
    /// The bundle is one version folder of a nested layout
    pub nested: bool,
    /// Run the catalog UI checks
    pub ui_validate: bool,
    /// Severity of owned CRD kinds missing from `alm-examples`
    pub alm_examples_severity: Severity,
}

/// Validate a bundle, returning whether it is valid and everything found
pub fn validate(bundle: &Bundle, options: &ValidationOptions) -> (bool, ValidationReport) {
    let mut report = ValidationReport::default();
    validate_into(bundle, options, &mut report);
    (report.is_valid(), report)
}

/// Validate a serialized bundle: a mapping with the three collections under `data`
pub fn validate_value(value: &Value, options: &ValidationOptions) -> (bool, ValidationReport) {
    let Some(data) = value.get(DATA_KEY) else {
        let mut report = ValidationReport::default();
        report.error("Bundle does not contain base data field.", None);
        return (false, report);
    };
    validate(&Bundle::from_data(data), options)
}

fn validate_into(bundle: &Bundle, options: &ValidationOptions, report: &mut ValidationReport) {
    debug!("validating bundle");

    // CRDs are optional
    crd::check(&bundle.custom_resource_definitions, report);

    let csvs_passed = if bundle.cluster_service_versions.is_empty() {
        report.error("Bundle does not contain any clusterServiceVersions.", None);
        false
    } else {
        passes(report, |report| csv::check(bundle, report))
    };

    let packages_passed = if bundle.packages.is_empty() {
        report.error("Bundle does not contain any packages.", None);
        false
    } else {
        passes(report, |report| package::check(bundle, options, report))
    };

    if options.ui_validate && csvs_passed {
        ui::check(bundle, options, report);
    }

    if let Some(repository) = options.repository.as_deref() {
        if packages_passed {
            check_repository(bundle, repository, report);
        }
    }
}

fn check_repository(bundle: &Bundle, repository: &str, report: &mut ValidationReport) {
    let Some(document) = bundle.packages.first() else {
        return;
    };
    let package_name = document
        .content()
        .get("packageName")
        .and_then(scalar_to_string)
        .or_else(|| PackageManifest::from_value(document.content()).package_name)
        .unwrap_or_default();

    if package_name != repository {
        report.error(
            format!(
                "The packageName ({package_name}) in bundle does not match repository name ({repository}) provided as command line argument."
            ),
            document.source_label().as_deref(),
        );
    }
}

/// Run `check` and report whether it added no errors
fn passes(report: &mut ValidationReport, check: impl FnOnce(&mut ValidationReport)) -> bool {
    let before = report.errors().len();
    check(report);
    report.errors().len() == before
}
