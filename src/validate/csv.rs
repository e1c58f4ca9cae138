//! ClusterServiceVersion rules, including the cross-references from owned CRDs
//! to the bundle's root list of CRDs

use serde_yaml::Value;
use tracing::debug;

use super::ValidationReport;
use crate::bundle::Bundle;
use crate::manifest::crd::CustomResourceDefinition;
use crate::manifest::csv::{ClusterServiceVersion, CsvMetadata, CsvSpec, InstallStrategy, OwnedCrd};

/// Spec fields whose absence is only a warning
const RECOMMENDED_SPEC_FIELDS: [&str; 6] = [
    "displayName",
    "description",
    "icon",
    "version",
    "provider",
    "maturity",
];

/// Annotations whose absence is only a warning (`certified` is checked on its own)
const RECOMMENDED_ANNOTATIONS: [&str; 5] = [
    "categories",
    "description",
    "containerImage",
    "createdAt",
    "support",
];

const INSTALL_STRATEGIES: [&str; 1] = ["deployment"];

pub(super) fn check(bundle: &Bundle, report: &mut ValidationReport) {
    let crds: Vec<CustomResourceDefinition> = bundle
        .custom_resource_definitions
        .iter()
        .map(|document| CustomResourceDefinition::from_value(document.content()))
        .collect();

    for document in &bundle.cluster_service_versions {
        let file = document.source_label();
        let file = file.as_deref();
        let csv = ClusterServiceVersion::from_value(document.content());

        match &csv.metadata {
            Some(metadata) => check_metadata(metadata, file, report),
            None => report.error("csv metadata not defined.", file),
        }

        if csv.api_version.is_none() {
            report.error("csv apiVersion not defined.", file);
        }

        match &csv.spec {
            Some(spec) => check_spec(spec, &crds, file, report),
            None => report.error("csv spec not defined.", file),
        }
    }
}

fn check_metadata(metadata: &CsvMetadata, file: Option<&str>, report: &mut ValidationReport) {
    match metadata.name.as_deref() {
        Some(name) => debug!(csv = name, "evaluating csv"),
        None => report.error("csv metadata.name not defined.", file),
    }

    let Some(annotations) = &metadata.annotations else {
        report.warning("csv metadata.annotations not defined.", file);
        return;
    };

    for key in RECOMMENDED_ANNOTATIONS {
        if annotations.field(key).is_none() {
            report.warning(format!("csv metadata.annotations.{key} not defined"), file);
        }
    }

    // `certified: false` parses as a boolean, which catalogs reject
    match &annotations.certified {
        None => report.warning("csv metadata.annotations.certified not defined.", file),
        Some(Value::String(_)) => {}
        Some(_) => report.error("metadata.annotations.certified is not of type string", file),
    }

    if let Some(examples) = &annotations.alm_examples {
        let is_json = examples
            .as_str()
            .is_some_and(|text| serde_json::from_str::<serde_json::Value>(text).is_ok());
        if !is_json {
            report.error(
                "metadata.annotations.alm-examples contains invalid json string",
                file,
            );
        }
    }
}

fn check_spec(
    spec: &CsvSpec,
    crds: &[CustomResourceDefinition],
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    for key in RECOMMENDED_SPEC_FIELDS {
        if !spec.has_field(key) {
            report.warning(format!("csv spec.{key} not defined"), file);
        }
    }

    if spec.install_modes.is_none() {
        report.error("csv spec.installModes not defined", file);
    }

    match &spec.install {
        Some(install) => check_install(install, file, report),
        None => report.error("csv spec.install not defined", file),
    }

    if let Some(owned) = spec.owned_crds() {
        for entry in &owned {
            check_owned(entry, crds, file, report);
        }
    }
}

fn check_install(install: &InstallStrategy, file: Option<&str>, report: &mut ValidationReport) {
    match &install.strategy {
        None => report.error("csv spec.install.strategy not defined", file),
        Some(strategy) => {
            let known = strategy
                .as_str()
                .is_some_and(|s| INSTALL_STRATEGIES.contains(&s));
            if !known {
                report.error(
                    format!(
                        "csv spec.install.strategy must be one of {}",
                        python_list(&INSTALL_STRATEGIES)
                    ),
                    file,
                );
            }
        }
    }

    let Some(spec) = &install.spec else {
        report.error("csv spec.install.spec not defined", file);
        return;
    };

    match &spec.deployments {
        None => report.error("csv spec.install.spec.deployments not defined", file),
        Some(Value::Sequence(_)) => {}
        Some(_) => report.error("csv spec.install.spec.deployments should be a list", file),
    }

    for (key, value) in [
        ("permissions", &spec.permissions),
        ("clusterPermissions", &spec.cluster_permissions),
    ] {
        if value.as_ref().is_some_and(|v| !v.is_sequence()) {
            report.error(format!("csv spec.install.spec.{key} should be a list"), file);
        }
    }
}

fn check_owned(
    owned: &OwnedCrd,
    crds: &[CustomResourceDefinition],
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    match owned.name.as_deref() {
        None => report.error(
            "name not defined for item in spec.customresourcedefinitions.",
            file,
        ),
        Some(name) if !crds.iter().any(|crd| crd.name() == Some(name)) => report.error(
            format!(
                "custom resource definition {name} referenced in csv not defined in root list of crds"
            ),
            file,
        ),
        Some(_) => {}
    }
    if owned.kind.is_none() {
        report.error(
            "kind not defined for item in spec.customresourcedefinitions.",
            file,
        );
    }
    if owned.version.is_none() {
        report.error(
            "version not defined for item in spec.customresourcedefinitions.",
            file,
        );
    }

    let Some(name) = owned.name.as_deref() else {
        return;
    };
    for crd in crds.iter().filter(|crd| crd.name() == Some(name)) {
        if let (Some(owned_kind), Some(crd_kind)) = (owned.kind.as_deref(), crd.kind()) {
            if owned_kind != crd_kind {
                report.error(
                    "CRD.spec.names.kind does not match CSV.spec.crd.owned.kind",
                    file,
                );
            }
        }

        if let Some(version) = owned.version.as_deref() {
            check_owned_version(crd, version, file, report);
        }

        if let Some(qualified) = crd.qualified_name() {
            if qualified != name {
                report.error(
                    "`CRD.spec.names.plural`.`CRD.spec.group` does not match CSV.spec.crd.owned.name",
                    file,
                );
            }
        }
    }
}

/// An owned version matches if either version representation of the CRD declares it
fn check_owned_version(
    crd: &CustomResourceDefinition,
    version: &str,
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    let Some(spec) = &crd.spec else {
        return;
    };
    if crd.declares_version(version) {
        return;
    }

    if spec.versions.is_some() {
        report.error(
            "CSV.spec.crd.owned.version is not in CRD.spec.versions list",
            file,
        );
    } else if spec.version.is_some() {
        report.error(
            "CRD.spec.version does not match CSV.spec.crd.owned.version",
            file,
        );
    }
}

/// Render `["a", "b"]` as `['a', 'b']`, the form catalog tooling prints lists in
fn python_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{item}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::build;
    use crate::test_fixtures;
    use pretty_assertions::assert_eq;

    fn report_for(texts: &[&str]) -> ValidationReport {
        let bundle = build(texts.iter().map(|t| (None, (*t).to_string()))).unwrap();
        let mut report = ValidationReport::default();
        check(&bundle, &mut report);
        report
    }

    #[test]
    fn test_owned_crd_cross_reference_passes() {
        let report = report_for(&[
            test_fixtures::WIDGET_CRD,
            &test_fixtures::widget_csv("1.0.0", "v1"),
        ]);
        assert!(report.is_valid(), "{:?}", report.error_messages());
        assert!(report.warning_messages().is_empty());
    }

    #[test]
    fn test_owned_kind_mismatch() {
        let crd = test_fixtures::WIDGET_CRD.replace("kind: Widget", "kind: OtherWidget");
        let report = report_for(&[&crd, &test_fixtures::widget_csv("1.0.0", "v1")]);

        let mismatches: Vec<_> = report
            .error_messages()
            .into_iter()
            .filter(|m| m.contains("does not match CSV.spec.crd.owned.kind"))
            .collect();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn test_owned_crd_missing_from_bundle() {
        let report = report_for(&[&test_fixtures::widget_csv("1.0.0", "v1")]);
        assert_eq!(
            report.error_messages(),
            vec![
                "custom resource definition widgets.example.com referenced in csv not defined in root list of crds"
            ]
        );
    }

    #[test]
    fn test_owned_version_not_served() {
        let report = report_for(&[
            test_fixtures::WIDGET_CRD,
            &test_fixtures::widget_csv("1.0.0", "v2"),
        ]);
        assert_eq!(
            report.error_messages(),
            vec!["CSV.spec.crd.owned.version is not in CRD.spec.versions list"]
        );
    }

    #[test]
    fn test_owned_version_against_single_version_crd() {
        let crd = test_fixtures::WIDGET_CRD.replace(
            "  versions:\n  - name: v1\n    served: true\n    storage: true\n",
            "  version: v1beta1\n",
        );
        let report = report_for(&[&crd, &test_fixtures::widget_csv("1.0.0", "v1")]);
        assert_eq!(
            report.error_messages(),
            vec!["CRD.spec.version does not match CSV.spec.crd.owned.version"]
        );
    }

    #[test]
    fn test_owned_name_must_be_plural_dot_group() {
        let crd = test_fixtures::WIDGET_CRD.replace("plural: widgets", "plural: gizmos");
        let report = report_for(&[&crd, &test_fixtures::widget_csv("1.0.0", "v1")]);
        assert_eq!(
            report.error_messages(),
            vec!["`CRD.spec.names.plural`.`CRD.spec.group` does not match CSV.spec.crd.owned.name"]
        );
    }

    #[test]
    fn test_owned_entry_missing_fields() {
        let csv = test_fixtures::csv("widget-operator.v1.0.0", "1.0.0", &[]).replace(
            "    owned: []\n",
            "    owned:\n    - displayName: Widget\n",
        );
        let report = report_for(&[&csv]);
        assert_eq!(
            report.error_messages(),
            vec![
                "name not defined for item in spec.customresourcedefinitions.",
                "kind not defined for item in spec.customresourcedefinitions.",
                "version not defined for item in spec.customresourcedefinitions.",
            ]
        );
    }

    #[test]
    fn test_missing_owned_list_is_allowed() {
        let csv = test_fixtures::csv("widget-operator.v1.0.0", "1.0.0", &[])
            .replace("  customresourcedefinitions:\n    owned: []\n", "  customresourcedefinitions: {}\n");
        assert!(report_for(&[&csv]).is_valid());
    }

    #[test]
    fn test_certified_must_be_a_string() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1")
            .replace("certified: \"false\"", "certified: false");
        let report = report_for(&[test_fixtures::WIDGET_CRD, &csv]);
        assert_eq!(
            report.error_messages(),
            vec!["metadata.annotations.certified is not of type string"]
        );
    }

    #[test]
    fn test_null_certified_is_not_a_string() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1")
            .replace("certified: \"false\"", "certified: ~");
        let report = report_for(&[test_fixtures::WIDGET_CRD, &csv]);
        assert!(!report.is_valid());
        assert_eq!(
            report.error_messages(),
            vec!["metadata.annotations.certified is not of type string"]
        );
        assert!(
            !report
                .warning_messages()
                .contains(&"csv metadata.annotations.certified not defined.")
        );
    }

    #[test]
    fn test_empty_install_modes_counts_as_defined() {
        let csv = "apiVersion: operators.coreos.com/v1alpha1\nkind: ClusterServiceVersion\nmetadata:\n  name: bare.v1\nspec:\n  installModes:\n  install:\n    strategy: deployment\n    spec:\n      deployments: []\n";
        let report = report_for(&[csv]);
        assert!(report.is_valid(), "{:?}", report.error_messages());
    }

    #[test]
    fn test_alm_examples_must_be_json() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1").replace(
            "    alm-examples: '[",
            "    alm-examples: '[{broken",
        );
        let report = report_for(&[test_fixtures::WIDGET_CRD, &csv]);
        assert_eq!(
            report.error_messages(),
            vec!["metadata.annotations.alm-examples contains invalid json string"]
        );
    }

    #[test]
    fn test_unknown_install_strategy() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1")
            .replace("strategy: deployment", "strategy: helm");
        let report = report_for(&[test_fixtures::WIDGET_CRD, &csv]);
        assert_eq!(
            report.error_messages(),
            vec!["csv spec.install.strategy must be one of ['deployment']"]
        );
    }

    #[test]
    fn test_install_lists() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1")
            .replace("      permissions: []\n", "      permissions: all\n")
            .replace("      deployments:\n", "      deployments: {}\n      unused:\n");
        let report = report_for(&[test_fixtures::WIDGET_CRD, &csv]);
        assert_eq!(
            report.error_messages(),
            vec![
                "csv spec.install.spec.deployments should be a list",
                "csv spec.install.spec.permissions should be a list",
            ]
        );
    }

    #[test]
    fn test_missing_spec_and_recommended_fields() {
        let csv = "apiVersion: operators.coreos.com/v1alpha1\nkind: ClusterServiceVersion\nmetadata:\n  name: bare.v1\n";
        let report = report_for(&[csv]);
        assert_eq!(report.error_messages(), vec!["csv spec not defined."]);
        assert_eq!(
            report.warning_messages(),
            vec!["csv metadata.annotations not defined."]
        );
    }

    #[test]
    fn test_recommended_spec_fields_warn() {
        let csv = "apiVersion: operators.coreos.com/v1alpha1\nkind: ClusterServiceVersion\nmetadata:\n  name: bare.v1\nspec:\n  installModes: []\n  install:\n    strategy: deployment\n    spec:\n      deployments: []\n";
        let report = report_for(&[csv]);
        assert!(report.is_valid(), "{:?}", report.error_messages());
        assert_eq!(
            report.warning_messages(),
            vec![
                "csv metadata.annotations not defined.",
                "csv spec.displayName not defined",
                "csv spec.description not defined",
                "csv spec.icon not defined",
                "csv spec.version not defined",
                "csv spec.provider not defined",
                "csv spec.maturity not defined",
            ]
        );
    }

    #[test]
    fn test_python_list() {
        assert_eq!(python_list(&["deployment"]), "['deployment']");
    }
}
