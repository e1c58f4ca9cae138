//! CustomResourceDefinition rules

use tracing::debug;

use super::ValidationReport;
use crate::manifest::ManifestDocument;
use crate::manifest::crd::{CrdSpec, CustomResourceDefinition};

pub(super) fn check(crds: &[ManifestDocument], report: &mut ValidationReport) {
    for document in crds {
        let file = document.source_label();
        check_one(
            &CustomResourceDefinition::from_value(document.content()),
            file.as_deref(),
            report,
        );
    }
}

fn check_one(crd: &CustomResourceDefinition, file: Option<&str>, report: &mut ValidationReport) {
    match &crd.metadata {
        None => report.error("crd metadata not defined.", file),
        Some(metadata) => match metadata.name.as_deref() {
            Some(name) => debug!(crd = name, "evaluating crd"),
            None => report.error("crd metadata.name not defined.", file),
        },
    }

    if crd.api_version.is_none() {
        report.error("crd apiVersion not defined.", file);
    }

    let Some(spec) = &crd.spec else {
        report.error("crd spec not defined.", file);
        return;
    };

    match &spec.names {
        None => report.error("crd spec.names not defined.", file),
        Some(names) => {
            if names.kind.is_none() {
                report.error("crd spec.names.kind not defined.", file);
            }
            if names.plural.is_none() {
                report.error("crd spec.names.plural not defined.", file);
            }
        }
    }

    if spec.group.is_none() {
        report.error("crd spec.group not defined.", file);
    }

    if spec.version.is_none() && spec.versions.is_none() {
        report.error("crd spec.version or spec.versions not defined", file);
    }

    if spec.versions.is_some() {
        check_versions(crd, spec, file, report);
    }
}

fn check_versions(
    crd: &CustomResourceDefinition,
    spec: &CrdSpec,
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    let entries = crd.version_entries();
    if entries.is_empty() {
        report.error("crd spec.versions must not be empty.", file);
        return;
    }

    for (index, entry) in entries.iter().enumerate() {
        if entry.name.is_none() {
            report.error(format!("crd spec.versions[{index}].name not defined."), file);
        }
        if entry.served.is_none() {
            report.error(format!("crd spec.versions[{index}].served not defined."), file);
        }
        if entry.storage.is_none() {
            report.error(format!("crd spec.versions[{index}].storage not defined."), file);
        }
    }

    let storage_versions = entries.iter().filter(|entry| entry.is_storage()).count();
    if storage_versions != 1 {
        report.error(
            format!(
                "crd spec.versions must have exactly one version with storage: true, but got {storage_versions}."
            ),
            file,
        );
    }

    if let Some(version) = spec.version.as_deref() {
        if entries[0].name.as_deref() != Some(version) {
            report.error(
                "crd spec.version must be the first element in crd spec.versions",
                file,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestDocument;
    use crate::test_fixtures;
    use pretty_assertions::assert_eq;

    fn errors(yaml: &str) -> Vec<String> {
        let document = ManifestDocument::parse(None, yaml).unwrap();
        let mut report = ValidationReport::default();
        check(&[document], &mut report);
        report
            .error_messages()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_valid_crd() {
        assert!(errors(test_fixtures::WIDGET_CRD).is_empty());
    }

    #[test]
    fn test_single_version_crd_is_valid() {
        let yaml = r"apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
    plural: widgets
  version: v1
";
        assert!(errors(yaml).is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let yaml = "kind: CustomResourceDefinition\nmetadata: {}\nspec:\n  names: {}\n";
        assert_eq!(
            errors(yaml),
            vec![
                "crd metadata.name not defined.",
                "crd apiVersion not defined.",
                "crd spec.names.kind not defined.",
                "crd spec.names.plural not defined.",
                "crd spec.group not defined.",
                "crd spec.version or spec.versions not defined",
            ]
        );
    }

    #[test]
    fn test_missing_spec_skips_nested_checks() {
        let yaml = "apiVersion: v1\nkind: CustomResourceDefinition\nmetadata:\n  name: x\n";
        assert_eq!(errors(yaml), vec!["crd spec not defined."]);
    }

    #[test]
    fn test_versions_must_not_be_empty() {
        let yaml = test_fixtures::WIDGET_CRD.replace(
            "  versions:\n  - name: v1\n    served: true\n    storage: true\n",
            "  versions: []\n",
        );
        assert_eq!(errors(&yaml), vec!["crd spec.versions must not be empty."]);
    }

    #[test]
    fn test_exactly_one_storage_version() {
        let yaml = format!(
            "{}  - name: v2\n    served: true\n    storage: true\n",
            test_fixtures::WIDGET_CRD
        );
        assert_eq!(
            errors(&yaml),
            vec!["crd spec.versions must have exactly one version with storage: true, but got 2."]
        );
    }

    #[test]
    fn test_version_entry_fields() {
        let yaml = format!("{}  - name: v2\n", test_fixtures::WIDGET_CRD);
        assert_eq!(
            errors(&yaml),
            vec![
                "crd spec.versions[1].served not defined.",
                "crd spec.versions[1].storage not defined.",
            ]
        );
    }

    #[test]
    fn test_version_must_lead_versions() {
        let yaml = test_fixtures::WIDGET_CRD.replace("  versions:\n", "  version: v2\n  versions:\n");
        assert_eq!(
            errors(&yaml),
            vec!["crd spec.version must be the first element in crd spec.versions"]
        );
    }
}
