//! Test fixtures and utilities for reducing test setup duplication.
//!
//! Provides manifest YAML builders (CRDs, CSVs, packages) and helpers to lay
//! them out in temporary flat or nested bundle directories.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, write_manifest, widget_csv};
//!
//! let temp = create_temp_dir();
//! write_manifest(temp.path(), "1.0.0/widget.csv.yaml", &widget_csv("1.0.0", "v1"));
//! ```

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A CRD named `widgets.example.com` serving `v1`
pub const WIDGET_CRD: &str = r"apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
    listKind: WidgetList
    plural: widgets
    singular: widget
  scope: Namespaced
  versions:
  - name: v1
    served: true
    storage: true
";

/// Build a CRD manifest named `{plural}.{group}` with a single stored version
pub fn crd(plural: &str, group: &str, kind: &str, version: &str) -> String {
    format!(
        r"apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: {plural}.{group}
spec:
  group: {group}
  names:
    kind: {kind}
    plural: {plural}
  scope: Namespaced
  versions:
  - name: {version}
    served: true
    storage: true
"
    )
}

/// Build a CSV named `{name}` at `version` owning the given `(crd name, kind, version)` triples
///
/// Every optional field the rule set looks at is filled in, so the manifest
/// validates without warnings, UI checks included.
pub fn csv(name: &str, version: &str, owned: &[(&str, &str, &str)]) -> String {
    let owned_block = if owned.is_empty() {
        "    owned: []\n".to_string()
    } else {
        let entries: String = owned
            .iter()
            .map(|(crd_name, kind, crd_version)| {
                format!(
                    "    - name: {crd_name}\n      kind: {kind}\n      version: {crd_version}\n      displayName: {kind}\n"
                )
            })
            .collect();
        format!("    owned:\n{entries}")
    };

    let alm_examples = owned
        .iter()
        .map(|(_, kind, crd_version)| {
            format!(
                r#"{{"apiVersion": "example.com/{crd_version}", "kind": "{kind}", "metadata": {{"name": "example"}}}}"#
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"apiVersion: operators.coreos.com/v1alpha1
kind: ClusterServiceVersion
metadata:
  name: {name}
  annotations:
    alm-examples: '[{alm_examples}]'
    capabilities: Basic Install
    categories: Database, Storage
    certified: "false"
    containerImage: quay.io/example/operator:v{version}
    createdAt: "2019-01-01T00:00:00Z"
    description: Manages example resources
    repository: https://github.com/example/operator
    support: Example Inc.
spec:
  displayName: Example Operator
  description: |
    Example Operator manages example resources.
    It spans more than one line.
  version: {version}
  maturity: alpha
  provider:
    name: Example Inc.
  maintainers:
  - name: Jane Doe
    email: jane@example.com
  links:
  - name: Documentation
    url: https://example.com/docs
  icon:
  - base64data: iVBORw0KGgo=
    mediatype: image/png
  installModes:
  - type: OwnNamespace
    supported: true
  install:
    strategy: deployment
    spec:
      deployments:
      - name: example-operator
        spec:
          replicas: 1
      permissions: []
      clusterPermissions: []
  customresourcedefinitions:
{owned_block}"#
    )
}

/// A CSV named `widget-operator.v{version}` owning `widgets.example.com` at `owned_version`
pub fn widget_csv(version: &str, owned_version: &str) -> String {
    csv(
        &format!("widget-operator.v{version}"),
        version,
        &[("widgets.example.com", "Widget", owned_version)],
    )
}

/// A package manifest with a single `stable` channel
pub fn package(name: &str, current_csv: &str) -> String {
    format!(
        r"packageName: {name}
defaultChannel: stable
channels:
- name: stable
  currentCSV: {current_csv}
"
    )
}

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Write `content` to `relative` under `root`, creating parent directories
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_manifest(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(&path, content).expect("Failed to write manifest");
    path
}

/// A valid flat bundle: one package, the widget CRD and one CSV
pub fn flat_widget_bundle(root: &Path) {
    write_manifest(
        root,
        "widget.package.yaml",
        &package("widget", "widget-operator.v1.0.0"),
    );
    write_manifest(root, "widgets.crd.yaml", WIDGET_CRD);
    write_manifest(
        root,
        "widget-operator.clusterserviceversion.yaml",
        &widget_csv("1.0.0", "v1"),
    );
}

/// A valid nested bundle: root package plus `1.0.0/` and `2.0.0/` manifest folders
pub fn nested_widget_bundle(root: &Path) {
    write_manifest(
        root,
        "widget.package.yaml",
        &package("widget", "widget-operator.v2.0.0"),
    );
    for version in ["1.0.0", "2.0.0"] {
        write_manifest(root, &format!("{version}/widgets.crd.yaml"), WIDGET_CRD);
        write_manifest(
            root,
            &format!("{version}/widget-operator.clusterserviceversion.yaml"),
            &widget_csv(version, "v1"),
        );
    }
}
