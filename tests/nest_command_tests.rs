//! Integration tests for `opcourier nest`

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

#[test]
fn test_nest_two_versions() {
    let workspace = TestWorkspace::new();
    workspace.copy_fixture_bundle("flat-widget-multi", "flat");

    workspace
        .cmd()
        .args(["nest", "flat", "nested"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nested 6 files"));

    assert_eq!(
        workspace.list_files("nested"),
        vec![
            "1.0.0/widget-operator.v1.0.0.clusterserviceversion.yaml",
            "1.0.0/widgets.example.com.crd.yaml",
            "2.0.0/gadgets.example.com.crd.yaml",
            "2.0.0/widget-operator.v2.0.0.clusterserviceversion.yaml",
            "2.0.0/widgets.example.com.crd.yaml",
            "widget.package.yaml",
        ]
    );
}

#[test]
fn test_nested_output_verifies() {
    let workspace = TestWorkspace::new();
    workspace.copy_fixture_bundle("flat-widget-multi", "flat");
    workspace.cmd().args(["nest", "flat", "nested"]).assert().success();

    workspace
        .cmd()
        .args(["verify", "nested"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid nested bundle"));
}

#[test]
fn test_nest_missing_crd_collects_errors() {
    let workspace = TestWorkspace::new();
    workspace.copy_fixture_bundle("flat-widget-multi", "flat");
    std::fs::remove_file(workspace.path.join("flat/gadgets.crd.yaml")).unwrap();

    workspace
        .cmd()
        .args(["nest", "flat", "nested"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to nest bundle, the input yaml is improperly defined.",
        ))
        .stderr(predicate::str::contains(
            "CRD gadgets.example.com mentioned in CSV widget-operator.v2.0.0 was not found in directory.",
        ));
    assert!(workspace.list_files("nested").is_empty());
}

#[test]
fn test_nest_already_nested_copies() {
    let workspace = TestWorkspace::new();
    workspace.copy_fixture_bundle("nested-etcd", "etcd");

    workspace.cmd().args(["nest", "etcd", "nested"]).assert().success();

    let files = workspace.list_files("nested");
    assert_eq!(files.len(), 7);
    assert!(files.contains(&"0.9.2/etcdcluster.crd.yaml".to_string()));
    assert!(!files.contains(&"0.9.2/image-references".to_string()));
}
