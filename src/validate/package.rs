//! Package rules

use tracing::debug;

use super::{ValidationOptions, ValidationReport};
use crate::bundle::Bundle;
use crate::manifest::PackageManifest;

pub(super) fn check(bundle: &Bundle, options: &ValidationOptions, report: &mut ValidationReport) {
    let count = bundle.packages.len();
    if count != 1 {
        report.error(
            format!("Only 1 package is expected to exist per bundle, but got {count}."),
            None,
        );
        return;
    }

    let document = &bundle.packages[0];
    let file = document.source_label();
    let file = file.as_deref();
    let package = PackageManifest::from_value(document.content());

    match package.package_name.as_deref() {
        Some(name) => debug!(package = name, "evaluating package"),
        None => report.error("packageName not defined.", file),
    }

    let Some(channels) = package.channel_entries() else {
        report.error("package channels not defined.", file);
        return;
    };
    if channels.is_empty() {
        report.error("no package channels defined.", file);
        return;
    }

    let csv_names: Vec<&str> = bundle
        .cluster_service_versions
        .iter()
        .filter_map(|csv| csv.metadata_name())
        .collect();

    for channel in &channels {
        if channel.name.is_none() {
            report.error("package channel.name not defined.", file);
        }

        match channel.current_csv.as_deref() {
            None => report.error("package channel.currentCSV not defined.", file),
            // A nested folder only holds its own CSV; the channel may point at another folder
            Some(current) if !options.nested && !csv_names.contains(&current) => report.error(
                format!("channel.currentCSV {current} is not included in list of csvs"),
                file,
            ),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::build;
    use crate::test_fixtures;
    use pretty_assertions::assert_eq;

    fn errors(texts: &[&str], nested: bool) -> Vec<String> {
        let bundle = build(texts.iter().map(|t| (None, (*t).to_string()))).unwrap();
        let options = ValidationOptions {
            nested,
            ..ValidationOptions::default()
        };
        let mut report = ValidationReport::default();
        check(&bundle, &options, &mut report);
        report
            .error_messages()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_current_csv_must_exist() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1");
        let package = test_fixtures::package("widget", "widget-operator.v2.0.0");
        assert_eq!(
            errors(&[&csv, &package], false),
            vec!["channel.currentCSV widget-operator.v2.0.0 is not included in list of csvs"]
        );
    }

    #[test]
    fn test_current_csv_not_checked_when_nested() {
        let csv = test_fixtures::widget_csv("1.0.0", "v1");
        let package = test_fixtures::package("widget", "widget-operator.v2.0.0");
        assert!(errors(&[&csv, &package], true).is_empty());
    }

    #[test]
    fn test_multiple_packages_reported_once() {
        let first = test_fixtures::package("widget", "a");
        let second = test_fixtures::package("gadget", "b");
        let third = test_fixtures::package("gizmo", "c");
        assert_eq!(
            errors(&[&first, &second, &third], false),
            vec!["Only 1 package is expected to exist per bundle, but got 3."]
        );
    }

    #[test]
    fn test_channels_required() {
        assert_eq!(
            errors(&["packageName: widget\n"], false),
            vec!["package channels not defined."]
        );
        assert_eq!(
            errors(&["packageName: widget\nchannels: []\n"], false),
            vec!["no package channels defined."]
        );
    }

    #[test]
    fn test_channel_fields_required() {
        assert_eq!(
            errors(&["packageName: widget\nchannels:\n- {}\n"], true),
            vec![
                "package channel.name not defined.",
                "package channel.currentCSV not defined.",
            ]
        );
    }

    #[test]
    fn test_package_name_must_be_a_string() {
        let package = "packageName: [widget]\nchannels:\n- name: stable\n  currentCSV: x\n";
        assert_eq!(errors(&[package], true), vec!["packageName not defined."]);
    }
}
