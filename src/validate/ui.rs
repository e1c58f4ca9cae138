//! Catalog UI rules
//!
//! A CSV that passes the baseline rules can still render badly in an operator
//! catalog. These checks require the fields the catalog UI reads and validate
//! their formats: provider, maintainers, links, semver version, capability
//! level, icon and categories.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use super::{ValidationOptions, ValidationReport};
use crate::bundle::Bundle;
use crate::manifest::ClusterServiceVersion;
use crate::manifest::csv::{CsvAnnotations, CsvSpec};
use crate::manifest::scalar_to_string;

/// A field the catalog UI reads; missing optional fields only warn
struct UiField {
    name: &'static str,
    required: bool,
    consequence: &'static str,
}

const ANNOTATION_FIELDS: [UiField; 7] = [
    UiField {
        name: "description",
        required: false,
        consequence: "Without this field, the description displayed in the tiles of the UI will be a truncated version of spec.description.",
    },
    UiField {
        name: "categories",
        required: false,
        consequence: "Without this field, the operator will be categorized as Other.",
    },
    UiField {
        name: "capabilities",
        required: false,
        consequence: "Without this field, the operator will be assigned the basic install capability - you can read more about operator maturity models here https://www.operatorhub.io/getting-started#How-do-I-start-writing-an-Operator?.",
    },
    UiField {
        name: "repository",
        required: false,
        consequence: "Without this field, the link to the operator source code will not be displayed in the UI.",
    },
    UiField {
        name: "createdAt",
        required: false,
        consequence: "Without this field, the time stamp at which the operator was created will not be displayed in the UI.",
    },
    UiField {
        name: "containerImage",
        required: false,
        consequence: "Without this field, the link to the operator image will not be displayed in the UI.",
    },
    UiField {
        name: "alm-examples",
        required: false,
        consequence: "Without this field, users will not have examples of how to write Custom Resources for the operator.",
    },
];

const SPEC_FIELDS: [UiField; 9] = [
    UiField {
        name: "displayName",
        required: true,
        consequence: "Without this field, the name of the operator for both the tile and the details view will default to metadata.name.",
    },
    UiField {
        name: "description",
        required: true,
        consequence: "Without this field, the description in the details view of the operator will default to metadata.annotations.description.",
    },
    UiField {
        name: "version",
        required: true,
        consequence: "Without this field, the version in the details view of the operator will be empty.",
    },
    UiField {
        name: "links",
        required: false,
        consequence: "Without this field, no links will be displayed in the details page side panel. You can for example link to some additional Documentation, related Blogs or Repositories.",
    },
    UiField {
        name: "icon",
        required: false,
        consequence: "Without this field, the operator will display a default operator framework icon.",
    },
    UiField {
        name: "provider",
        required: true,
        consequence: "Without this field, users will not be able to filter for provider.",
    },
    UiField {
        name: "maintainers",
        required: false,
        consequence: "Without this field, the operator details page will not display the name and contact for users to get support in using the operator. The field should be a yaml list of name & email pairs.",
    },
    UiField {
        name: "customresourcedefinitions",
        required: false,
        consequence: "Without this field, the operator details page will not display any CRDs the operator needs in order to function.",
    },
    UiField {
        name: "installModes",
        required: true,
        consequence: "Without this field, OLM will not be able to deploy your operator.",
    },
];

const ANNOTATIONS_CONSEQUENCE: &str = "Without this field, your operator will be missing essential data for the UI. Please add this field to the CSV and run validation again to see what subfields are required.";

const CAPABILITY_LEVELS: [&str; 5] = [
    "Basic Install",
    "Seamless Upgrades",
    "Full Lifecycle",
    "Deep Insights",
    "Auto Pilot",
];

const ICON_MEDIATYPES: [&str; 4] = ["image/gif", "image/jpeg", "image/png", "image/svg+xml"];

const CATEGORIES: [&str; 14] = [
    "AI/Machine Learning",
    "Application Runtime",
    "Big Data",
    "Cloud Provider",
    "Developer Tools",
    "Database",
    "Integration & Delivery",
    "Logging & Tracing",
    "Monitoring",
    "Networking",
    "OpenShift Optional",
    "Security",
    "Storage",
    "Streaming & Messaging",
];

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .ok()
});

pub(super) fn check(bundle: &Bundle, options: &ValidationOptions, report: &mut ValidationReport) {
    for document in &bundle.cluster_service_versions {
        let file = document.source_label();
        let file = file.as_deref();
        let csv = ClusterServiceVersion::from_value(document.content());

        let before = report.errors().len();
        let fields = required_fields(&csv, file, report);
        if report.errors().len() > before {
            report.error(
                "UI validation failed to verify required fields for operatorhub.io exist.",
                file,
            );
            continue;
        }

        let Some((annotations, spec)) = fields else {
            continue;
        };
        let before = report.errors().len();
        check_formats(annotations, spec, options, file, report);
        if report.errors().len() > before {
            report.error(
                "UI validation failed to verify that required fields for operatorhub.io are properly formatted.",
                file,
            );
        }
    }
}

/// Check every field the UI reads exists, returning the annotations and spec when they do
fn required_fields<'a>(
    csv: &'a ClusterServiceVersion,
    file: Option<&str>,
    report: &mut ValidationReport,
) -> Option<(&'a CsvAnnotations, &'a CsvSpec)> {
    let Some(metadata) = &csv.metadata else {
        report.error("csv metadata not defined.", file);
        return None;
    };
    if metadata.name.is_none() {
        report.error("csv metadata.name not defined.", file);
        return None;
    }
    let Some(spec) = &csv.spec else {
        report.error("csv spec not defined.", file);
        return None;
    };
    let Some(annotations) = &metadata.annotations else {
        report.error(
            format!("csv metadata.annotations not defined. {ANNOTATIONS_CONSEQUENCE}"),
            file,
        );
        return None;
    };

    for field in &ANNOTATION_FIELDS {
        if annotations.field(field.name).is_none() {
            let message = format!(
                "csv metadata.annotations.{} not defined. {}",
                field.name, field.consequence
            );
            if field.required {
                report.error(message, file);
            } else {
                report.warning(message, file);
            }
        }
    }

    for field in &SPEC_FIELDS {
        if !spec.has_field(field.name) {
            let message = format!("csv spec.{} not defined. {}", field.name, field.consequence);
            if field.required {
                report.error(message, file);
            } else {
                report.warning(message, file);
            }
        }
    }

    Some((annotations, spec))
}

fn check_formats(
    annotations: &CsvAnnotations,
    spec: &CsvSpec,
    options: &ValidationOptions,
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    check_alm_examples(annotations, spec, options, file, report);
    check_provider(spec.provider.as_ref(), file, report);

    if let Some(maintainers) = &spec.maintainers {
        check_pairs(maintainers, "maintainers", ("name", "email"), is_email, file, report);
    }
    if let Some(links) = &spec.links {
        check_pairs(links, "links", ("name", "url"), is_url, file, report);
    }

    let version = spec.version_string();
    if version
        .as_deref()
        .is_none_or(|v| semver::Version::parse(v).is_err())
    {
        report.error(
            format!(
                "spec.version {} is not a valid semver (example of a valid semver is: 1.0.12)",
                spec.version.as_ref().map(display).unwrap_or_default()
            ),
            file,
        );
    }

    if let Some(capabilities) = &annotations.capabilities {
        if !capabilities
            .as_str()
            .is_some_and(|level| CAPABILITY_LEVELS.contains(&level))
        {
            report.error(
                format!(
                    "metadata.annotations.capabilities {} is not a valid capabilities level",
                    display(capabilities)
                ),
                file,
            );
        }
    }

    if let Some(icon) = &spec.icon {
        check_icon(icon, file, report);
    }

    if let Some(categories) = &annotations.categories {
        check_categories(categories, file, report);
    }
}

/// Every owned CRD kind should have an example custom resource
fn check_alm_examples(
    annotations: &CsvAnnotations,
    spec: &CsvSpec,
    options: &ValidationOptions,
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    let Some(owned) = spec.owned_crds() else {
        return;
    };
    let severity = options.alm_examples_severity;

    let Some(examples) = &annotations.alm_examples else {
        if !owned.is_empty() {
            report.record(severity, "You should have alm-examples for every owned CRD", file);
        }
        return;
    };

    // Unparsable examples are reported by the baseline rules
    let Some(kinds) = example_kinds(examples) else {
        return;
    };
    for kind in owned.iter().filter_map(|crd| crd.kind.as_deref()) {
        if !kinds.iter().any(|k| k == kind) {
            report.record(
                severity,
                format!(
                    "{kind} CRD does not have an entry in alm-examples - please add such an example CR."
                ),
                file,
            );
        }
    }
}

fn example_kinds(examples: &Value) -> Option<Vec<String>> {
    let parsed: serde_json::Value = serde_json::from_str(examples.as_str()?).ok()?;
    let kinds = parsed
        .as_array()?
        .iter()
        .filter_map(|example| example.get("kind")?.as_str().map(str::to_string))
        .collect();
    Some(kinds)
}

fn check_provider(provider: Option<&Value>, file: Option<&str>, report: &mut ValidationReport) {
    match provider {
        Some(Value::Mapping(fields)) => {
            if fields.len() != 1 || !fields.contains_key("name") {
                report.error(
                    "csv.spec.provider element should have a single field \"name\".",
                    file,
                );
            }
        }
        _ => report.error("csv.spec.provider should contain a \"name\" field.", file),
    }
}

/// Check a list of two-field mappings such as maintainers (`name`, `email`)
fn check_pairs(
    value: &Value,
    field: &str,
    (label_key, value_key): (&str, &str),
    is_valid: fn(&str) -> bool,
    file: Option<&str>,
    report: &mut ValidationReport,
) {
    let Value::Sequence(entries) = value else {
        report.error(
            format!("csv.spec.{field} must be a list of {label_key} & {value_key} pairs."),
            file,
        );
        return;
    };

    for entry in entries {
        let (Some(_), Some(inner)) = (entry.get(label_key), entry.get(value_key)) else {
            report.error(
                format!("csv.spec.{field} element should contain both {label_key} and {value_key}"),
                file,
            );
            continue;
        };
        if !inner.as_str().is_some_and(is_valid) {
            report.error(
                format!("{} is not a valid {value_key}", display(inner)),
                file,
            );
        }
    }
}

fn check_icon(icon: &Value, file: Option<&str>, report: &mut ValidationReport) {
    let Value::Sequence(icons) = icon else {
        report.error("spec.icon should be a list", file);
        return;
    };
    let [icon] = icons.as_slice() else {
        report.error("spec.icon should be a singleton list", file);
        return;
    };

    let Value::Mapping(fields) = icon else {
        report.error(
            "spec.icon[0] must contain the fields \"base64data\" and \"mediatype\".",
            file,
        );
        return;
    };
    if fields.len() != 2 {
        report.error(
            "spec.icon can only contain two fields: \"base64data\" and \"mediatype\"",
            file,
        );
        return;
    }

    match (fields.get("base64data"), fields.get("mediatype")) {
        (Some(_), Some(mediatype)) => {
            if !mediatype
                .as_str()
                .is_some_and(|m| ICON_MEDIATYPES.contains(&m))
            {
                report.error(
                    format!(
                        "spec.icon[0].mediatype {} is not a valid mediatype. It must be one of \"image/gif\", \"image/jpeg\", \"image/png\", \"image/svg+xml\"",
                        display(mediatype)
                    ),
                    file,
                );
            }
        }
        _ => report.error(
            "spec.icon[0] must contain the fields \"base64data\" and \"mediatype\".",
            file,
        ),
    }
}

fn check_categories(categories: &Value, file: Option<&str>, report: &mut ValidationReport) {
    let Some(categories) = categories.as_str() else {
        report.error(
            "metadata.annotations.categories should be a comma separated string",
            file,
        );
        return;
    };

    for category in categories.split(',').map(str::trim) {
        if !CATEGORIES.contains(&category) {
            report.error(format!("category {category} is not a valid category"), file);
        }
    }
}

fn is_email(text: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(text))
}

fn is_url(text: &str) -> bool {
    url::Url::parse(text).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https" | "ftp") && url.host_str().is_some()
    })
}

/// Render a value for a message: scalars as-is, anything else as flow YAML
fn display(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|s| s.trim_end().replace('\n', " "))
            .unwrap_or_default()
    })
}
