//! Flat to nested conversion
//!
//! Each CSV goes into a folder named after its `spec.version`, together with
//! the CRDs it owns. Problems are collected rather than raised one at a time, and
//! output is staged in a scratch directory so the destination only ever sees a
//! complete result.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde_yaml::Value;
use tracing::{info, warn};

use super::{Layout, ManifestScan};
use crate::common::fs::{CopyOptions, copy_dir_recursive, copy_file, write_text};
use crate::error::{
    Result,
    bundle::bad_bundle,
    fs::write_failed,
    manifest::bad_yaml,
};
use crate::manifest::{ArtifactKind, ClusterServiceVersion, ManifestDocument, scalar_to_string};
use crate::temp::staging_dir;
use crate::validate::ValidationReport;

/// Message of the error raised when nesting collected any problems
pub const NEST_FAILED: &str = "Failed to nest bundle, the input yaml is improperly defined.";

/// Nest `source` into `output`, returning the files written relative to `output`
///
/// A source that is already nested is copied as-is, keeping only its package
/// and the CRDs and CSVs of its manifest folders.
///
/// # Errors
///
/// Returns `CourierError::BadBundle` with every collected problem in its report.
pub fn nest(source: &Path, output: &Path) -> Result<Vec<PathBuf>> {
    let scan = ManifestScan::scan(source)?;

    match scan.layout()? {
        Layout::Nested => {
            warn!("source directory is already nested");
            copy_nested(source, output, &scan)
        }
        Layout::Flat => {
            let documents: Vec<ManifestDocument> = std::iter::once(scan.package.clone())
                .chain(scan.root.crds.iter().cloned())
                .chain(scan.root.csvs.iter().cloned())
                .collect();
            nest_documents(&documents, output)
        }
    }
}

fn copy_nested(source: &Path, output: &Path, scan: &ManifestScan) -> Result<Vec<PathBuf>> {
    let documents = std::iter::once(&scan.package).chain(
        scan.manifest_folders()
            .flat_map(|folder| folder.crds.iter().chain(&folder.csvs)),
    );
    copy_staged(source, documents.filter_map(ManifestDocument::path), output)
}

/// Copy `paths` to the same place under `output`, relative to `source`
///
/// Copies go to a scratch directory first; `output` only sees them once all succeeded.
fn copy_staged<'a>(
    source: &Path,
    paths: impl Iterator<Item = &'a Path>,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let staging = staging_dir("nest")?;

    let mut written = Vec::new();
    for path in paths {
        let relative = path.strip_prefix(source).unwrap_or(path);
        copy_file(path, &staging.path().join(relative))?;
        written.push(relative.to_path_buf());
    }

    copy_dir_recursive(staging.path(), output, &CopyOptions::default())
        .map_err(|e| write_failed(output, e))?;
    Ok(written)
}

/// Lay flat manifests out as a nested bundle in `output`
///
/// # Errors
///
/// Returns `CourierError::BadBundle` with every collected problem in its report;
/// nothing is written to `output` in that case.
pub fn nest_documents(documents: &[ManifestDocument], output: &Path) -> Result<Vec<PathBuf>> {
    let staging = staging_dir("nest")?;
    let mut problems = ValidationReport::default();
    let written = stage(documents, staging.path(), &mut problems)?;

    if !problems.is_valid() {
        for problem in problems.errors() {
            tracing::error!("{}", problem.message);
        }
        return Err(bad_bundle(NEST_FAILED, problems));
    }

    copy_dir_recursive(staging.path(), output, &CopyOptions::default())
        .map_err(|e| write_failed(output, e))?;
    info!(output = %output.display(), files = written.len(), "nested bundle written");
    Ok(written)
}

/// Write every nested file under `dir`, collecting problems into `problems`
fn stage(
    documents: &[ManifestDocument],
    dir: &Path,
    problems: &mut ValidationReport,
) -> Result<Vec<PathBuf>> {
    let mut package: Option<&ManifestDocument> = None;
    let mut crds: HashMap<String, &ManifestDocument> = HashMap::new();
    let mut csvs = Vec::new();

    for document in documents {
        match document.kind() {
            ArtifactKind::Package if package.is_some() => {
                problems.error("Multiple packages in directory.", None);
            }
            ArtifactKind::Package => package = Some(document),
            ArtifactKind::CustomResourceDefinition => match document.metadata_name() {
                Some(name) => {
                    crds.insert(name.to_string(), document);
                }
                None => problems.error(
                    "CRD has no `metadata.name` field defined",
                    document.source_label().as_deref(),
                ),
            },
            ArtifactKind::ClusterServiceVersion => csvs.push(document),
            ArtifactKind::Unknown => {}
        }
    }

    if csvs.is_empty() {
        problems.error("No csvs in directory.", None);
    }
    let Some(package) = package else {
        problems.error("No package file in directory.", None);
        return Ok(Vec::new());
    };
    let Some(package_name) = package.content().get("packageName").and_then(scalar_to_string)
    else {
        problems.error(
            "Package file has no `packageName` field defined",
            package.source_label().as_deref(),
        );
        return Ok(Vec::new());
    };
    if !is_file_name(&package_name) {
        problems.error(
            format!("Package name {package_name} cannot be used as a file name"),
            package.source_label().as_deref(),
        );
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    written.push(write_yaml(
        dir,
        PathBuf::from(format!("{package_name}.package.yaml")),
        package.content(),
    )?);

    for csv in csvs {
        written.extend(stage_csv(csv, &crds, dir, problems)?);
    }

    Ok(written)
}

fn stage_csv(
    document: &ManifestDocument,
    crds: &HashMap<String, &ManifestDocument>,
    dir: &Path,
    problems: &mut ValidationReport,
) -> Result<Vec<PathBuf>> {
    let file = document.source_label();
    let file = file.as_deref();
    let csv = ClusterServiceVersion::from_value(document.content());

    let Some(metadata) = &csv.metadata else {
        problems.error("CSV has no `metadata` field defined", file);
        return Ok(Vec::new());
    };
    let Some(csv_name) = metadata.name.as_deref() else {
        problems.error("CSV has no `metadata.name` field defined", file);
        return Ok(Vec::new());
    };
    if !is_file_name(csv_name) {
        problems.error(format!("CSV name {csv_name} cannot be used as a file name"), file);
        return Ok(Vec::new());
    }
    let Some(spec) = &csv.spec else {
        problems.error(format!("CSV {csv_name} has no `spec` field defined"), file);
        return Ok(Vec::new());
    };
    let Some(version) = spec.version_string() else {
        problems.error(
            format!("CSV {csv_name} has no `spec.version` field defined"),
            file,
        );
        return Ok(Vec::new());
    };
    if semver::Version::parse(&version).is_err() {
        problems.error(
            format!("CSV {csv_name} has a `spec.version` that is not a valid semver: {version}"),
            file,
        );
        return Ok(Vec::new());
    }

    let folder = PathBuf::from(&version);
    let mut written = vec![write_yaml(
        dir,
        folder.join(format!("{csv_name}.clusterserviceversion.yaml")),
        document.content(),
    )?];

    for owned in spec.owned_crds().unwrap_or_default() {
        let Some(crd_name) = owned.name.as_deref() else {
            problems.error(
                format!("CSV {csv_name} has an owned CRD without a `name` field defined"),
                file,
            );
            continue;
        };
        if !is_file_name(crd_name) {
            problems.error(
                format!("CRD name {crd_name} mentioned in CSV {csv_name} cannot be used as a file name"),
                file,
            );
            continue;
        }
        match crds.get(crd_name) {
            Some(crd) => written.push(write_yaml(
                dir,
                folder.join(format!("{crd_name}.crd.yaml")),
                crd.content(),
            )?),
            None => problems.error(
                format!("CRD {crd_name} mentioned in CSV {csv_name} was not found in directory."),
                file,
            ),
        }
    }

    Ok(written)
}

/// Whether `name` is a single plain path component, so joining it stays inside the folder
fn is_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(['/', '\\'])
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
}

fn write_yaml(dir: &Path, relative: PathBuf, content: &Value) -> Result<PathBuf> {
    let text = serde_yaml::to_string(content)
        .map_err(|e| bad_yaml(relative.display().to_string(), e.to_string()))?;
    write_text(&dir.join(&relative), &text)?;
    Ok(relative)
}
