//! Nested to flat conversion
//!
//! Every CSV from every version folder is kept, renamed with a `-v{version}`
//! suffix so same-named files from different folders cannot collide. CRDs are
//! deduplicated by `metadata.name`, keeping the copy from the highest version
//! folder. Two different CRDs stored under the same file name get the same
//! suffix treatment, and the plan never names two files alike.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{info, warn};

use super::{Layout, ManifestScan};
use crate::common::fs::{CopyOptions, copy_dir_recursive, copy_file};
use crate::error::{Result, bundle::structural, fs::write_failed};
use crate::manifest::ManifestDocument;
use crate::temp::staging_dir;

/// A file to copy into the flat directory, under its new name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedFile {
    pub source: PathBuf,
    pub file_name: String,
}

impl FlattenedFile {
    fn unchanged(document: &ManifestDocument) -> Option<Self> {
        let source = document.path()?.to_path_buf();
        let file_name = source.file_name()?.to_string_lossy().to_string();
        Some(Self { source, file_name })
    }
}

/// Work out which files a flattened `source` consists of, without writing anything
///
/// # Errors
///
/// Returns `CourierError::BadBundle` for a missing or duplicate package, a version
/// folder without a CSV, a CRD without `metadata.name`, or two planned files
/// that would share a name.
pub fn plan_flatten(source: &Path) -> Result<Vec<FlattenedFile>> {
    let scan = ManifestScan::scan(source)?;

    if scan.layout()? == Layout::Flat {
        info!("source directory is already flat");
        let documents = std::iter::once(&scan.package)
            .chain(&scan.root.crds)
            .chain(&scan.root.csvs);
        return Ok(documents.filter_map(FlattenedFile::unchanged).collect());
    }

    // CRD name => (folder version, folder name, CRD file)
    let mut crds: BTreeMap<String, (Version, &str, &ManifestDocument)> = BTreeMap::new();
    let mut csvs = Vec::new();

    for folder in &scan.folders {
        let Ok(version) = Version::parse(&folder.name) else {
            warn!(
                folder = %folder.name,
                "ignoring folder as it is not a valid semver, see https://semver.org"
            );
            continue;
        };
        info!(folder = %folder.name, "parsing version folder");

        if folder.csvs.is_empty() {
            return Err(structural(format!(
                "This version directory does not contain any valid CSV file: {}",
                folder.name
            )));
        }

        for crd in &folder.crds {
            let Some(name) = crd.metadata_name() else {
                return Err(structural(format!(
                    "{} is not a valid CRD file as \"metadata.name\" field is required",
                    crd.source_label().unwrap_or_default()
                )));
            };
            let newer = crds
                .get(name)
                .is_none_or(|(kept, _, _)| version > *kept);
            if newer {
                crds.insert(name.to_string(), (version.clone(), folder.name.as_str(), crd));
            }
        }

        for csv in &folder.csvs {
            if let Some(source) = csv.path() {
                csvs.push(FlattenedFile {
                    source: source.to_path_buf(),
                    file_name: versioned_file_name(source, &folder.name),
                });
            }
        }
    }

    let mut files: Vec<FlattenedFile> = FlattenedFile::unchanged(&scan.package)
        .into_iter()
        .collect();
    let mut taken: HashSet<String> = files.iter().map(|f| f.file_name.clone()).collect();
    taken.extend(csvs.iter().map(|f| f.file_name.clone()));

    for (_, folder, crd) in crds.values() {
        let Some(mut file) = FlattenedFile::unchanged(crd) else {
            continue;
        };
        if taken.contains(&file.file_name) {
            file.file_name = versioned_file_name(&file.source, folder);
            info!(file = %file.file_name, "renamed CRD sharing its file name with another manifest");
        }
        if !taken.insert(file.file_name.clone()) {
            return Err(structural(format!(
                "More than one manifest would be flattened into {}",
                file.file_name
            )));
        }
        files.push(file);
    }
    files.extend(csvs);
    Ok(files)
}

/// Flatten `source` into `dest`, returning the files written
///
/// Files are staged in a scratch directory first, so `dest` is left untouched
/// unless every copy succeeds.
///
/// # Errors
///
/// Returns `CourierError::BadBundle` for structural problems (see [`plan_flatten`])
/// and `CourierError::FileWriteFailed` if a copy fails.
pub fn flatten(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let plan = plan_flatten(source)?;
    write_plan(&plan, dest)
}

fn write_plan(plan: &[FlattenedFile], dest: &Path) -> Result<Vec<PathBuf>> {
    let staging = staging_dir("flatten")?;

    for file in plan {
        copy_file(&file.source, &staging.path().join(&file.file_name))?;
    }
    copy_dir_recursive(staging.path(), dest, &CopyOptions::default())
        .map_err(|e| write_failed(dest, e))?;

    Ok(plan.iter().map(|file| dest.join(&file.file_name)).collect())
}

/// `csv.yaml` in folder `1.0.0` becomes `csv-v1.0.0.yaml`
fn versioned_file_name(path: &Path, version: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem}-v{version}.{}", ext.to_string_lossy()),
        None => format!("{stem}-v{version}"),
    }
}
