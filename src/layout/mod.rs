//! Manifest directory layouts
//!
//! A bundle directory is either:
//! - **flat**: the package, CRDs and CSVs all sit in the root
//! - **nested**: the package sits in the root and each version has its own
//!   subdirectory (a "manifest folder") holding that version's CRDs and CSVs
//!
//! [`ManifestScan`] reads a directory once (root plus immediate subdirectories),
//! enforces the single-package invariant, and answers which layout it is in.
//! [`flatten`] and [`nest`] convert between the two.

pub mod flatten;
pub mod nest;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::fs::{read_text, subdirectories, yaml_files};
use crate::error::{Result, bundle::structural};
use crate::manifest::{ArtifactKind, ManifestDocument};

pub use flatten::{flatten, plan_flatten};
pub use nest::nest;

/// Group key used for the single group of a flat layout
pub const FLAT_KEY: &str = "__flat__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Flat,
    Nested,
}

/// The CRDs and CSVs found directly in one directory
#[derive(Debug, Clone, Default)]
pub struct ManifestFolder {
    pub path: PathBuf,
    pub name: String,
    pub crds: Vec<ManifestDocument>,
    pub csvs: Vec<ManifestDocument>,
    /// YAML files of any other kind, left for the bundle builder's policy
    pub unknown: Vec<ManifestDocument>,
}

impl ManifestFolder {
    fn read(path: &Path) -> Result<(Self, Vec<ManifestDocument>)> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut folder = ManifestFolder {
            path: path.to_path_buf(),
            name,
            ..ManifestFolder::default()
        };
        let mut packages = Vec::new();

        for file in yaml_files(path)? {
            let text = read_text(&file)?;
            let document = ManifestDocument::parse(Some(file), &text)?;
            match document.kind() {
                ArtifactKind::CustomResourceDefinition => folder.crds.push(document),
                ArtifactKind::ClusterServiceVersion => folder.csvs.push(document),
                ArtifactKind::Package => packages.push(document),
                ArtifactKind::Unknown => {
                    debug!(file = ?document.path(), "found file of unknown kind");
                    folder.unknown.push(document);
                }
            }
        }

        Ok((folder, packages))
    }

    /// A manifest folder holds at least one CSV
    pub fn is_manifest_folder(&self) -> bool {
        !self.csvs.is_empty()
    }
}

/// One version's worth of documents to build and validate together
#[derive(Debug, Clone)]
pub struct ManifestGroup {
    pub key: String,
    pub documents: Vec<ManifestDocument>,
}

/// Everything manifest-shaped in a bundle directory
#[derive(Debug, Clone)]
pub struct ManifestScan {
    pub package: ManifestDocument,
    pub root: ManifestFolder,
    pub folders: Vec<ManifestFolder>,
}

impl ManifestScan {
    /// Read `dir` and its immediate subdirectories
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BadBundle` unless the root holds exactly one package,
    /// and `CourierError::BadYaml` for any YAML file that cannot be parsed.
    pub fn scan(dir: &Path) -> Result<Self> {
        let (root, mut packages) = ManifestFolder::read(dir)?;

        let package = match packages.len() {
            0 => return Err(structural("Bundle does not contain any packages.")),
            1 => packages.remove(0),
            _ => {
                return Err(structural(
                    "Only 1 package is expected to exist in source root folder.",
                ));
            }
        };

        let folders = subdirectories(dir)?
            .iter()
            .map(|path| ManifestFolder::read(path).map(|(folder, _)| folder))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            package,
            root,
            folders,
        })
    }

    /// Detect the layout; nested wins when any manifest folder exists
    ///
    /// # Errors
    ///
    /// Returns `CourierError::BadBundle` if neither the root nor any subdirectory holds a CSV.
    pub fn layout(&self) -> Result<Layout> {
        for folder in self.folders.iter().filter(|f| !f.is_manifest_folder()) {
            warn!(
                folder = %folder.name,
                "ignoring folder as it is not a valid manifest folder"
            );
        }

        if self.folders.iter().any(ManifestFolder::is_manifest_folder) {
            debug!("source directory is nested");
            Ok(Layout::Nested)
        } else if self.root.is_manifest_folder() {
            debug!("source directory is flat");
            Ok(Layout::Flat)
        } else {
            Err(structural(
                "The source directory structure is not in valid flat or nested format, because no valid CSV file is found in root or manifest directories.",
            ))
        }
    }

    /// Manifest folders of a nested layout, in name order
    pub fn manifest_folders(&self) -> impl Iterator<Item = &ManifestFolder> {
        self.folders.iter().filter(|f| f.is_manifest_folder())
    }

    /// Split the documents into validation groups
    ///
    /// Flat layouts form one group keyed [`FLAT_KEY`]; nested layouts form one
    /// group per manifest folder, each carrying the root package. Unknown
    /// documents ride along so the builder can apply its policy.
    pub fn groups(&self, layout: Layout) -> Vec<ManifestGroup> {
        match layout {
            Layout::Flat => {
                let mut documents = vec![self.package.clone()];
                documents.extend(self.root.crds.iter().cloned());
                documents.extend(self.root.csvs.iter().cloned());
                documents.extend(self.root.unknown.iter().cloned());
                vec![ManifestGroup {
                    key: FLAT_KEY.to_string(),
                    documents,
                }]
            }
            Layout::Nested => self
                .manifest_folders()
                .map(|folder| {
                    let mut documents: Vec<ManifestDocument> = folder
                        .crds
                        .iter()
                        .chain(&folder.csvs)
                        .chain(&folder.unknown)
                        .cloned()
                        .collect();
                    documents.push(self.package.clone());
                    ManifestGroup {
                        key: folder.name.clone(),
                        documents,
                    }
                })
                .collect(),
        }
    }
}
