//! Common file system operations with unified error handling
//!
//! Manifest discovery never recurses further than one level: a bundle directory's
//! own files plus its immediate version subdirectories.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, fs as fs_error};

/// Files that are never packed or copied as part of a bundle
pub const BLACKLISTED_FILES: &[&str] = &["art.yaml", "image-references"];

#[derive(Default, Clone)]
pub struct CopyOptions {
    pub exclude: Vec<String>,
}

impl CopyOptions {
    #[allow(dead_code)] // used in tests
    pub fn exclude_blacklisted() -> Self {
        Self {
            exclude: BLACKLISTED_FILES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn excludes(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.exclude.iter().any(|excluded| excluded == name))
    }
}

/// Copy a directory recursively with options
pub fn copy_dir_recursive<P1, P2>(src: P1, dst: P2, options: &CopyOptions) -> std::io::Result<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let src_ref = src.as_ref();
    let dst_ref = dst.as_ref();

    fs::create_dir_all(dst_ref)?;

    for entry in fs::read_dir(src_ref)? {
        let entry_path = entry?.path();
        if options.excludes(&entry_path) {
            continue;
        }
        let Some(file_name) = entry_path.file_name() else {
            continue;
        };
        let dst_path = dst_ref.join(file_name);

        if entry_path.is_dir() {
            copy_dir_recursive(&entry_path, &dst_path, options)?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Whether a path has a `.yaml` or `.yml` extension
pub fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Immediate entries of `dir`, sorted by file name
fn immediate_entries(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
    if !dir.is_dir() {
        return Err(fs_error::not_found(dir));
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.map_err(|e| fs_error::read_failed(dir, e)))
        .collect()
}

/// YAML files directly inside `dir`, sorted by file name
///
/// # Errors
///
/// Returns `CourierError::FileNotFound` if `dir` is not a directory.
pub fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(immediate_entries(dir)?
        .into_iter()
        .filter(|entry| entry.file_type().is_file() && is_yaml_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect())
}

/// Immediate subdirectories of `dir`, sorted by name
///
/// # Errors
///
/// Returns `CourierError::FileNotFound` if `dir` is not a directory.
pub fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(immediate_entries(dir)?
        .into_iter()
        .filter(|entry| entry.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect())
}

/// Read a text file, mapping failures to `FileReadFailed`
///
/// # Errors
///
/// Returns `CourierError::FileReadFailed` if the file cannot be read.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, e))
}

/// Write a text file, creating parent directories
///
/// # Errors
///
/// Returns `CourierError::FileWriteFailed` if the file cannot be written.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| fs_error::write_failed(path, e))
}

/// Copy a single file, creating the destination's parent directories
///
/// # Errors
///
/// Returns `CourierError::FileWriteFailed` if the copy fails.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;
    }
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| fs_error::write_failed(dst, e))
}
