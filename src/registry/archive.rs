//! Packing a staged bundle directory into the blob the registry expects

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::Builder;
use walkdir::WalkDir;

use crate::common::fs::BLACKLISTED_FILES;
use crate::error::{Result, fs::read_failed, fs::write_failed};

fn is_blacklisted(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| BLACKLISTED_FILES.contains(&name))
}

/// Gzip-compressed tar of `dir`, with every entry under `dir`'s own name
///
/// # Errors
///
/// Returns `CourierError::FileReadFailed` if the directory cannot be walked or a
/// file cannot be added.
pub fn tar_gz(dir: &Path) -> Result<Vec<u8>> {
    let root = dir
        .file_name()
        .map_or_else(|| "bundle".into(), |name| name.to_os_string());
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_blacklisted(entry.path()));

    for entry in entries {
        let entry = entry.map_err(|e| read_failed(dir, e))?;
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let name = Path::new(&root).join(relative);
        if entry.file_type().is_dir() {
            builder
                .append_dir(&name, entry.path())
                .map_err(|e| read_failed(entry.path(), e))?;
        } else if entry.file_type().is_file() {
            builder
                .append_path_with_name(entry.path(), &name)
                .map_err(|e| read_failed(entry.path(), e))?;
        }
    }

    let encoder = builder.into_inner().map_err(|e| write_failed(dir, e))?;
    encoder.finish().map_err(|e| write_failed(dir, e))
}

/// Base64 (standard alphabet) of the gzipped tar of `dir`
///
/// # Errors
///
/// See [`tar_gz`].
pub fn encode_dir(dir: &Path) -> Result<String> {
    Ok(STANDARD.encode(tar_gz(dir)?))
}
