//! App registry push
//!
//! A prepared directory is packed into a base64 gzipped tarball ([`archive`]) and
//! POSTed to `{host}/cnr/api/v1/packages/{namespace}/{repository}` ([`client`]).
//! One blocking request, no retry.

pub mod archive;
pub mod client;

use std::path::Path;

use crate::error::Result;

pub use client::RegistryClient;

/// Where and as what a bundle is pushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub namespace: String,
    pub repository: String,
    pub release: String,
    /// Sent verbatim as the `Authorization` header
    pub token: String,
}

/// Pack `dir` and push it to the registry at `host`
///
/// # Errors
///
/// Returns an error if packing fails, if the registry cannot be reached, or if it
/// answers with a non-2xx status.
pub fn push_dir(host: &str, dir: &Path, request: &PushRequest) -> Result<()> {
    let blob = archive::encode_dir(dir)?;
    RegistryClient::new(host)?.push(request, &blob)
}
