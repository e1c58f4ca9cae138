//! High-level operations behind the CLI commands
//!
//! - [`verify`]: build bundles from a manifest source and validate them
//! - [`push`]: verify, stage and push a bundle directory to an app registry
//!
//! Flatten and nest live in [`crate::layout`] as they need no validation pass.

pub mod push;
pub mod verify;

pub use push::{PushOperation, PushOptions};
pub use verify::{ManifestSource, VerifiedManifest, VerifyOptions, build_and_verify};
