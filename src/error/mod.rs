//! Error types and handling for opcourier
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`manifest`]: YAML parsing and artifact classification errors
//! - [`bundle`]: Structural bundle errors and validation failures
//! - [`registry`]: App registry push errors
//! - [`fs`]: File system errors

pub mod bundle;
pub mod fs;
pub mod manifest;
pub mod registry;

use miette::Diagnostic;
use thiserror::Error;

use crate::validate::ValidationReport;

/// Main error type for opcourier operations
#[derive(Error, Diagnostic, Debug)]
pub enum CourierError {
    // Manifest errors
    #[error("Courier requires valid input YAML files: {path}: {reason}")]
    #[diagnostic(
        code(opcourier::manifest::bad_yaml),
        help("Fix the YAML syntax error and run the command again")
    )]
    BadYaml { path: String, reason: String },

    #[error("File is not a CRD, CSV or package manifest: {path}")]
    #[diagnostic(
        code(opcourier::manifest::unknown_artifact),
        help("Remove the file or run with --unknown-kinds skip to ignore it")
    )]
    UnknownArtifact { path: String },

    // Bundle errors
    #[error("{message}")]
    #[diagnostic(code(opcourier::bundle::bad_bundle))]
    BadBundle {
        message: String,
        report: Box<ValidationReport>,
    },

    #[error("Resulting bundle is invalid, input yaml is improperly defined.")]
    #[diagnostic(
        code(opcourier::bundle::invalid),
        help("Run 'opcourier verify --validation-output FILE' to collect every error")
    )]
    BundleInvalid { report: Box<ValidationReport> },

    // Registry errors
    #[error("Failed to communicate with app registry at {url}: {reason}")]
    #[diagnostic(
        code(opcourier::registry::communication),
        help("Check the registry host and your network connection")
    )]
    RegistryCommunication { url: String, reason: String },

    #[error("Registry token cannot be sent as an Authorization header: {reason}")]
    #[diagnostic(
        code(opcourier::registry::invalid_token),
        help("Pass the token without line breaks or control characters, e.g. \"basic <token>\"")
    )]
    InvalidToken { reason: String },

    #[error("App registry rejected the push ({status}): {message}")]
    #[diagnostic(code(opcourier::registry::rejected))]
    RegistryRejected {
        status: u16,
        message: String,
        body: serde_json::Value,
    },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(opcourier::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(opcourier::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(opcourier::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(opcourier::fs::io_error))]
    IoError { message: String },
}

impl CourierError {
    /// Validation info collected before the error was raised, if any
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            CourierError::BadBundle { report, .. } | CourierError::BundleInvalid { report } => {
                Some(report)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for CourierError {
    fn from(err: std::io::Error) -> Self {
        CourierError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::IoError {
            message: format!("JSON serialization failed: {err}"),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, CourierError>;
