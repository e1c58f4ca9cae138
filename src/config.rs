//! Per-invocation settings
//!
//! Nothing is read from configuration files: every knob comes from a CLI flag,
//! falling back to an `OPCOURIER_*` environment variable, then to the default here.

use clap::ValueEnum;

/// Default app registry host for `push`
pub const DEFAULT_REGISTRY_HOST: &str = "quay.io";

/// What the bundle builder does with documents that are not CRDs, CSVs or packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UnknownKindPolicy {
    /// Drop the document and keep building
    #[default]
    Skip,
    /// Fail the build
    Reject,
}

/// Severity a configurable rule reports at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Severity {
    Warning,
    #[default]
    Error,
}

/// Resolved settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub registry_host: String,
    pub unknown_kinds: UnknownKindPolicy,
    pub alm_examples_severity: Severity,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
            unknown_kinds: UnknownKindPolicy::default(),
            alm_examples_severity: Severity::default(),
        }
    }
}

impl Settings {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            registry_host: cli.registry_host.clone(),
            unknown_kinds: cli.unknown_kinds,
            alm_examples_severity: cli.alm_examples_severity,
        }
    }
}
