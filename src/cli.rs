//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_REGISTRY_HOST, Severity, UnknownKindPolicy};

/// opcourier - operator bundle courier
///
/// Build, verify, reshape and push operator bundles for app registries.
#[derive(Parser, Debug)]
#[command(
    name = "opcourier",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Build, verify, reshape and push operator bundles",
    long_about = "opcourier builds operator bundles (CRDs, CSVs and a package) from flat or nested \
                  manifest directories, validates them, converts between the two layouts and \
                  pushes them to an app registry.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  opcourier verify ./manifests\n    \
                  opcourier verify ./manifests --ui-validate-io\n    \
                  opcourier nest ./flat ./nested\n    \
                  opcourier flatten ./nested ./flat\n    \
                  opcourier push ./manifests acme widget 1.0.0 \"basic <token>\""
)]
pub struct Cli {
    /// App registry host to push to
    #[arg(
        long,
        global = true,
        env = "OPCOURIER_REGISTRY_HOST",
        default_value = DEFAULT_REGISTRY_HOST
    )]
    pub registry_host: String,

    /// What to do with YAML documents that are not CRDs, CSVs or packages
    #[arg(
        long,
        global = true,
        value_enum,
        env = "OPCOURIER_UNKNOWN_KINDS",
        default_value_t = UnknownKindPolicy::Skip
    )]
    pub unknown_kinds: UnknownKindPolicy,

    /// Severity of owned CRDs missing from the alm-examples annotation
    #[arg(
        long,
        global = true,
        value_enum,
        env = "OPCOURIER_ALM_EXAMPLES_SEVERITY",
        default_value_t = Severity::Error
    )]
    pub alm_examples_severity: Severity,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and validate a bundle
    Verify(VerifyArgs),

    /// Verify a bundle and push it to an app registry
    Push(PushArgs),

    /// Convert a flat manifest directory into one folder per version
    Nest(NestArgs),

    /// Convert a nested manifest directory into a single flat directory
    Flatten(FlattenArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Verify a flat or nested manifest directory:\n    opcourier verify ./manifests\n\n\
                   Include the operatorhub.io UI checks:\n    opcourier verify ./manifests --ui-validate-io\n\n\
                   Verify a formatted bundle file:\n    opcourier verify ./bundle.yaml\n\n\
                   Save the report as JSON:\n    opcourier verify ./manifests --validation-output report.json")]
pub struct VerifyArgs {
    /// Manifest directory (flat or nested) or formatted bundle file
    pub source: PathBuf,

    /// Also check the fields operatorhub.io needs to render the operator
    #[arg(long = "ui-validate-io", alias = "ui_validate_io")]
    pub ui_validate_io: bool,

    /// Write the validation report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub validation_output: Option<PathBuf>,

    /// Require the package name to match this repository
    #[arg(long)]
    pub repository: Option<String>,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Push a bundle:\n    opcourier push ./manifests acme widget 1.0.0 \"basic <token>\"\n\n\
                  Push to another registry:\n    opcourier --registry-host registry.example.com push ./manifests acme widget 1.0.0 \"$TOKEN\"")]
pub struct PushArgs {
    /// Manifest directory (flat or nested)
    pub source: PathBuf,

    /// Registry namespace (organization)
    pub namespace: String,

    /// Registry repository; must match the package name
    pub repository: String,

    /// Release version to push as
    pub release: String,

    /// Value of the Authorization header
    pub token: String,

    /// Write the validation report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub validation_output: Option<PathBuf>,
}

/// Arguments for the nest command
#[derive(Parser, Debug)]
pub struct NestArgs {
    /// Flat manifest directory
    pub source: PathBuf,

    /// Directory to write the nested layout into
    pub output: PathBuf,
}

/// Arguments for the flatten command
#[derive(Parser, Debug)]
pub struct FlattenArgs {
    /// Nested manifest directory
    pub source: PathBuf,

    /// Directory to write the flat layout into
    pub dest: PathBuf,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    opcourier completions --shell bash > ~/.bash_completion.d/opcourier\n\n\
                  Generate zsh completions:\n    opcourier completions --shell zsh > ~/.zfunc/_opcourier\n\n\
                  Generate fish completions:\n    opcourier completions --shell fish > ~/.config/fish/completions/opcourier.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, value_enum, ignore_case = true)]
    pub shell: clap_complete::Shell,
}
