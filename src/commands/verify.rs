//! Verify command implementation
//!
//! Builds and validates the bundle, prints warnings, and fails with the full
//! report when any error was found.

use crate::cli::VerifyArgs;
use crate::common::display_utils::{print_report, print_success};
use crate::config::Settings;
use crate::error::Result;
use crate::operations::{ManifestSource, VerifyOptions, build_and_verify};

/// Run verify command
pub fn run(settings: &Settings, args: VerifyArgs) -> Result<()> {
    let source = ManifestSource::from_path(&args.source)?;
    let options = VerifyOptions {
        repository: args.repository,
        ui_validate: args.ui_validate_io,
        ..VerifyOptions::from_settings(settings)
    };

    let verified = build_and_verify(&source, &options, args.validation_output.as_deref())?;

    print_report(&verified.report);
    let layout = if verified.nested { "nested" } else { "flat" };
    print_success(&format!(
        "{} is a valid {layout} bundle",
        args.source.display()
    ));
    Ok(())
}
