//! Push command implementation

use crate::cli::PushArgs;
use crate::common::display_utils::{print_report, print_success};
use crate::config::Settings;
use crate::error::Result;
use crate::operations::{PushOperation, PushOptions};
use crate::registry::PushRequest;

/// Run push command
pub fn run(settings: &Settings, args: PushArgs) -> Result<()> {
    let request = PushRequest {
        namespace: args.namespace,
        repository: args.repository,
        release: args.release,
        token: args.token,
    };
    let summary = format!(
        "Pushed {} {} to {}/{}",
        request.repository, request.release, settings.registry_host, request.namespace
    );

    let operation = PushOperation::new(PushOptions::new(request, settings));
    let verified = operation.execute(&args.source, args.validation_output.as_deref())?;

    print_report(&verified.report);
    print_success(&summary);
    Ok(())
}
