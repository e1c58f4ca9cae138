//! Nest command implementation

use crate::cli::NestArgs;
use crate::common::display_utils::print_success;
use crate::error::Result;
use crate::layout;

/// Run nest command
pub fn run(args: &NestArgs) -> Result<()> {
    let written = layout::nest(&args.source, &args.output)?;
    print_success(&format!(
        "Nested {} files into {}",
        written.len(),
        args.output.display()
    ));
    Ok(())
}
