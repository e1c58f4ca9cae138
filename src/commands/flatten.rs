//! Flatten command implementation

use crate::cli::FlattenArgs;
use crate::common::display_utils::print_success;
use crate::error::Result;
use crate::layout;

/// Run flatten command
pub fn run(args: &FlattenArgs) -> Result<()> {
    let written = layout::flatten(&args.source, &args.dest)?;
    print_success(&format!(
        "Flattened {} files into {}",
        written.len(),
        args.dest.display()
    ));
    Ok(())
}
