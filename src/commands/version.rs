//! Version command implementation

use crate::config::DEFAULT_REGISTRY_HOST;
use crate::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    println!("opcourier {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());
    println!("  Default registry: {DEFAULT_REGISTRY_HOST}");

    Ok(())
}

fn rustc_version() -> &'static str {
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
