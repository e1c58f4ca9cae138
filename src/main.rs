//! opcourier - operator bundle courier
//!
//! Builds operator bundles (CRDs, CSVs and a package manifest) from flat or
//! nested manifest directories, validates them, converts between the two
//! layouts, and pushes them to an app registry.

use clap::Parser;

mod bundle;
mod cli;
mod commands;
mod common;
mod config;
mod error;
mod layout;
mod logging;
mod manifest;
mod operations;
mod registry;
mod temp;
mod validate;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use common::display_utils::print_report;
use config::Settings;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let settings = Settings::from_cli(&cli);

    let result = match cli.command {
        Commands::Verify(args) => commands::verify::run(&settings, args),
        Commands::Push(args) => commands::push::run(&settings, args),
        Commands::Nest(args) => commands::nest::run(&args),
        Commands::Flatten(args) => commands::flatten::run(&args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(report) = e.report() {
            print_report(report);
        }
        std::process::exit(1);
    }
}
