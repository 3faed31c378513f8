//! sd - sitedrive CLI
//!
//! A command-line interface for browsing and managing hierarchical site
//! repositories through path-addressable drives.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging; --debug wins over RUST_LOG
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli);

    std::process::exit(exit_code.as_i32());
}
