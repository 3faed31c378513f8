//! cat command - Display file contents
//!
//! Writes the content of a file to stdout, the latest version unless a
//! version number is given.

use std::io::{self, Write};

use clap::Args;

use crate::commands::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Display file contents
#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub struct CatArgs {
    /// File path (drive/path/to/file)
    pub path: String,

    /// Version number to read instead of the latest one
    #[arg(long)]
    pub version: Option<u32>,
}

/// Execute the cat command
pub fn execute(args: CatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, path) = match Session::open(&args.path) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let content = match session
        .resolve(&path)
        .and_then(|file| session.connector.open_file(&file, args.version))
    {
        Ok(content) => content,
        Err(e) => return fail(&formatter, &e),
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(&content).and_then(|()| stdout.flush()) {
        formatter.error(&format!("Failed to write output: {e}"));
        return ExitCode::GeneralError;
    }
    ExitCode::Success
}
