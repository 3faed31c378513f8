//! exists command - Check whether an object exists
//!
//! A `*` segment asks whether the container before it has any child, which
//! is answered without listing the children.

use clap::Args;
use serde::Serialize;

use crate::commands::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Check whether an object exists
#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Drive path; may contain a `*` segment
    pub path: String,
}

#[derive(Debug, Serialize)]
struct ExistsOutput {
    path: String,
    exists: bool,
}

/// Execute the exists command
///
/// Exits with the not-found code when nothing matches.
pub fn execute(args: ExistsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, path) = match Session::open(&args.path) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let repo_path = session.repo_path(&path);
    let exists = match session.connector.has_object(&repo_path) {
        Ok(exists) => exists,
        Err(e) => return fail(&formatter, &e),
    };

    if formatter.is_json() {
        formatter.json(&ExistsOutput {
            path: path.to_string(),
            exists,
        });
    } else {
        formatter.println(if exists { "true" } else { "false" });
    }

    if exists {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}
