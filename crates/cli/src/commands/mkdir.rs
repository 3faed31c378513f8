//! mkdir command - Create a folder
//!
//! Creates a folder inside a list or another folder.

use clap::Args;

use crate::commands::{EntryInfo, Session, fail, report_mutation};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a folder
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Path of the new folder (drive/list[/folder]/name)
    pub path: String,
}

/// Execute the mkdir command
pub fn execute(args: MkdirArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, path) = match Session::open(&args.path) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let Some(parent) = path.parent() else {
        formatter.error("A folder cannot be created at the drive root");
        return ExitCode::UsageError;
    };

    let folder = match session
        .resolve(&parent)
        .and_then(|container| session.connector.add_folder(&container, path.name()))
    {
        Ok(folder) => folder,
        Err(e) => return fail(&formatter, &e),
    };

    let display = session.display_path(&folder);
    let message = format!("Folder created: {display}");
    report_mutation(
        &formatter,
        "created",
        None,
        EntryInfo::new(&folder, display),
        message,
    );
    ExitCode::Success
}
