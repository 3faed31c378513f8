//! put command - Upload a local file
//!
//! Creates a new file in a list or folder, or stores the upload as the next
//! version when the target is an existing file.

use std::path::{Path, PathBuf};

use clap::Args;

use sd_core::{DrivePath, Entity, Error, Result};

use crate::commands::{EntryInfo, Session, fail, report_mutation};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

/// Upload a local file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub local: PathBuf,

    /// Target file, or the list or folder to upload into
    pub target: String,
}

/// Execute the put command
pub fn execute(args: PutArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, target) = match Session::open(&args.target) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let content = match std::fs::read(&args.local) {
        Ok(content) => content,
        Err(e) => {
            formatter.error(&format!("Failed to read {}: {e}", args.local.display()));
            return ExitCode::UsageError;
        }
    };

    match upload(&mut session, &target, &args.local, &content) {
        Ok((file, action)) => {
            let display = session.display_path(&file);
            let message = format!(
                "{} -> {display} ({}, {action})",
                args.local.display(),
                format_size(content.len() as u64)
            );
            let entry = EntryInfo::new(&file, display);
            report_mutation(
                &formatter,
                action,
                Some(args.local.display().to_string()),
                entry,
                message,
            );
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &e),
    }
}

/// Store `content` at `target`; returns the file and what happened to it
fn upload(
    session: &mut Session,
    target: &DrivePath,
    local: &Path,
    content: &[u8],
) -> Result<(Entity, &'static str)> {
    match session.resolve(target) {
        Ok(file @ Entity::File(_)) => Ok((session.connector.save_file(&file, content)?, "saved")),
        Ok(container) => {
            let name = local_name(local)?;
            Ok((session.connector.add_file(&container, name, content)?, "created"))
        }
        Err(e) if e.is_not_found() => {
            let Some(parent) = target.parent() else {
                return Err(e);
            };
            let container = session.resolve(&parent)?;
            let file = session
                .connector
                .add_file(&container, target.name(), content)?;
            Ok((file, "created"))
        }
        Err(e) => Err(e),
    }
}

fn local_name(local: &Path) -> Result<&str> {
    local
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::InvalidArgument(format!("Cannot name a file after {}", local.display()))
        })
}
