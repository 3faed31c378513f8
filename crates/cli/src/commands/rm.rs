//! rm command - Remove objects
//!
//! Removes sites, lists and items. Containers go with everything below them.

use clap::Args;
use serde::Serialize;

use sd_core::{DrivePath, Result};

use crate::commands::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Paths to remove, all on the same drive
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Only show what would be removed (dry run)
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
    total: usize,
}

/// Execute the rm command
pub fn execute(args: RmArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some((first, others)) = args.paths.split_first() else {
        formatter.error("No path given");
        return ExitCode::UsageError;
    };
    let (mut session, paths) = match Session::open_many(first, others) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut exit_code = ExitCode::Success;

    for path in &paths {
        match remove(&mut session, path, args.dry_run) {
            Ok(display) => {
                if args.dry_run {
                    formatter.println(&format!("Would remove: {display}"));
                } else {
                    formatter.success(&format!("Removed: {display}"));
                }
                deleted.push(display);
            }
            Err(e) => {
                exit_code = fail(&formatter, &e);
                failed.push(path.to_string());
            }
        }
    }

    if formatter.is_json() {
        formatter.json(&RmOutput {
            status: if failed.is_empty() { "success" } else { "partial" },
            total: deleted.len(),
            deleted,
            failed,
        });
    }
    exit_code
}

fn remove(session: &mut Session, path: &DrivePath, dry_run: bool) -> Result<String> {
    let entity = session.resolve(path)?;
    let display = session.display_path(&entity);
    if dry_run {
        entity.require_removable()?;
    } else {
        session.connector.remove(&entity)?;
    }
    Ok(display)
}
