//! cp command - Copy an item
//!
//! Copies into the target when it is an existing list or folder; otherwise
//! the last target segment names the copy inside the target's parent.

use clap::Args;

use sd_core::{CopyOptions, DrivePath, Entity, Result};

use crate::commands::{EntryInfo, Session, fail, report_mutation};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Copy an item
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Item to copy
    pub source: String,

    /// Target list or folder, or the path of the copy
    pub target: String,

    /// Copy the content of folders too
    #[arg(short, long)]
    pub recursive: bool,
}

/// Execute the cp command
pub fn execute(args: CpArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, paths) = match Session::open_many(&args.source, &[args.target.clone()]) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };
    let (source, target) = (&paths[0], &paths[1]);

    let entity = match session.resolve(source) {
        Ok(entity) => entity,
        Err(e) => return fail(&formatter, &e),
    };
    let from = session.display_path(&entity);

    match copy(&mut session, &entity, target, args.recursive) {
        Ok(copy) => {
            let to = session.display_path(&copy);
            let message = format!("{from} -> {to}");
            report_mutation(
                &formatter,
                "copied",
                Some(from),
                EntryInfo::new(&copy, to),
                message,
            );
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &e),
    }
}

fn copy(
    session: &mut Session,
    entity: &Entity,
    target: &DrivePath,
    recurse: bool,
) -> Result<Entity> {
    match session.resolve(target) {
        Ok(container) => {
            let options = CopyOptions {
                recurse,
                new_name: None,
            };
            session.connector.copy_to(entity, &container, &options)
        }
        Err(e) if e.is_not_found() => {
            let Some(parent_path) = target.parent() else {
                return Err(e);
            };
            let parent = session.resolve(&parent_path)?;
            let options = CopyOptions {
                recurse,
                new_name: Some(target.name().to_string()),
            };
            session.connector.copy_to(entity, &parent, &options)
        }
        Err(e) => Err(e),
    }
}
