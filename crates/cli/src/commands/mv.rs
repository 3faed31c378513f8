//! mv command - Move or rename an item
//!
//! Moves into the target when it is an existing list or folder. Otherwise the
//! last target segment is the new name: within the same folder this is a
//! plain rename, elsewhere the item is moved into the target's parent first.

use clap::Args;

use sd_core::path::{eq_ci, join_path, parent_path};
use sd_core::{DrivePath, Entity, Error, Result};

use crate::commands::{EntryInfo, Session, fail, report_mutation};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Move or rename an item
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Item to move
    pub source: String,

    /// Target list or folder, or the new path of the item
    pub target: String,
}

/// Execute the mv command
pub fn execute(args: MvArgs, output_config: OutputConfig) -> ExitCode {
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

    match relocate(&mut session, &entity, target) {
        Ok((moved, action)) => {
            let to = session.display_path(&moved);
            let message = format!("{from} -> {to}");
            report_mutation(
                &formatter,
                action,
                Some(from),
                EntryInfo::new(&moved, to),
                message,
            );
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &e),
    }
}

fn relocate(
    session: &mut Session,
    entity: &Entity,
    target: &DrivePath,
) -> Result<(Entity, &'static str)> {
    match session.resolve(target) {
        // Same object under a different case: only the name changes
        Ok(existing) if eq_ci(existing.path(), entity.path()) => Ok((
            session.connector.rename(entity, target.name())?,
            "renamed",
        )),
        Ok(container) => Ok((session.connector.move_to(entity, &container)?, "moved")),
        Err(e) if e.is_not_found() => {
            let Some(target_parent) = target.parent() else {
                return Err(e);
            };
            let parent = session.resolve(&target_parent)?;
            let name = target.name();
            if eq_ci(parent.path(), parent_path(entity.path())) {
                return Ok((session.connector.rename(entity, name)?, "renamed"));
            }
            if !eq_ci(entity.name(), name) {
                let landing = join_path(parent.path(), entity.name());
                if session.connector.exists(&landing)? {
                    return Err(Error::Conflict(format!(
                        "{landing} already exists; cannot move {} there before renaming it",
                        entity.path()
                    )));
                }
            }
            let moved = session.connector.move_to(entity, &parent)?;
            if moved.name() == name {
                return Ok((moved, "moved"));
            }
            let renamed = session.connector.rename(&moved, name).map_err(|e| {
                let context = format!("the item was moved to {} under its old name", moved.path());
                e.with_context(&context)
            })?;
            Ok((renamed, "moved"))
        }
        Err(e) => Err(e),
    }
}
