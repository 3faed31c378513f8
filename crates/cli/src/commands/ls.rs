//! ls command - List the children of a container
//!
//! Lists sites, container groups and lists of a site, the lists of a group or
//! the items of a list or folder. The last path segment may be a glob pattern
//! filtering the children by name.

use clap::Args;
use glob::{MatchOptions, Pattern};
use serde::Serialize;

use sd_core::path::join_path;
use sd_core::{DrivePath, Entity, Error, Result};

use crate::commands::{EntryInfo, Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size, format_timestamp};

/// List the children of a container
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Drive path (drive[/path][/pattern])
    pub path: String,

    /// List recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Summarize output (show totals only)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<EntryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: u64,
    total_size_human: String,
}

/// Execute the ls command
pub fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, path) = match Session::open(&args.path) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let (container_path, pattern) = match split_pattern(&path) {
        Ok(split) => split,
        Err(e) => return fail(&formatter, &e),
    };

    let entries = match collect(&mut session, &container_path, pattern.as_ref(), args.recursive) {
        Ok(entries) => entries,
        Err(e) => return fail(&formatter, &e),
    };

    print_entries(&entries, &args, &formatter);
    ExitCode::Success
}

/// Separate a trailing glob pattern from the container path
fn split_pattern(path: &DrivePath) -> Result<(DrivePath, Option<Pattern>)> {
    let name = path.name();
    if !name.contains(['*', '?', '[']) {
        return Ok((path.clone(), None));
    }
    let pattern = Pattern::new(name)
        .map_err(|e| Error::InvalidPath(format!("Invalid pattern '{name}': {e}")))?;
    let parent = path
        .parent()
        .unwrap_or_else(|| DrivePath::new(path.drive.clone(), ""));
    Ok((parent, Some(pattern)))
}

fn matches(pattern: Option<&Pattern>, name: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    pattern.is_none_or(|pattern| pattern.matches_with(name, options))
}

/// Entries below the container at `path`, depth first when recursive
fn collect(
    session: &mut Session,
    path: &DrivePath,
    pattern: Option<&Pattern>,
    recursive: bool,
) -> Result<Vec<EntryInfo>> {
    let container = session.resolve(path)?;
    if container.as_container().is_none() {
        let display = session.display_path(&container);
        return Ok(vec![EntryInfo::new(&container, display)]);
    }

    let mut entries = Vec::new();
    walk(session, &container, "", pattern, recursive, &mut entries)?;
    Ok(entries)
}

fn walk(
    session: &mut Session,
    container: &Entity,
    prefix: &str,
    pattern: Option<&Pattern>,
    recursive: bool,
    entries: &mut Vec<EntryInfo>,
) -> Result<()> {
    let children = session.connector.children(container)?;
    for child in &children {
        let relative = join_path(prefix, child.name());
        if matches(pattern, child.name()) {
            let mut entry = EntryInfo::new(child, session.display_path(child));
            entry.name = relative.clone();
            entries.push(entry);
        }
        if recursive && child.as_container().is_some() {
            walk(session, child, &relative, pattern, recursive, entries)?;
        }
    }
    Ok(())
}

fn print_entries(entries: &[EntryInfo], args: &LsArgs, formatter: &Formatter) {
    let total_objects = entries.iter().filter(|e| !e.kind.is_container()).count();
    let total_size: u64 = entries.iter().filter_map(|e| e.size_bytes).sum();

    if formatter.is_json() {
        let output = LsOutput {
            items: entries.to_vec(),
            summary: args.summarize.then(|| Summary {
                total_objects,
                total_size_bytes: total_size,
                total_size_human: format_size(total_size),
            }),
        };
        formatter.json(&output);
        return;
    }

    if !args.summarize {
        for entry in entries {
            formatter.println(&format_line(entry, formatter));
        }
    }
    if args.summarize || (args.recursive && entries.len() > 1) {
        formatter.println(&format!(
            "\nTotal: {total_objects} objects, {}",
            format_size(total_size)
        ));
    }
}

/// One listing line: date, size, kind and name
fn format_line(entry: &EntryInfo, formatter: &Formatter) -> String {
    let date = entry
        .modified
        .map(format_timestamp)
        .unwrap_or_else(|| " ".repeat(19));
    let size = entry.size_human.clone().unwrap_or_default();
    let name = formatter.name(entry.kind, &entry.name);
    format!("[{date}] {size:>10} {:<6} {name}", entry.kind.as_str())
}
