//! CLI command definitions and execution
//!
//! Each command parses its drive paths, opens a session on the drive and
//! drives the connector. One invocation is one unit of work: the batch cache
//! lives exactly as long as the process.

use clap::{Parser, Subcommand};
use jiff::Timestamp;
use serde::Serialize;

use sd_core::path::{join_path, strip_prefix_ci};
use sd_core::{
    Connector, DriveConfig, DriveManager, DrivePath, Entity, EntityKind, Error, Result,
    parse_drive_path,
};
use sd_memory::MemoryBackend;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

mod cat;
mod completions;
mod cp;
mod drive;
mod exists;
mod ls;
mod mkdir;
mod mv;
mod new;
mod put;
mod rm;
mod stat;

/// sd - sitedrive CLI
///
/// Browse and manage hierarchical site repositories (sites, lists, folders
/// and files) through named drives.
#[derive(Parser, Debug)]
#[command(name = "sd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage drive connections
    #[command(subcommand)]
    Drive(drive::DriveCommands),

    /// List the children of a container
    Ls(ls::LsArgs),

    /// Show details of an object
    Stat(stat::StatArgs),

    /// Print the content of a file
    Cat(cat::CatArgs),

    /// Upload a local file, adding a version if the file exists
    Put(put::PutArgs),

    /// Create a folder
    Mkdir(mkdir::MkdirArgs),

    /// Create a site, a list or an item
    #[command(subcommand)]
    New(new::NewCommands),

    /// Remove objects
    Rm(rm::RmArgs),

    /// Move or rename an item
    Mv(mv::MvArgs),

    /// Copy an item
    Cp(cp::CpArgs),

    /// Check whether an object exists; `*` matches any child
    Exists(exists::ExistsArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub fn execute(cli: Cli) -> ExitCode {
    // A broken configuration surfaces once a command opens its drive
    let defaults = DriveManager::new()
        .and_then(|manager| manager.defaults())
        .unwrap_or_default();
    let output_config = OutputConfig::resolve(cli.json, cli.no_color, cli.quiet, &defaults);

    match cli.command {
        Commands::Drive(cmd) => drive::execute(cmd, output_config),
        Commands::Ls(args) => ls::execute(args, output_config),
        Commands::Stat(args) => stat::execute(args, output_config),
        Commands::Cat(args) => cat::execute(args, output_config),
        Commands::Put(args) => put::execute(args, output_config),
        Commands::Mkdir(args) => mkdir::execute(args, output_config),
        Commands::New(cmd) => new::execute(cmd, output_config),
        Commands::Rm(args) => rm::execute(args, output_config),
        Commands::Mv(args) => mv::execute(args, output_config),
        Commands::Cp(args) => cp::execute(args, output_config),
        Commands::Exists(args) => exists::execute(args, output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Report an error and pick the matching exit code
pub(crate) fn fail(formatter: &Formatter, error: &Error) -> ExitCode {
    let code = ExitCode::from_error(error);
    formatter.failure(error, code);
    code
}

/// A connector opened on one configured drive
pub(crate) struct Session {
    drive: DriveConfig,
    pub(crate) connector: Connector<MemoryBackend>,
}

impl Session {
    /// Open the drive a CLI path names and parse the rest of the path
    pub(crate) fn open(path: &str) -> Result<(Self, DrivePath)> {
        let path = parse_drive_path(path)?;
        let drive = DriveManager::new()?.get(&path.drive)?;
        let backend = MemoryBackend::from_url(&drive.url()?)?;
        let connector = Connector::new(backend, drive.connector_options());
        Ok((Self { drive, connector }, path))
    }

    /// Open the drive of `first` and parse `others`, which must name the same drive
    pub(crate) fn open_many(first: &str, others: &[String]) -> Result<(Self, Vec<DrivePath>)> {
        let (session, first) = Self::open(first)?;
        let mut paths = vec![first];
        for other in others {
            let path = parse_drive_path(other)?;
            if path.drive != session.drive.name {
                return Err(Error::InvalidArgument(format!(
                    "All paths must be on drive '{}': {other}",
                    session.drive.name
                )));
            }
            paths.push(path);
        }
        Ok((session, paths))
    }

    /// Repository path of a drive path
    pub(crate) fn repo_path(&self, path: &DrivePath) -> String {
        join_path(&self.drive.root, &path.path)
    }

    pub(crate) fn resolve(&mut self, path: &DrivePath) -> Result<Entity> {
        let repo_path = self.repo_path(path);
        self.connector.resolve(&repo_path)
    }

    /// Drive path of an entity, for display
    pub(crate) fn display_path(&self, entity: &Entity) -> String {
        let inner = strip_prefix_ci(entity.path(), &self.drive.root)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(entity.path());
        join_path(&self.drive.name, inner)
    }
}

/// Summary of an entity shared by listings and mutation results
#[derive(Debug, Clone, Serialize)]
pub(crate) struct EntryInfo {
    pub name: String,
    pub path: String,
    pub kind: EntityKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
}

impl EntryInfo {
    pub(crate) fn new(entity: &Entity, path: String) -> Self {
        let size = entity.as_content().map(|content| content.size());
        Self {
            name: entity.name().to_string(),
            path,
            kind: entity.kind(),
            title: entity.title().to_string(),
            modified: modified(entity),
            size_bytes: size,
            size_human: size.map(format_size),
        }
    }
}

/// Last modification time, for the kinds that track one
pub(crate) fn modified(entity: &Entity) -> Option<Timestamp> {
    match entity {
        Entity::List(list) => Some(list.modified()),
        _ => entity.as_item().map(|item| item.modified()),
    }
}

/// Output of a command that created or changed one object
#[derive(Debug, Serialize)]
pub(crate) struct MutationOutput {
    pub status: &'static str,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub entry: EntryInfo,
}

/// Report a completed mutation in the configured format
pub(crate) fn report_mutation(
    formatter: &Formatter,
    action: &'static str,
    source: Option<String>,
    entry: EntryInfo,
    message: String,
) {
    if formatter.is_json() {
        formatter.json(&MutationOutput {
            status: "success",
            action,
            source,
            entry,
        });
    } else {
        formatter.success(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["sd", "--json", "-q", "ls", "demo/Team"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Ls(_)));
    }

    #[test]
    fn test_parse_new_site() {
        let cli = Cli::try_parse_from([
            "sd",
            "new",
            "site",
            "demo/Team/Wiki",
            "--template",
            "STS#0",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::New(_)));
    }
}
