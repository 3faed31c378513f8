//! Drive management commands
//!
//! Drives are named connections to repositories: where the repository lives
//! and which path inside it the drive starts from.

use clap::Subcommand;
use serde::Serialize;

use sd_core::{CacheConfig, DriveConfig, DriveManager};

use crate::commands::fail;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Drive subcommands for managing repository connections
#[derive(Subcommand, Debug)]
pub enum DriveCommands {
    /// Add or update a drive
    Set(SetArgs),

    /// List all configured drives
    List(ListArgs),

    /// Remove a drive
    Remove(RemoveArgs),
}

/// Arguments for the `drive set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Drive name (e.g., "demo", "intranet")
    pub name: String,

    /// Repository URL: "memory:" for the sample site or "file:///path/site.json"
    pub web_url: String,

    /// Path inside the repository the drive starts from
    #[arg(long, default_value = "")]
    pub root: String,

    /// How long cached objects stay valid without use, in milliseconds
    #[arg(long)]
    pub keep_alive_ms: Option<u64>,
}

/// Arguments for the `drive list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including roots and cache settings
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `drive remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the drive to remove
    pub name: String,
}

/// JSON output for drive list
#[derive(Serialize)]
struct DriveListOutput {
    drives: Vec<DriveInfo>,
}

#[derive(Serialize)]
struct DriveInfo {
    name: String,
    web_url: String,
    root: String,
    backend: String,
    keep_alive_ms: u64,
}

impl From<&DriveConfig> for DriveInfo {
    fn from(drive: &DriveConfig) -> Self {
        Self {
            name: drive.name.clone(),
            web_url: drive.web_url.clone(),
            root: drive.root.clone(),
            backend: drive.backend.clone(),
            keep_alive_ms: drive.keep_alive().as_millis() as u64,
        }
    }
}

/// JSON output for drive set/remove operations
#[derive(Serialize)]
struct DriveOperationOutput {
    success: bool,
    drive: String,
    message: String,
}

/// Execute a drive subcommand
pub fn execute(cmd: DriveCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match DriveManager::new() {
        Ok(manager) => manager,
        Err(e) => return fail(&formatter, &e),
    };

    match cmd {
        DriveCommands::Set(args) => execute_set(args, &manager, &formatter),
        DriveCommands::List(args) => execute_list(args, &manager, &formatter),
        DriveCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn drive_from_args(args: &SetArgs) -> DriveConfig {
    let mut drive = DriveConfig::new(args.name.trim(), args.web_url.trim()).with_root(&args.root);
    drive.cache = args
        .keep_alive_ms
        .map(|keep_alive_ms| CacheConfig { keep_alive_ms });
    drive
}

fn execute_set(args: SetArgs, manager: &DriveManager, formatter: &Formatter) -> ExitCode {
    let drive = drive_from_args(&args);
    let name = drive.name.clone();

    match manager.set(drive) {
        Ok(()) => {
            let message = format!("Drive '{name}' configured successfully");
            if formatter.is_json() {
                formatter.json(&DriveOperationOutput {
                    success: true,
                    drive: name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &e),
    }
}

fn execute_list(args: ListArgs, manager: &DriveManager, formatter: &Formatter) -> ExitCode {
    match manager.list() {
        Ok(drives) => {
            if formatter.is_json() {
                formatter.json(&DriveListOutput {
                    drives: drives.iter().map(DriveInfo::from).collect(),
                });
            } else if drives.is_empty() {
                formatter.println("No drives configured.");
            } else if args.long {
                for drive in &drives {
                    let root = if drive.root.is_empty() { "/" } else { &drive.root };
                    formatter.println(&format!(
                        "{:<12} {} (root: {root}, keep-alive: {}ms)",
                        drive.name,
                        drive.web_url,
                        drive.keep_alive().as_millis()
                    ));
                }
            } else {
                for drive in &drives {
                    formatter.println(&format!("{:<12} {}", drive.name, drive.web_url));
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &e),
    }
}

fn execute_remove(args: RemoveArgs, manager: &DriveManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Drive '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&DriveOperationOutput {
                    success: true,
                    drive: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &e),
    }
}
