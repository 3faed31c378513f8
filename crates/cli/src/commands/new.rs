//! new command - Create sites, lists and items
//!
//! The last path segment names the new object; everything before it must
//! resolve to a container that accepts objects of that kind.

use clap::Subcommand;

use sd_core::{DrivePath, Entity, ListCreation, Result, SiteCreation};

use crate::commands::{EntryInfo, Session, fail, report_mutation};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Kinds of objects the new command creates
#[derive(Subcommand, Debug)]
pub enum NewCommands {
    /// Create a sub-site
    Site(SiteArgs),

    /// Create a list in a site or a container group
    List(ListArgs),

    /// Create an item carrying only meta-data
    Item(ItemArgs),
}

/// Arguments for the `new site` command
#[derive(clap::Args, Debug)]
pub struct SiteArgs {
    /// Path of the new site (drive[/site]/name)
    pub path: String,

    /// Site template (e.g., "STS#0")
    #[arg(long)]
    pub template: String,

    /// Display title; defaults to the name
    #[arg(long, default_value = "")]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Language identifier (LCID)
    #[arg(long, default_value_t = 0)]
    pub language: u32,

    /// Locale identifier (LCID)
    #[arg(long, default_value_t = 0)]
    pub locale: u32,

    /// Break permission inheritance from the parent site
    #[arg(long)]
    pub unique_permissions: bool,
}

/// Arguments for the `new list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Path of the new list (drive[/site][/group]/name)
    pub path: String,

    /// List template number (e.g., 100 for a custom list, 101 for a document library)
    #[arg(long)]
    pub template: u32,

    #[arg(long, default_value = "")]
    pub description: String,
}

/// Arguments for the `new item` command
#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Path of the new item (drive/list[/folder]/name)
    pub path: String,
}

/// Execute a new subcommand
pub fn execute(cmd: NewCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let raw_path = match &cmd {
        NewCommands::Site(args) => &args.path,
        NewCommands::List(args) => &args.path,
        NewCommands::Item(args) => &args.path,
    };

    let (mut session, path) = match Session::open(raw_path) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    match create(&mut session, &path, &cmd) {
        Ok(entity) => {
            let display = session.display_path(&entity);
            let message = format!("{} created: {display}", capitalize(entity.kind().as_str()));
            report_mutation(
                &formatter,
                "created",
                None,
                EntryInfo::new(&entity, display),
                message,
            );
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &e),
    }
}

fn create(session: &mut Session, path: &DrivePath, cmd: &NewCommands) -> Result<Entity> {
    let parent_path = path
        .parent()
        .unwrap_or_else(|| DrivePath::new(path.drive.clone(), ""));
    let parent = session.resolve(&parent_path)?;
    let name = path.name();

    match cmd {
        NewCommands::Site(args) => {
            let creation = SiteCreation {
                name: name.to_string(),
                title: args.title.clone(),
                description: args.description.clone(),
                template: args.template.clone(),
                language: args.language,
                locale: args.locale,
                unique_permissions: args.unique_permissions.then_some(true),
            };
            session.connector.add_site(&parent, &creation)
        }
        NewCommands::List(args) => {
            let creation = ListCreation {
                name: name.to_string(),
                description: args.description.clone(),
                template: args.template,
            };
            session.connector.add_list(&parent, &creation)
        }
        NewCommands::Item(_) => session.connector.add_item(&parent, name),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
