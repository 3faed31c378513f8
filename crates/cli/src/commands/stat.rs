//! stat command - Show object details
//!
//! Displays the kind, identity, timestamps and properties of any object.

use clap::Args;
use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use sd_core::{Entity, EntityKind, Properties};

use crate::commands::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size, format_timestamp};

/// Show object details
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Drive path (drive[/path])
    pub path: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    name: String,
    path: String,
    kind: EntityKind,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Properties::is_empty")]
    properties: Properties,
}

impl StatOutput {
    fn new(entity: &Entity, path: String) -> Self {
        let mut output = Self {
            name: entity.name().to_string(),
            path,
            kind: entity.kind(),
            title: entity.title().to_string(),
            id: None,
            unique_id: None,
            created: None,
            modified: None,
            deleted: None,
            children: None,
            size_bytes: None,
            size_human: None,
            content_type: entity
                .properties()
                .get_str("ContentType")
                .map(str::to_string),
            properties: entity.properties().clone(),
        };

        match entity {
            Entity::Site(site) => output.id = site.id().map(|id| id.to_string()),
            Entity::Group(_) => {}
            Entity::List(list) => {
                output.id = Some(list.id().to_string());
                output.created = Some(list.created());
                output.modified = Some(list.modified());
                output.deleted = list.deleted();
                output.children = Some(list.item_count());
            }
            Entity::Item(_) | Entity::Folder(_) | Entity::File(_) => {
                if let Some(item) = entity.as_item() {
                    output.id = Some(item.id().to_string());
                    output.unique_id = Some(item.unique_id());
                    output.created = Some(item.created());
                    output.modified = Some(item.modified());
                }
            }
        }
        if let Entity::Folder(folder) = entity {
            output.children = Some(folder.child_count());
        }
        if let Some(content) = entity.as_content() {
            output.size_bytes = Some(content.size());
            output.size_human = Some(format_size(content.size()));
        }
        output
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Name      : {}", self.name),
            format!("Path      : {}", self.path),
            format!("Kind      : {}", self.kind),
        ];
        if self.title != self.name {
            lines.push(format!("Title     : {}", self.title));
        }
        if let Some(id) = &self.id {
            lines.push(format!("ID        : {id}"));
        }
        if let Some(unique_id) = &self.unique_id {
            lines.push(format!("Unique ID : {unique_id}"));
        }
        if let Some(created) = self.created {
            lines.push(format!("Created   : {}", format_timestamp(created)));
        }
        if let Some(modified) = self.modified {
            lines.push(format!("Modified  : {}", format_timestamp(modified)));
        }
        if let Some(deleted) = self.deleted {
            lines.push(format!("Deleted   : {}", format_timestamp(deleted)));
        }
        if let Some(children) = self.children {
            lines.push(format!("Children  : {children}"));
        }
        if let (Some(bytes), Some(human)) = (self.size_bytes, &self.size_human) {
            lines.push(format!("Size      : {human} ({bytes} bytes)"));
        }
        if let Some(content_type) = &self.content_type {
            lines.push(format!("Type      : {content_type}"));
        }
        for (key, value) in self.properties.iter() {
            let value = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            lines.push(format!("  {key} = {value}"));
        }
        lines
    }
}

/// Execute the stat command
pub fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, path) = match Session::open(&args.path) {
        Ok(opened) => opened,
        Err(e) => return fail(&formatter, &e),
    };

    let entity = match session.resolve(&path) {
        Ok(entity) => entity,
        Err(e) => return fail(&formatter, &e),
    };

    let output = StatOutput::new(&entity, session.display_path(&entity));
    if formatter.is_json() {
        formatter.json(&output);
    } else {
        for line in output.lines() {
            formatter.println(&line);
        }
    }
    ExitCode::Success
}
