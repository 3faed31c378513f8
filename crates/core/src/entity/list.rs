use std::rc::Rc;

use jiff::Timestamp;
use uuid::Uuid;

use super::{
    Container, ContentContainer, EntityKind, Info, ItemContainer, Node, Removable, Site,
};
use crate::path::{child_name, join_path};
use crate::record::{FieldDefinition, ListRecord};

/// Ordered collection of items owned by a site
#[derive(Debug)]
pub struct List {
    info: Info,
    site: Rc<Site>,
    site_relative: String,
    id: Uuid,
    created: Timestamp,
    modified: Timestamp,
    deleted: Option<Timestamp>,
    item_count: u32,
    fields: Option<Vec<FieldDefinition>>,
}

impl List {
    /// Build a list of `site` from its raw record
    pub(crate) fn from_record(site: Rc<Site>, record: ListRecord) -> Self {
        let path = join_path(site.path(), &record.name);
        let title = if record.title.is_empty() {
            child_name(&record.name).to_string()
        } else {
            record.title
        };
        Self {
            info: Info::new(path, title, record.properties),
            site,
            site_relative: record.name,
            id: record.id,
            created: record.created,
            modified: record.modified,
            deleted: record.deleted,
            item_count: record.item_count,
            fields: record.fields,
        }
    }

    pub fn site(&self) -> &Rc<Site> {
        &self.site
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn modified(&self) -> Timestamp {
        self.modified
    }

    /// Time of the last item deletion, if any
    pub fn deleted(&self) -> Option<Timestamp> {
        self.deleted
    }

    /// Number of items the backend reported for the whole list
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Path of this list relative to its site
    pub fn site_relative_path(&self) -> &str {
        &self.site_relative
    }

    pub fn fields(&self) -> Option<&[FieldDefinition]> {
        self.fields.as_deref()
    }

    /// Name of the container group this list lives in, if any
    pub fn group_name(&self) -> Option<&str> {
        self.site_relative
            .split_once('/')
            .map(|(group, _)| group)
    }
}

impl Node for List {
    fn info(&self) -> &Info {
        &self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::List
    }
}

impl Container for List {}

impl ItemContainer for List {
    fn list(&self) -> &List {
        self
    }

    fn list_relative_path(&self) -> &str {
        ""
    }
}

impl ContentContainer for List {}

impl Removable for List {}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[test]
    fn test_list_paths() {
        let site = fixtures::site("Team");
        let list = fixtures::list(&site, "Lists/Tasks");
        assert_eq!(list.path(), "Team/Lists/Tasks");
        assert_eq!(list.name(), "Tasks");
        assert_eq!(list.title(), "Tasks");
        assert_eq!(list.site_relative_path(), "Lists/Tasks");
        assert_eq!(list.group_name(), Some("Lists"));
    }

    #[test]
    fn test_ungrouped_list() {
        let site = fixtures::site("");
        let list = fixtures::list(&site, "Docs");
        assert_eq!(list.path(), "Docs");
        assert_eq!(list.group_name(), None);
        assert_eq!(list.list_relative_path(), "");
        assert!(list.fields().is_none());
    }
}
