use std::rc::Rc;

use jiff::Timestamp;
use uuid::Uuid;

use super::{
    Container, ContentBearing, ContentContainer, EntityKind, Info, ItemContainer, List,
    Manipulable, Node, Removable,
};
use crate::path::{child_name, join_path};
use crate::record::ItemRecord;

/// Entry of a list carrying meta-data only
#[derive(Debug)]
pub struct Item {
    info: Info,
    list: Rc<List>,
    list_relative: String,
    id: i64,
    unique_id: Uuid,
    created: Timestamp,
    modified: Timestamp,
}

impl Item {
    pub(crate) fn from_record(list: Rc<List>, list_relative: &str, record: ItemRecord) -> Self {
        let path = join_path(list.path(), list_relative);
        let title = if record.title.is_empty() {
            child_name(list_relative).to_string()
        } else {
            record.title
        };
        Self {
            info: Info::new(path, title, record.properties),
            list,
            list_relative: list_relative.to_string(),
            id: record.id,
            unique_id: record.unique_id,
            created: record.created,
            modified: record.modified,
        }
    }

    pub fn list(&self) -> &Rc<List> {
        &self.list
    }

    /// Integer identifier; may change when the item moves to another list
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn modified(&self) -> Timestamp {
        self.modified
    }

    /// Path of the item below its list
    pub fn list_relative_path(&self) -> &str {
        &self.list_relative
    }

    /// Path of the item below its site
    pub fn site_relative_path(&self) -> String {
        join_path(self.list.site_relative_path(), &self.list_relative)
    }

    /// Path of the folder holding this item, relative to the list
    pub fn folder_path(&self) -> &str {
        crate::path::parent_path(&self.list_relative)
    }
}

impl Node for Item {
    fn info(&self) -> &Info {
        &self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Item
    }
}

impl Removable for Item {}

impl Manipulable for Item {
    fn item(&self) -> &Item {
        self
    }
}

/// Item that contains further items
#[derive(Debug)]
pub struct Folder {
    item: Item,
    child_count: u32,
}

impl Folder {
    pub(crate) fn new(item: Item, child_count: u32) -> Self {
        Self { item, child_count }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Number of direct children reported by the backend
    pub fn child_count(&self) -> u32 {
        self.child_count
    }
}

impl Node for Folder {
    fn info(&self) -> &Info {
        &self.item.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Folder
    }
}

impl Removable for Folder {}

impl Manipulable for Folder {
    fn item(&self) -> &Item {
        &self.item
    }
}

impl Container for Folder {}

impl ItemContainer for Folder {
    fn list(&self) -> &List {
        &self.item.list
    }

    fn list_relative_path(&self) -> &str {
        &self.item.list_relative
    }
}

impl ContentContainer for Folder {}

/// Item with binary content
#[derive(Debug)]
pub struct File {
    item: Item,
    size: u64,
}

impl File {
    pub(crate) fn new(item: Item, size: u64) -> Self {
        Self { item, size }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

impl Node for File {
    fn info(&self) -> &Info {
        &self.item.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::File
    }
}

impl Removable for File {}

impl Manipulable for File {
    fn item(&self) -> &Item {
        &self.item
    }
}

impl ContentBearing for File {
    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Entity, fixtures};
    use super::*;
    use crate::record::ItemType;

    #[test]
    fn test_folder_is_item_container() {
        let site = fixtures::site("Team");
        let list = fixtures::list(&site, "Docs");
        let Entity::Folder(folder) = fixtures::item(&list, "A/B", ItemType::Folder) else {
            panic!("expected a folder");
        };
        assert_eq!(folder.path(), "Team/Docs/A/B");
        assert_eq!(folder.list_relative_path(), "A/B");
        assert_eq!(folder.item().folder_path(), "A");
        assert_eq!(ItemContainer::list(folder.as_ref()).path(), "Team/Docs");
    }

    #[test]
    fn test_file_size() {
        let site = fixtures::site("");
        let list = fixtures::list(&site, "Docs");
        let mut record = fixtures::item_record("a.txt", ItemType::File);
        record.size = 42;
        let entity = Entity::from_item_record(list, "a.txt", record);
        assert_eq!(entity.as_content().map(|file| file.size()), Some(42));
        assert_eq!(entity.path(), "Docs/a.txt");
    }
}
