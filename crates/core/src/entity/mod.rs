//! Entity model
//!
//! Entities are immutable snapshots of repository objects built by the connector
//! right after a successful backend call. What an entity can do is expressed by
//! small capability traits which the concrete kinds implement selectively;
//! [`Entity`] hands them out as `Option<&dyn ...>` so a caller asking for a
//! missing capability gets an explicit answer instead of a failed cast.

mod item;
mod list;
mod site;

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

pub use item::{File, Folder, Item};
pub use list::List;
pub use site::{ContainerGroup, Site};

use crate::error::{Error, Result};
use crate::path::child_name;
use crate::record::Properties;

/// Concrete kind of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Site,
    Group,
    List,
    Item,
    Folder,
    File,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Site => "site",
            EntityKind::Group => "group",
            EntityKind::List => "list",
            EntityKind::Item => "item",
            EntityKind::Folder => "folder",
            EntityKind::File => "file",
        }
    }

    /// Kinds that may appear as children of this kind
    pub const fn child_kinds(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Site => &[EntityKind::Site, EntityKind::List, EntityKind::Group],
            EntityKind::Group => &[EntityKind::List],
            EntityKind::List | EntityKind::Folder => {
                &[EntityKind::Item, EntityKind::Folder, EntityKind::File]
            }
            EntityKind::Item | EntityKind::File => &[],
        }
    }

    pub const fn is_container(self) -> bool {
        !self.child_kinds().is_empty()
    }

    pub const fn is_item(self) -> bool {
        matches!(
            self,
            EntityKind::Item | EntityKind::Folder | EntityKind::File
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data shared by every entity: path, display title and property bag
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    path: String,
    title: String,
    properties: Properties,
}

impl Info {
    pub(crate) fn new(path: String, title: String, properties: Properties) -> Self {
        Self {
            path,
            title,
            properties,
        }
    }

    /// Path relative to the web URL of the drive
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path
    pub fn name(&self) -> &str {
        child_name(&self.path)
    }

    /// Display label; may differ from the name
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Common read access to every entity
pub trait Node: fmt::Debug {
    fn info(&self) -> &Info;

    fn kind(&self) -> EntityKind;

    fn path(&self) -> &str {
        self.info().path()
    }

    fn name(&self) -> &str {
        self.info().name()
    }

    fn title(&self) -> &str {
        self.info().title()
    }

    fn properties(&self) -> &Properties {
        self.info().properties()
    }
}

/// Entities that can be deleted
pub trait Removable: Node {}

/// Entities that can also be renamed, moved and copied
pub trait Manipulable: Removable {
    fn item(&self) -> &Item;
}

/// Entities that carry binary content
pub trait ContentBearing: Node {
    /// Byte length of the latest content
    fn size(&self) -> u64;
}

/// Entities that contain children of specific kinds
pub trait Container: Node {
    /// Fail with `InvalidHierarchy` unless `kind` may be a child of this container
    fn check_can_be_child(&self, kind: EntityKind) -> Result<()> {
        if self.kind().child_kinds().contains(&kind) {
            Ok(())
        } else {
            Err(Error::InvalidHierarchy(format!(
                "A {} cannot contain a {kind}: {}",
                self.kind(),
                self.path()
            )))
        }
    }
}

/// Containers whose children are lists: sites and container groups
pub trait ListContainer: Container {
    /// Site the lists of this container belong to
    fn site(&self) -> &Site;

    /// Path of this container relative to its site
    fn site_relative_path(&self) -> &str;
}

/// Containers whose children are items: lists and folders
pub trait ItemContainer: Container {
    /// List the items of this container belong to
    fn list(&self) -> &List;

    /// Path of this container relative to its list
    fn list_relative_path(&self) -> &str;
}

/// Item containers that accept files
pub trait ContentContainer: ItemContainer {}

/// Any entity produced by the connector
#[derive(Debug, Clone)]
pub enum Entity {
    Site(Rc<Site>),
    Group(Rc<ContainerGroup>),
    List(Rc<List>),
    Item(Rc<Item>),
    Folder(Rc<Folder>),
    File(Rc<File>),
}

impl Entity {
    pub fn node(&self) -> &dyn Node {
        match self {
            Entity::Site(site) => site.as_ref(),
            Entity::Group(group) => group.as_ref(),
            Entity::List(list) => list.as_ref(),
            Entity::Item(item) => item.as_ref(),
            Entity::Folder(folder) => folder.as_ref(),
            Entity::File(file) => file.as_ref(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.node().kind()
    }

    pub fn path(&self) -> &str {
        self.node().path()
    }

    pub fn name(&self) -> &str {
        self.node().name()
    }

    pub fn title(&self) -> &str {
        self.node().title()
    }

    pub fn properties(&self) -> &Properties {
        self.node().properties()
    }

    pub fn as_container(&self) -> Option<&dyn Container> {
        match self {
            Entity::Site(site) => Some(site.as_ref()),
            Entity::Group(group) => Some(group.as_ref()),
            Entity::List(list) => Some(list.as_ref()),
            Entity::Folder(folder) => Some(folder.as_ref()),
            Entity::Item(_) | Entity::File(_) => None,
        }
    }

    pub fn as_list_container(&self) -> Option<&dyn ListContainer> {
        match self {
            Entity::Site(site) => Some(site.as_ref()),
            Entity::Group(group) => Some(group.as_ref()),
            _ => None,
        }
    }

    pub fn as_item_container(&self) -> Option<&dyn ItemContainer> {
        match self {
            Entity::List(list) => Some(list.as_ref()),
            Entity::Folder(folder) => Some(folder.as_ref()),
            _ => None,
        }
    }

    pub fn as_content_container(&self) -> Option<&dyn ContentContainer> {
        match self {
            Entity::List(list) => Some(list.as_ref()),
            Entity::Folder(folder) => Some(folder.as_ref()),
            _ => None,
        }
    }

    pub fn as_removable(&self) -> Option<&dyn Removable> {
        match self {
            Entity::Site(site) => Some(site.as_ref()),
            Entity::List(list) => Some(list.as_ref()),
            Entity::Item(item) => Some(item.as_ref()),
            Entity::Folder(folder) => Some(folder.as_ref()),
            Entity::File(file) => Some(file.as_ref()),
            Entity::Group(_) => None,
        }
    }

    pub fn as_manipulable(&self) -> Option<&dyn Manipulable> {
        match self {
            Entity::Item(item) => Some(item.as_ref()),
            Entity::Folder(folder) => Some(folder.as_ref()),
            Entity::File(file) => Some(file.as_ref()),
            _ => None,
        }
    }

    pub fn as_content(&self) -> Option<&dyn ContentBearing> {
        match self {
            Entity::File(file) => Some(file.as_ref()),
            _ => None,
        }
    }

    /// Base item data of items, folders and files
    pub fn as_item(&self) -> Option<&Item> {
        self.as_manipulable().map(|manipulable| manipulable.item())
    }

    /// Site owning this entity (the site itself for sites)
    pub fn site(&self) -> Rc<Site> {
        match self {
            Entity::Site(site) => site.clone(),
            Entity::Group(group) => group.site().clone(),
            Entity::List(list) => list.site().clone(),
            Entity::Item(item) => item.list().site().clone(),
            Entity::Folder(folder) => folder.item().list().site().clone(),
            Entity::File(file) => file.item().list().site().clone(),
        }
    }

    /// List owning this entity (the list itself for lists)
    pub fn list(&self) -> Option<Rc<List>> {
        match self {
            Entity::Site(_) | Entity::Group(_) => None,
            Entity::List(list) => Some(list.clone()),
            Entity::Item(item) => Some(item.list().clone()),
            Entity::Folder(folder) => Some(folder.item().list().clone()),
            Entity::File(file) => Some(file.item().list().clone()),
        }
    }

    pub fn require_container(&self) -> Result<&dyn Container> {
        self.as_container()
            .ok_or_else(|| self.unsupported("contain children"))
    }

    pub fn require_item_container(&self) -> Result<&dyn ItemContainer> {
        self.as_item_container()
            .ok_or_else(|| self.unsupported("contain items"))
    }

    pub fn require_content_container(&self) -> Result<&dyn ContentContainer> {
        self.as_content_container()
            .ok_or_else(|| self.unsupported("contain files"))
    }

    pub fn require_removable(&self) -> Result<&dyn Removable> {
        self.as_removable().ok_or_else(|| self.unsupported("be removed"))
    }

    pub fn require_manipulable(&self) -> Result<&dyn Manipulable> {
        self.as_manipulable()
            .ok_or_else(|| self.unsupported("be renamed, moved or copied"))
    }

    pub fn require_file(&self) -> Result<&Rc<File>> {
        match self {
            Entity::File(file) => Ok(file),
            _ => Err(self.unsupported("carry content")),
        }
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::UnsupportedOperation(format!(
            "A {} cannot {what}: {}",
            self.kind(),
            self.path()
        ))
    }

    /// Build the entity matching the concrete kind of an item record
    ///
    /// `list_relative` is the path of the item below its list.
    pub(crate) fn from_item_record(
        list: Rc<List>,
        list_relative: &str,
        record: crate::record::ItemRecord,
    ) -> Self {
        use crate::record::ItemType;

        let item_type = record.item_type;
        let child_count = record.child_count;
        let size = record.size;
        let item = Item::from_record(list, list_relative, record);
        match item_type {
            ItemType::Common => Entity::Item(Rc::new(item)),
            ItemType::Folder => Entity::Folder(Rc::new(Folder::new(item, child_count))),
            ItemType::File => Entity::File(Rc::new(File::new(item, size))),
        }
    }
}

/// Fail with `InvalidHierarchy` unless `child` may become a child of `parent`
pub fn check_can_be_child(parent: &Entity, child: &Entity) -> Result<()> {
    check_kind_can_be_child(parent, child.kind())
}

pub(crate) fn check_kind_can_be_child(parent: &Entity, kind: EntityKind) -> Result<()> {
    match parent.as_container() {
        Some(container) => container.check_can_be_child(kind),
        None => Err(Error::InvalidHierarchy(format!(
            "A {} cannot contain children: {}",
            parent.kind(),
            parent.path()
        ))),
    }
}

impl From<Rc<Site>> for Entity {
    fn from(site: Rc<Site>) -> Self {
        Entity::Site(site)
    }
}

impl From<Rc<ContainerGroup>> for Entity {
    fn from(group: Rc<ContainerGroup>) -> Self {
        Entity::Group(group)
    }
}

impl From<Rc<List>> for Entity {
    fn from(list: Rc<List>) -> Self {
        Entity::List(list)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::rc::Rc;

    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;
    use crate::record::{ItemRecord, ItemType, ListRecord, SiteRecord};

    pub fn site(path: &str) -> Rc<Site> {
        let record = SiteRecord {
            id: Some(Uuid::new_v4()),
            name: child_name(path).to_string(),
            title: child_name(path).to_string(),
            properties: Properties::new(),
        };
        Rc::new(Site::from_record(path, record))
    }

    pub fn list_record(name: &str) -> ListRecord {
        ListRecord {
            id: Uuid::new_v4(),
            site_id: None,
            name: name.to_string(),
            title: child_name(name).to_string(),
            created: Timestamp::UNIX_EPOCH,
            modified: Timestamp::UNIX_EPOCH,
            deleted: None,
            item_count: 0,
            fields: None,
            properties: Properties::new(),
        }
    }

    pub fn list(site: &Rc<Site>, name: &str) -> Rc<List> {
        Rc::new(List::from_record(site.clone(), list_record(name)))
    }

    pub fn item_record(name: &str, item_type: ItemType) -> ItemRecord {
        ItemRecord {
            item_type,
            id: 1,
            unique_id: Uuid::new_v4(),
            name: name.to_string(),
            folder: None,
            title: name.to_string(),
            created: Timestamp::UNIX_EPOCH,
            modified: Timestamp::UNIX_EPOCH,
            child_count: 0,
            size: 0,
            properties: Properties::new(),
        }
    }

    pub fn item(list: &Rc<List>, path: &str, item_type: ItemType) -> Entity {
        let record = item_record(child_name(path), item_type);
        Entity::from_item_record(list.clone(), path, record)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::record::ItemType;

    #[test]
    fn test_child_kinds() {
        assert!(EntityKind::Site.child_kinds().contains(&EntityKind::Group));
        assert_eq!(EntityKind::Group.child_kinds(), &[EntityKind::List]);
        assert!(!EntityKind::Folder.child_kinds().contains(&EntityKind::List));
        assert!(!EntityKind::File.is_container());
        assert!(EntityKind::Folder.is_item());
    }

    #[test]
    fn test_check_can_be_child() {
        let site = site("Team");
        let list = list(&site, "Docs");
        let folder = item(&list, "Reports", ItemType::Folder);
        let file = item(&list, "a.txt", ItemType::File);

        assert!(check_can_be_child(&Entity::Site(site.clone()), &Entity::List(list.clone())).is_ok());
        assert!(check_can_be_child(&folder, &file).is_ok());

        let err = check_can_be_child(&folder, &Entity::List(list.clone())).unwrap_err();
        assert!(matches!(err, Error::InvalidHierarchy(_)));

        let err = check_can_be_child(&Entity::List(list), &Entity::Site(site)).unwrap_err();
        assert!(matches!(err, Error::InvalidHierarchy(_)));

        let err = check_can_be_child(&file, &folder).unwrap_err();
        assert!(matches!(err, Error::InvalidHierarchy(_)));
    }

    #[test]
    fn test_capabilities() {
        let site = site("Team");
        let list = list(&site, "Docs");
        let folder = item(&list, "Reports", ItemType::Folder);
        let file = item(&list, "a.txt", ItemType::File);
        let common = item(&list, "note", ItemType::Common);

        assert!(folder.as_item_container().is_some());
        assert!(folder.as_manipulable().is_some());
        assert!(folder.as_content().is_none());

        assert!(file.as_content().is_some());
        assert!(file.as_container().is_none());

        assert!(common.as_item().is_some());
        assert!(common.require_file().is_err());

        let site = Entity::Site(site);
        assert!(site.as_removable().is_some());
        let err = site.require_manipulable().unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(_)));
    }

    #[test]
    fn test_item_paths() {
        let site = site("Team");
        let list = list(&site, "Docs");
        let nested = item(&list, "Reports/2024/q1.txt", ItemType::File);
        let item = nested.as_item().unwrap();
        assert_eq!(nested.name(), "q1.txt");
        assert_eq!(item.list_relative_path(), "Reports/2024/q1.txt");
        assert_eq!(item.site_relative_path(), "Docs/Reports/2024/q1.txt");
    }
}
