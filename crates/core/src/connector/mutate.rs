//! Mutations and the cache reconciliation following them
//!
//! Every mutation validates its arguments, calls the backend and only then
//! touches the cache, so a failed call leaves the cache as it was.

use std::rc::Rc;

use tracing::{debug, info};

use super::Connector;
use crate::backend::Backend;
use crate::cache::ChildSlot;
use crate::entity::{
    Entity, EntityKind, List, Node, Site, check_can_be_child, check_kind_can_be_child,
};
use crate::error::{Error, Result};
use crate::path::{eq_ci, is_within_ci, join_path, parent_path};
use crate::record::{CopyOptions, ItemRecord, ItemType, ListCreation, SiteCreation};

/// Fail unless `name` can name a new or renamed object
fn check_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("The {what} must not be empty")));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidArgument(format!(
            "The {what} must not contain a path separator: {name}"
        )));
    }
    Ok(())
}

/// Cache slot of the parent collection an entity is listed in
fn parent_slot(entity: &Entity) -> (String, ChildSlot) {
    match entity {
        Entity::Site(site) => (parent_path(site.path()).to_string(), ChildSlot::Sites),
        Entity::Group(group) => (group.site().path().to_string(), ChildSlot::Lists),
        Entity::List(list) => (list.site().path().to_string(), ChildSlot::Lists),
        _ => (parent_path(entity.path()).to_string(), ChildSlot::Items),
    }
}

impl<B: Backend> Connector<B> {
    /// Create a sub-site
    pub fn add_site(&mut self, parent: &Entity, creation: &SiteCreation) -> Result<Entity> {
        creation.check()?;
        check_kind_can_be_child(parent, EntityKind::Site)?;
        let Entity::Site(site) = parent else {
            return Err(Error::InvalidHierarchy(format!(
                "A {} cannot contain sites: {}",
                parent.kind(),
                parent.path()
            )));
        };

        let record = self.backend.add_site(site, creation)?;
        let path = join_path(site.path(), &record.name);
        let child = Entity::Site(Rc::new(Site::from_record(&path, record)));
        info!(path = child.path(), "Site created");

        self.cache.put(child.clone());
        self.cache
            .append_child(site.path(), ChildSlot::Sites, child.clone());
        Ok(child)
    }

    /// Create a list in a site or a container group
    ///
    /// In a group the list name is prefixed with the group name.
    pub fn add_list(&mut self, parent: &Entity, creation: &ListCreation) -> Result<Entity> {
        creation.check()?;
        check_kind_can_be_child(parent, EntityKind::List)?;
        let prefix = match parent.as_list_container() {
            Some(container) => container.site_relative_path().to_string(),
            None => {
                return Err(Error::InvalidHierarchy(format!(
                    "A {} cannot contain lists: {}",
                    parent.kind(),
                    parent.path()
                )));
            }
        };
        let site = parent.site();
        let creation = ListCreation {
            name: join_path(&prefix, creation.name.trim()),
            ..creation.clone()
        };

        let record = self.backend.add_list(&site, &creation)?;
        let list = Entity::List(Rc::new(List::from_record(site.clone(), record)));
        info!(path = list.path(), "List created");

        self.cache.put(list.clone());
        self.cache
            .append_child(site.path(), ChildSlot::Lists, list.clone());
        Ok(list)
    }

    /// Create a folder in a list or a folder
    pub fn add_folder(&mut self, parent: &Entity, name: &str) -> Result<Entity> {
        self.add_item_of(parent, name, ItemType::Folder)
    }

    /// Create an item carrying no content in a list or a folder
    pub fn add_item(&mut self, parent: &Entity, name: &str) -> Result<Entity> {
        self.add_item_of(parent, name, ItemType::Common)
    }

    fn add_item_of(&mut self, parent: &Entity, name: &str, item_type: ItemType) -> Result<Entity> {
        let kind = match item_type {
            ItemType::Common => EntityKind::Item,
            ItemType::Folder => EntityKind::Folder,
            ItemType::File => EntityKind::File,
        };
        check_name(name, "item name")?;
        check_kind_can_be_child(parent, kind)?;
        let (list, folder) = self.item_target(parent)?;

        let record = self
            .backend
            .add_item(&list, &folder, name.trim(), item_type)?;
        let item = self.adopt_item(parent, &list, &folder, record);
        info!(path = item.path(), kind = %item.kind(), "Item created");
        Ok(item)
    }

    /// Create a file in a list or a folder
    pub fn add_file(&mut self, parent: &Entity, name: &str, content: &[u8]) -> Result<Entity> {
        check_name(name, "file name")?;
        check_kind_can_be_child(parent, EntityKind::File)?;
        parent.require_content_container()?;
        let (list, folder) = self.item_target(parent)?;

        let record = self
            .backend
            .add_file(&list, &folder, name.trim(), content)?;
        let file = self.adopt_item(parent, &list, &folder, record);
        info!(path = file.path(), size = content.len(), "File created");
        Ok(file)
    }

    /// Delete an entity; containers take their content along
    pub fn remove(&mut self, entity: &Entity) -> Result<()> {
        entity.require_removable()?;
        match entity {
            Entity::Site(site) if site.is_root() => {
                return Err(Error::InvalidArgument(
                    "The top site of a drive cannot be removed".into(),
                ));
            }
            Entity::Site(site) => self.backend.remove_site(site)?,
            Entity::List(list) => self.backend.remove_list(list)?,
            _ => {
                let item = entity.require_manipulable()?.item();
                self.backend.remove_item(item)?;
            }
        }
        info!(path = entity.path(), kind = %entity.kind(), "Removed");

        self.cache.remove(entity);
        let (parent, slot) = parent_slot(entity);
        self.cache.remove_child(&parent, slot, entity.path());
        if let Some(list) = entity.as_item().map(|item| item.list().clone()) {
            self.forget_counts(&list, &parent);
        }
        if let Entity::List(list) = entity
            && let Some(group) = list.group_name()
        {
            self.cache.evict(&join_path(list.site().path(), group));
        }
        if self
            .root
            .as_ref()
            .is_some_and(|root| is_within_ci(root.path(), entity.path()))
        {
            self.root = None;
        }
        Ok(())
    }

    /// Give an item a new name within its folder
    pub fn rename(&mut self, entity: &Entity, new_name: &str) -> Result<Entity> {
        check_name(new_name, "new name")?;
        let item = entity.require_manipulable()?.item();
        let list = item.list().clone();
        let folder = item.folder_path().to_string();

        let record = self.backend.rename_item(item, new_name.trim())?;
        let relative = join_path(&folder, &record.name);
        let renamed = Entity::from_item_record(list, &relative, record);
        info!(from = entity.path(), to = renamed.path(), "Renamed");

        self.cache.remove(entity);
        let (parent, slot) = parent_slot(entity);
        self.cache.remove_child(&parent, slot, entity.path());
        self.cache.put(renamed.clone());
        self.cache.append_child(&parent, slot, renamed.clone());
        Ok(renamed)
    }

    /// Move an item into a list or a folder
    pub fn move_to(&mut self, entity: &Entity, target: &Entity) -> Result<Entity> {
        let item = entity.require_manipulable()?.item();
        check_can_be_child(target, entity)?;
        self.check_not_into_itself(entity, target)?;
        let (list, folder) = self.item_target(target)?;

        let record = self.backend.move_item(item, &list, &folder)?;
        let relative = join_path(&folder, &record.name);
        let moved = Entity::from_item_record(list.clone(), &relative, record);
        info!(from = entity.path(), to = moved.path(), "Moved");

        self.cache.remove(entity);
        let (parent, slot) = parent_slot(entity);
        self.cache.remove_child(&parent, slot, entity.path());
        self.forget_counts(item.list(), &parent);
        self.cache.put(moved.clone());
        self.cache
            .append_child(target.path(), ChildSlot::Items, moved.clone());
        self.forget_counts(&list, target.path());
        Ok(moved)
    }

    /// Copy an item into a list or a folder
    pub fn copy_to(
        &mut self,
        entity: &Entity,
        target: &Entity,
        options: &CopyOptions,
    ) -> Result<Entity> {
        let item = entity.require_manipulable()?.item();
        if let Some(name) = &options.new_name {
            check_name(name, "name of the copy")?;
        }
        check_can_be_child(target, entity)?;
        self.check_not_into_itself(entity, target)?;
        let (list, folder) = self.item_target(target)?;

        let record = self.backend.copy_item(item, &list, &folder, options)?;
        let copy = self.adopt_item(target, &list, &folder, record);
        info!(from = entity.path(), to = copy.path(), "Copied");
        Ok(copy)
    }

    /// Read the content of a file; the latest version when `version` is `None`
    pub fn open_file(&mut self, entity: &Entity, version: Option<u32>) -> Result<Vec<u8>> {
        let file = entity.require_file()?;
        debug!(path = file.path(), ?version, "Opening file");
        self.backend.open_file(file, version)
    }

    /// Store new content of a file as its latest version
    pub fn save_file(&mut self, entity: &Entity, content: &[u8]) -> Result<Entity> {
        let file = entity.require_file()?;
        let item = file.item();

        let record = self.backend.save_file(file, content)?;
        let saved = Entity::from_item_record(item.list().clone(), item.list_relative_path(), record);
        info!(path = saved.path(), size = content.len(), "File saved");

        self.cache.put(saved.clone());
        let (parent, slot) = parent_slot(&saved);
        self.cache.replace_child(&parent, slot, saved.clone());
        Ok(saved)
    }

    /// List and folder path an item container adds items to
    fn item_target(&self, container: &Entity) -> Result<(Rc<List>, String)> {
        let folder = container
            .require_item_container()?
            .list_relative_path()
            .to_string();
        let list = container.list().ok_or_else(|| {
            Error::UnsupportedOperation(format!(
                "A {} cannot contain items: {}",
                container.kind(),
                container.path()
            ))
        })?;
        Ok((list, folder))
    }

    /// Turn a record of a new item into an entity and list it in its parent
    fn adopt_item(
        &mut self,
        parent: &Entity,
        list: &Rc<List>,
        folder: &str,
        record: ItemRecord,
    ) -> Entity {
        let relative = join_path(folder, &record.name);
        let item = Entity::from_item_record(list.clone(), &relative, record);
        self.cache.put(item.clone());
        self.cache
            .append_child(parent.path(), ChildSlot::Items, item.clone());
        self.forget_counts(list, parent.path());
        item
    }

    /// Forget the item counts a change below `container` made stale
    ///
    /// A container whose items were never enumerated answers emptiness from
    /// the count the backend reported. A list counts every item it holds, a
    /// folder only its direct children.
    fn forget_counts(&mut self, list: &List, container: &str) {
        if !self.cache.knows_children(container, ChildSlot::Items) {
            self.forget_entity(container);
        }
        if !self.cache.knows_children(list.path(), ChildSlot::Items) {
            self.forget_entity(list.path());
            self.cache
                .forget_children(list.site().path(), ChildSlot::Lists);
        }
    }

    fn forget_entity(&mut self, path: &str) {
        debug!(path, "Forgetting stale item count");
        self.cache.evict(path);
        if self.root.as_ref().is_some_and(|root| eq_ci(root.path(), path)) {
            self.root = None;
        }
    }

    fn check_not_into_itself(&self, entity: &Entity, target: &Entity) -> Result<()> {
        if entity.kind().is_container() && is_within_ci(target.path(), entity.path()) {
            return Err(Error::InvalidHierarchy(format!(
                "Cannot place {} inside itself: {}",
                entity.path(),
                target.path()
            )));
        }
        Ok(())
    }
}
