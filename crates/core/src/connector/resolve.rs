//! Path resolution and enumeration

use std::rc::Rc;

use tracing::{debug, trace};

use super::Connector;
use crate::backend::Backend;
use crate::cache::ChildSlot;
use crate::entity::{ContainerGroup, Entity, ItemContainer, List, ListContainer, Node, Site};
use crate::error::{Error, Result};
use crate::path::{
    WILDCARD, eq_ci, join_path, normalize_path, parent_path, split_path,
    strip_prefix_ci,
};

impl<B: Backend> Connector<B> {
    /// Resolve a path relative to the web URL of the drive
    ///
    /// The path must lie at or below the anchor root.
    pub fn resolve(&mut self, path: &str) -> Result<Entity> {
        let path = normalize_path(path);
        if let Some(entity) = self.cache.get(&path) {
            return Ok(entity);
        }

        let root = self.root()?;
        if eq_ci(&path, root.path()) {
            return Ok(root);
        }
        let rest = if root.path().is_empty() {
            path.as_str()
        } else {
            strip_prefix_ci(&path, root.path())
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(|| Error::ObjectNotFound(path.clone()))?
        };
        self.walk(root, rest)
    }

    /// Whether an object exists at `path`, answering `*` segments cheaply
    ///
    /// The first wildcard segment stops the walk; the answer is then whether
    /// the container resolved so far has any children.
    pub fn has_object(&mut self, path: &str) -> Result<bool> {
        let path = normalize_path(path);
        let segments = split_path(&path);
        let Some(position) = segments.iter().position(|segment| *segment == WILDCARD) else {
            return self.exists(&path);
        };

        let prefix = segments[..position].join("/");
        match self.resolve(&prefix) {
            Ok(container) => self.has_children(&container),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Anchor root, resolved once and kept across cache expiry
    pub fn root(&mut self) -> Result<Entity> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let top = self.top_site()?;
        let root = if self.root_path.is_empty() {
            top
        } else {
            let root_path = self.root_path.clone();
            self.walk(top, &root_path)?
        };
        debug!(root = root.path(), kind = %root.kind(), "Anchor root resolved");
        self.root = Some(root.clone());
        Ok(root)
    }

    fn top_site(&mut self) -> Result<Entity> {
        if let Some(site) = self.cache.get("") {
            return Ok(site);
        }
        debug!("Querying the top site");
        let record = self.backend.query_site("")?;
        let site = Entity::Site(Rc::new(Site::from_record("", record)));
        self.cache.put(site.clone());
        Ok(site)
    }

    /// Consume the segments of `rest` starting below `start`
    fn walk(&mut self, start: Entity, rest: &str) -> Result<Entity> {
        let segments = split_path(rest);
        let mut current = start;
        let mut index = 0;
        while index < segments.len() {
            let segment = segments[index];
            current = match &current {
                Entity::Site(site) => match self.child_site(site, segment)? {
                    Some(child) => child,
                    None => self.list_or_group(site, segment)?,
                },
                Entity::Group(group) => self.group_list(group, segment)?,
                Entity::List(list) => {
                    let list = list.clone();
                    return self.item(&list, &segments[index..].join("/"));
                }
                Entity::Folder(folder) => {
                    let list = folder.item().list().clone();
                    let below = join_path(folder.list_relative_path(), &segments[index..].join("/"));
                    return self.item(&list, &below);
                }
                Entity::Item(_) | Entity::File(_) => {
                    return Err(Error::ObjectNotFound(join_path(
                        current.path(),
                        &segments[index..].join("/"),
                    )));
                }
            };
            index += 1;
        }
        Ok(current)
    }

    /// Sub-site of `site` named `segment`, or `None` if there is none
    fn child_site(&mut self, site: &Rc<Site>, segment: &str) -> Result<Option<Entity>> {
        let path = join_path(site.path(), segment);
        if let Some(entity) = self.cache.get(&path) {
            return Ok(matches!(entity, Entity::Site(_)).then_some(entity));
        }
        if let Some(sites) = self.cache.children(site.path(), ChildSlot::Sites) {
            return Ok(sites.into_iter().find(|child| eq_ci(child.name(), segment)));
        }

        debug!(path = %path, "Querying site");
        let record = match self.backend.query_site(&path) {
            Ok(record) => record,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        let child_path = join_path(site.path(), &record.name);
        let child = Entity::Site(Rc::new(Site::from_record(&child_path, record)));
        self.cache.put(child.clone());
        Ok(Some(child))
    }

    /// Inferred container group or list of `site` named `segment`
    ///
    /// A group shadows an ungrouped list of the same name.
    fn list_or_group(&mut self, site: &Rc<Site>, segment: &str) -> Result<Entity> {
        let lists = self.all_lists(site)?;
        if let Some(name) = lists
            .iter()
            .filter_map(|list| list.group_name())
            .find(|group| eq_ci(group, segment))
        {
            return Ok(self.group(site, name));
        }

        lists
            .iter()
            .find(|list| eq_ci(list.site_relative_path(), segment))
            .map(|list| Entity::List(list.clone()))
            .ok_or_else(|| Error::ObjectNotFound(join_path(site.path(), segment)))
    }

    fn group(&mut self, site: &Rc<Site>, name: &str) -> Entity {
        let path = join_path(site.path(), name);
        if let Some(group @ Entity::Group(_)) = self.cache.get(&path) {
            return group;
        }
        let group = Entity::Group(Rc::new(ContainerGroup::new(site.clone(), name)));
        self.cache.put(group.clone());
        group
    }

    /// List of a container group named `segment`
    fn group_list(&mut self, group: &Rc<ContainerGroup>, segment: &str) -> Result<Entity> {
        let relative = join_path(group.site_relative_path(), segment);
        self.all_lists(group.site())?
            .into_iter()
            .find(|list| eq_ci(list.site_relative_path(), &relative))
            .map(Entity::List)
            .ok_or_else(|| Error::ObjectNotFound(join_path(group.path(), segment)))
    }

    /// Every list of `site`, grouped or not
    fn all_lists(&mut self, site: &Rc<Site>) -> Result<Vec<Rc<List>>> {
        if let Some(lists) = self.cache.children(site.path(), ChildSlot::Lists) {
            return Ok(lists
                .into_iter()
                .filter_map(|entity| match entity {
                    Entity::List(list) => Some(list),
                    _ => None,
                })
                .collect());
        }

        debug!(site = site.path(), "Querying lists");
        let records = self.backend.query_lists(site)?;
        let mut lists = Vec::with_capacity(records.len());
        for record in records {
            if let Some(site_id) = record.site_id
                && site.learn_id(site_id)
            {
                trace!(site = site.path(), %site_id, "Site identifier learnt from a list");
            }
            let list = Rc::new(List::from_record(site.clone(), record));
            self.cache.put(Entity::List(list.clone()));
            lists.push(list);
        }
        self.cache.set_children(
            site.path(),
            ChildSlot::Lists,
            lists.iter().cloned().map(Entity::List).collect(),
        );
        Ok(lists)
    }

    /// Item at `relative` below `list`, resolved by the backend in one query
    fn item(&mut self, list: &Rc<List>, relative: &str) -> Result<Entity> {
        let path = join_path(list.path(), relative);
        if let Some(entity) = self.cache.get(&path) {
            return Ok(entity);
        }

        debug!(path = %path, "Querying item");
        let record = self.backend.query_item(list, relative)?;
        let folder = match &record.folder {
            Some(folder) => folder.clone(),
            None => parent_path(relative).to_string(),
        };
        let relative = join_path(&folder, &record.name);
        let item = Entity::from_item_record(list.clone(), &relative, record);
        self.cache.put(item.clone());
        Ok(item)
    }

    /// Children of a container: sites, lists and groups for a site, items otherwise
    pub fn children(&mut self, container: &Entity) -> Result<Vec<Entity>> {
        container.require_container()?;
        match container {
            Entity::Site(_) => {
                let mut children = self.sites(container)?;
                children.extend(self.lists(container)?);
                children.extend(self.groups(container)?);
                Ok(children)
            }
            Entity::Group(_) => self.lists(container),
            _ => self.items(container),
        }
    }

    /// Whether a container has any children
    pub fn has_children(&mut self, container: &Entity) -> Result<bool> {
        match container {
            Entity::Site(site) => {
                Ok(!self.sites(container)?.is_empty() || !self.all_lists(site)?.is_empty())
            }
            Entity::Group(_) => Ok(!self.lists(container)?.is_empty()),
            Entity::List(list) => Ok(match self.cache.children(list.path(), ChildSlot::Items) {
                Some(items) => !items.is_empty(),
                None => list.item_count() > 0,
            }),
            Entity::Folder(folder) => {
                Ok(match self.cache.children(folder.path(), ChildSlot::Items) {
                    Some(items) => !items.is_empty(),
                    None => folder.child_count() > 0,
                })
            }
            Entity::Item(_) | Entity::File(_) => Ok(false),
        }
    }

    /// Sub-sites of a site
    pub fn sites(&mut self, site: &Entity) -> Result<Vec<Entity>> {
        let Entity::Site(site) = site else {
            return Err(Error::UnsupportedOperation(format!(
                "A {} has no sub-sites: {}",
                site.kind(),
                site.path()
            )));
        };
        if let Some(sites) = self.cache.children(site.path(), ChildSlot::Sites) {
            return Ok(sites);
        }

        debug!(site = site.path(), "Querying sub-sites");
        let records = self.backend.query_sites(site)?;
        let sites: Vec<Entity> = records
            .into_iter()
            .map(|record| {
                let path = join_path(site.path(), &record.name);
                Entity::Site(Rc::new(Site::from_record(&path, record)))
            })
            .collect();
        for child in &sites {
            self.cache.put(child.clone());
        }
        self.cache
            .set_children(site.path(), ChildSlot::Sites, sites.clone());
        Ok(sites)
    }

    /// Container groups inferred from the lists of a site
    pub fn groups(&mut self, site: &Entity) -> Result<Vec<Entity>> {
        let Entity::Site(site) = site else {
            return Err(Error::UnsupportedOperation(format!(
                "A {} has no container groups: {}",
                site.kind(),
                site.path()
            )));
        };
        let lists = self.all_lists(site)?;
        let mut names: Vec<&str> = Vec::new();
        for name in lists.iter().filter_map(|list| list.group_name()) {
            if !names.iter().any(|known| eq_ci(known, name)) {
                names.push(name);
            }
        }
        Ok(names
            .into_iter()
            .map(|name| self.group(site, name))
            .collect())
    }

    /// Lists placed directly in a site or in a container group
    pub fn lists(&mut self, container: &Entity) -> Result<Vec<Entity>> {
        let Some(list_container) = container.as_list_container() else {
            return Err(Error::UnsupportedOperation(format!(
                "A {} cannot contain lists: {}",
                container.kind(),
                container.path()
            )));
        };
        let prefix = list_container.site_relative_path().to_string();
        let site = container.site();
        Ok(self
            .all_lists(&site)?
            .into_iter()
            .filter(|list| eq_ci(parent_path(list.site_relative_path()), &prefix))
            .map(Entity::List)
            .collect())
    }

    /// Items directly inside a list or a folder
    pub fn items(&mut self, container: &Entity) -> Result<Vec<Entity>> {
        let folder = container
            .require_item_container()?
            .list_relative_path()
            .to_string();
        let Some(list) = container.list() else {
            return Err(Error::UnsupportedOperation(format!(
                "A {} cannot contain items: {}",
                container.kind(),
                container.path()
            )));
        };
        if let Some(items) = self.cache.children(container.path(), ChildSlot::Items) {
            return Ok(items);
        }

        debug!(container = container.path(), "Querying items");
        let records = self.backend.query_items(&list, &folder)?;
        let items: Vec<Entity> = records
            .into_iter()
            .map(|record| {
                let relative = join_path(&folder, &record.name);
                Entity::from_item_record(list.clone(), &relative, record)
            })
            .collect();
        for item in &items {
            self.cache.put(item.clone());
        }
        self.cache
            .set_children(container.path(), ChildSlot::Items, items.clone());
        Ok(items)
    }
}

