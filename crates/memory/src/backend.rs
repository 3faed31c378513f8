//! In-memory backend implementation
//!
//! Keeps a whole repository tree in memory and implements the backend
//! contract of sd-core on top of it. A tree loaded from a file is written
//! back to that file after every mutation; the bundled sample site lives
//! only as long as the backend.

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use sd_core::path::{child_name, eq_ci, parent_path, split_path};
use sd_core::{
    Backend, CopyOptions, Error, File, Item, ItemRecord, ItemType, List, ListCreation, ListRecord,
    Node, Properties, Result, Site, SiteCreation, SiteRecord,
};

use crate::SAMPLE_SITE;
use crate::snapshot::{ItemNode, ListNode, SiteNode, Version};

/// Repository tree held in memory
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    root: SiteNode,
    location: Option<PathBuf>,
    withhold_site_ids: bool,
}

impl MemoryBackend {
    /// Create a backend over an existing tree that is never persisted
    pub fn new(root: SiteNode) -> Self {
        Self {
            root,
            location: None,
            withhold_site_ids: false,
        }
    }

    /// Create a backend over the bundled sample site
    pub fn sample() -> Result<Self> {
        let root = serde_json::from_str(SAMPLE_SITE)?;
        Ok(Self::new(root))
    }

    /// Load a snapshot file; mutations are written back to it
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!(path = %path.display(), "Loading snapshot");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::BackendUnavailable(format!("Cannot read {}: {e}", path.display()))
        })?;
        let root = serde_json::from_str(&content).map_err(|e| {
            Error::BackendUnavailable(format!("Cannot parse {}: {e}", path.display()))
        })?;
        Ok(Self {
            root,
            location: Some(path),
            withhold_site_ids: false,
        })
    }

    /// Create a backend for a drive URL: `memory:` or `file:`
    pub fn from_url(url: &Url) -> Result<Self> {
        match url.scheme() {
            "memory" => Self::sample(),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::Config(format!("Invalid file URL: {url}")))?;
                Self::open(path)
            }
            scheme => Err(Error::Config(format!(
                "Unsupported URL scheme for the memory backend: {scheme}"
            ))),
        }
    }

    /// Report sites without identifiers and reveal them with their lists instead
    pub fn withhold_site_ids(mut self, withhold: bool) -> Self {
        self.withhold_site_ids = withhold;
        self
    }

    /// The current tree
    pub fn root(&self) -> &SiteNode {
        &self.root
    }

    /// File the tree is persisted to, if any
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Write the tree to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.root)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn persist(&self) {
        let Some(path) = &self.location else {
            return;
        };
        if let Err(e) = self.save_to(path) {
            warn!(path = %path.display(), error = %e, "Failed to persist the snapshot");
        }
    }

    fn site_record(&self, node: &SiteNode) -> SiteRecord {
        SiteRecord {
            id: (!self.withhold_site_ids).then_some(node.id),
            name: node.name.clone(),
            title: node.title.clone(),
            properties: node.properties.clone(),
        }
    }

    fn list_record(&self, site: &SiteNode, node: &ListNode) -> ListRecord {
        ListRecord {
            id: node.id,
            site_id: self.withhold_site_ids.then_some(site.id),
            name: node.name.clone(),
            title: node.title.clone(),
            created: node.created,
            modified: node.modified(),
            deleted: node.deleted,
            item_count: node.item_count() as u32,
            fields: node.fields.clone(),
            properties: node.properties.clone(),
        }
    }

    fn site_node(&self, path: &str) -> Result<&SiteNode> {
        let mut site = &self.root;
        for segment in split_path(path) {
            site = site
                .site(segment)
                .ok_or_else(|| Error::ObjectNotFound(format!("Site not found: {path}")))?;
        }
        Ok(site)
    }

    fn site_node_mut(&mut self, path: &str) -> Result<&mut SiteNode> {
        let mut site = &mut self.root;
        for segment in split_path(path) {
            let current = site;
            site = current
                .sites
                .iter_mut()
                .find(|child| eq_ci(&child.name, segment))
                .ok_or_else(|| Error::ObjectNotFound(format!("Site not found: {path}")))?;
        }
        Ok(site)
    }

    fn list_node(&self, list: &List) -> Result<(&SiteNode, &ListNode)> {
        let site = self.site_node(list.site().path())?;
        let node = site
            .list(list.site_relative_path())
            .ok_or_else(|| Error::ObjectNotFound(format!("List not found: {}", list.path())))?;
        Ok((site, node))
    }

    fn list_node_mut(&mut self, list: &List) -> Result<&mut ListNode> {
        let site = self.site_node_mut(list.site().path())?;
        site.lists
            .iter_mut()
            .find(|node| eq_ci(&node.name, list.site_relative_path()))
            .ok_or_else(|| Error::ObjectNotFound(format!("List not found: {}", list.path())))
    }
}

fn item_node<'a>(list: &'a ListNode, path: &str) -> Result<&'a ItemNode> {
    let mut items = &list.items;
    let mut found = None;
    for segment in split_path(path) {
        let node = items
            .iter()
            .find(|item| eq_ci(&item.name, segment))
            .ok_or_else(|| Error::ObjectNotFound(format!("Item not found: {path}")))?;
        items = &node.children;
        found = Some(node);
    }
    found.ok_or_else(|| Error::ObjectNotFound(format!("Item not found: {path}")))
}

/// Folder path spelled the way its folders are stored
fn stored_folder(list: &ListNode, folder: &str) -> Result<String> {
    let mut names = Vec::new();
    let mut items = &list.items;
    for segment in split_path(folder) {
        let node = items
            .iter()
            .find(|item| eq_ci(&item.name, segment))
            .ok_or_else(|| Error::ObjectNotFound(format!("Folder not found: {folder}")))?;
        names.push(node.name.as_str());
        items = &node.children;
    }
    Ok(names.join("/"))
}

/// Children of the folder at `folder` (the list root when empty)
fn items_mut<'a>(list: &'a mut ListNode, folder: &str) -> Result<&'a mut Vec<ItemNode>> {
    let mut items = &mut list.items;
    for segment in split_path(folder) {
        let current = items;
        let node = current
            .iter_mut()
            .find(|item| eq_ci(&item.name, segment))
            .ok_or_else(|| Error::ObjectNotFound(format!("Folder not found: {folder}")))?;
        if node.item_type != ItemType::Folder {
            return Err(Error::InvalidHierarchy(format!("Not a folder: {folder}")));
        }
        items = &mut node.children;
    }
    Ok(items)
}

fn folder_mut<'a>(list: &'a mut ListNode, folder: &str) -> Result<Option<&'a mut ItemNode>> {
    if split_path(folder).is_empty() {
        return Ok(None);
    }
    let siblings = items_mut(list, parent_path(folder))?;
    Ok(siblings
        .iter_mut()
        .find(|item| eq_ci(&item.name, child_name(folder))))
}

fn item_record(node: &ItemNode) -> ItemRecord {
    ItemRecord {
        item_type: node.item_type,
        id: node.id,
        unique_id: node.unique_id,
        name: node.name.clone(),
        folder: None,
        title: node.title.clone(),
        created: node.created,
        modified: node.effective_modified(),
        child_count: node.children.len() as u32,
        size: node.size(),
        properties: node.properties.clone(),
    }
}

fn check_free(items: &[ItemNode], name: &str) -> Result<()> {
    if items.iter().any(|item| eq_ci(&item.name, name)) {
        return Err(Error::Conflict(format!("Item with the same name found: {name}")));
    }
    Ok(())
}

/// Give a copied tree fresh identity, numbering items after `last_id`
fn reinitialize(node: &mut ItemNode, last_id: &mut i64, now: Timestamp) {
    *last_id += 1;
    node.id = *last_id;
    node.unique_id = Uuid::new_v4();
    node.created = now;
    node.modified = None;
    for child in &mut node.children {
        reinitialize(child, last_id, now);
    }
}

fn rename_node(node: &mut ItemNode, new_name: &str) {
    node.name = new_name.to_string();
    if !node.title.is_empty() {
        node.title = new_name.to_string();
    }
}

impl Backend for MemoryBackend {
    fn query_site(&self, path: &str) -> Result<SiteRecord> {
        let node = self.site_node(path)?;
        Ok(self.site_record(node))
    }

    fn query_sites(&self, site: &Site) -> Result<Vec<SiteRecord>> {
        let node = self.site_node(site.path())?;
        Ok(node
            .sites
            .iter()
            .map(|child| self.site_record(child))
            .collect())
    }

    fn query_lists(&self, site: &Site) -> Result<Vec<ListRecord>> {
        let node = self.site_node(site.path())?;
        Ok(node
            .lists
            .iter()
            .map(|list| self.list_record(node, list))
            .collect())
    }

    fn query_items(&self, list: &List, folder: &str) -> Result<Vec<ItemRecord>> {
        let (_, node) = self.list_node(list)?;
        let items = if split_path(folder).is_empty() {
            &node.items
        } else {
            &item_node(node, folder)?.children
        };
        Ok(items.iter().map(item_record).collect())
    }

    fn query_item(&self, list: &List, path: &str) -> Result<ItemRecord> {
        let (_, node) = self.list_node(list)?;
        let record = item_record(item_node(node, path)?);
        Ok(ItemRecord {
            folder: Some(stored_folder(node, parent_path(path))?),
            ..record
        })
    }

    fn open_file(&self, file: &File, version: Option<u32>) -> Result<Vec<u8>> {
        let item = file.item();
        let (_, list) = self.list_node(item.list())?;
        let node = item_node(list, item.list_relative_path())?;
        let found = match version {
            Some(number) => node
                .versions
                .iter()
                .find(|v| v.number == number)
                .ok_or_else(|| {
                    Error::ObjectNotFound(format!("Version {number} of {}", file.path()))
                })?,
            None => node
                .versions
                .last()
                .ok_or_else(|| Error::ObjectNotFound(format!("No version of {}", file.path())))?,
        };
        Ok(found.content.clone())
    }

    fn add_site(&mut self, parent: &Site, creation: &SiteCreation) -> Result<SiteRecord> {
        let name = creation.effective_name().to_string();
        let target = self.site_node_mut(parent.path())?;
        if target.has_child_named(&name) {
            return Err(Error::Conflict(format!(
                "Site, group or list with the same name found: {name}"
            )));
        }

        let mut properties = Properties::new();
        if creation.language > 0 {
            properties.insert("Language", creation.language);
        }
        if creation.locale > 0 {
            properties.insert("Locale", creation.locale);
        }
        if let Some(unique) = creation.unique_permissions {
            properties.insert("UniquePermissions", unique);
        }
        let title = if creation.title.trim().is_empty() {
            name.clone()
        } else {
            creation.title.trim().to_string()
        };
        let node = SiteNode {
            id: Uuid::new_v4(),
            name,
            title,
            description: creation.description.clone(),
            template: creation.template.clone(),
            created: Timestamp::now(),
            properties,
            sites: Vec::new(),
            lists: Vec::new(),
        };
        target.sites.push(node.clone());
        self.persist();
        Ok(self.site_record(&node))
    }

    fn remove_site(&mut self, site: &Site) -> Result<()> {
        if site.is_root() {
            return Err(Error::InvalidArgument("The top site cannot be removed".into()));
        }
        let parent = self.site_node_mut(parent_path(site.path()))?;
        let position = parent
            .sites
            .iter()
            .position(|node| eq_ci(&node.name, site.name()))
            .ok_or_else(|| Error::ObjectNotFound(format!("Site not found: {}", site.path())))?;
        parent.sites.remove(position);
        self.persist();
        Ok(())
    }

    fn add_list(&mut self, site: &Site, creation: &ListCreation) -> Result<ListRecord> {
        let name = creation.name.trim().to_string();
        let target = self.site_node_mut(site.path())?;
        let first = name.split('/').next().unwrap_or_default();
        let taken = target.list(&name).is_some()
            || target.site(first).is_some()
            || if name.contains('/') {
                target.list(first).is_some()
            } else {
                target.has_child_named(&name)
            };
        if taken {
            return Err(Error::Conflict(format!(
                "Site, group or list with the same name found: {name}"
            )));
        }

        let node = ListNode {
            id: Uuid::new_v4(),
            title: child_name(&name).to_string(),
            name,
            description: creation.description.clone(),
            template: creation.template,
            created: Timestamp::now(),
            deleted: None,
            fields: None,
            properties: Properties::new(),
            items: Vec::new(),
        };
        target.lists.push(node.clone());
        let record = {
            let site_node = self.site_node(site.path())?;
            self.list_record(site_node, &node)
        };
        self.persist();
        Ok(record)
    }

    fn remove_list(&mut self, list: &List) -> Result<()> {
        let site = self.site_node_mut(list.site().path())?;
        let position = site
            .lists
            .iter()
            .position(|node| eq_ci(&node.name, list.site_relative_path()))
            .ok_or_else(|| Error::ObjectNotFound(format!("List not found: {}", list.path())))?;
        site.lists.remove(position);
        self.persist();
        Ok(())
    }

    fn add_item(
        &mut self,
        list: &List,
        folder: &str,
        name: &str,
        item_type: ItemType,
    ) -> Result<ItemRecord> {
        let list_node = self.list_node_mut(list)?;
        let id = list_node.last_item_id() + 1;
        let items = items_mut(list_node, folder)?;
        check_free(items, name)?;

        let node = ItemNode {
            item_type,
            id,
            unique_id: Uuid::new_v4(),
            name: name.to_string(),
            title: String::new(),
            created: Timestamp::now(),
            modified: None,
            properties: Properties::new(),
            children: Vec::new(),
            versions: Vec::new(),
        };
        let record = item_record(&node);
        items.push(node);
        self.persist();
        Ok(record)
    }

    fn add_file(
        &mut self,
        list: &List,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> Result<ItemRecord> {
        let list_node = self.list_node_mut(list)?;
        let id = list_node.last_item_id() + 1;
        let items = items_mut(list_node, folder)?;
        check_free(items, name)?;

        let mime = mime_guess::from_path(name).first_or_octet_stream();
        let mut properties = Properties::new();
        properties.insert("ContentType", mime.essence_str());
        let node = ItemNode {
            item_type: ItemType::File,
            id,
            unique_id: Uuid::new_v4(),
            name: name.to_string(),
            title: String::new(),
            created: Timestamp::now(),
            modified: None,
            properties,
            children: Vec::new(),
            versions: vec![Version {
                number: 1,
                content: content.to_vec(),
            }],
        };
        let record = item_record(&node);
        items.push(node);
        self.persist();
        Ok(record)
    }

    fn save_file(&mut self, file: &File, content: &[u8]) -> Result<ItemRecord> {
        let item = file.item();
        let list_node = self.list_node_mut(item.list())?;
        let siblings = items_mut(list_node, item.folder_path())?;
        let node = siblings
            .iter_mut()
            .find(|node| eq_ci(&node.name, item.name()))
            .ok_or_else(|| Error::ObjectNotFound(format!("File not found: {}", file.path())))?;

        let number = node.next_version_number();
        node.versions.push(Version {
            number,
            content: content.to_vec(),
        });
        node.modified = Some(Timestamp::now());
        let record = item_record(node);
        self.persist();
        Ok(record)
    }

    fn remove_item(&mut self, item: &Item) -> Result<()> {
        let now = Timestamp::now();
        let list_node = self.list_node_mut(item.list())?;
        let siblings = items_mut(list_node, item.folder_path())?;
        let position = siblings
            .iter()
            .position(|node| eq_ci(&node.name, item.name()))
            .ok_or_else(|| Error::ObjectNotFound(format!("Item not found: {}", item.path())))?;
        siblings.remove(position);
        list_node.deleted = Some(now);
        if let Some(parent) = folder_mut(list_node, item.folder_path())? {
            parent.modified = Some(now);
        }
        self.persist();
        Ok(())
    }

    fn rename_item(&mut self, item: &Item, new_name: &str) -> Result<ItemRecord> {
        let list_node = self.list_node_mut(item.list())?;
        let siblings = items_mut(list_node, item.folder_path())?;
        if !eq_ci(item.name(), new_name) {
            check_free(siblings, new_name)?;
        }
        let node = siblings
            .iter_mut()
            .find(|node| eq_ci(&node.name, item.name()))
            .ok_or_else(|| Error::ObjectNotFound(format!("Item not found: {}", item.path())))?;

        rename_node(node, new_name);
        node.modified = Some(Timestamp::now());
        let record = item_record(node);
        self.persist();
        Ok(record)
    }

    fn move_item(&mut self, item: &Item, target: &List, folder: &str) -> Result<ItemRecord> {
        let same_list = eq_ci(item.list().path(), target.path());
        let next_id = {
            let target_node = self.list_node_mut(target)?;
            let last_id = target_node.last_item_id();
            check_free(items_mut(target_node, folder)?, item.name())?;
            last_id + 1
        };

        let now = Timestamp::now();
        let mut node = {
            let source = self.list_node_mut(item.list())?;
            let siblings = items_mut(source, item.folder_path())?;
            let position = siblings
                .iter()
                .position(|node| eq_ci(&node.name, item.name()))
                .ok_or_else(|| {
                    Error::ObjectNotFound(format!("Item not found: {}", item.path()))
                })?;
            let node = siblings.remove(position);
            if let Some(parent) = folder_mut(source, item.folder_path())? {
                parent.modified = Some(now);
            }
            node
        };
        if !same_list {
            node.id = next_id;
        }

        let target_node = self.list_node_mut(target)?;
        if let Some(parent) = folder_mut(target_node, folder)? {
            parent.modified = Some(now);
        }
        let record = item_record(&node);
        items_mut(target_node, folder)?.push(node);
        self.persist();
        Ok(record)
    }

    fn copy_item(
        &mut self,
        item: &Item,
        target: &List,
        folder: &str,
        options: &CopyOptions,
    ) -> Result<ItemRecord> {
        let mut copy = {
            let (_, source) = self.list_node(item.list())?;
            item_node(source, item.list_relative_path())?.clone()
        };
        if copy.item_type == ItemType::Folder && !options.recurse {
            copy.children.clear();
        }
        if let Some(new_name) = &options.new_name {
            rename_node(&mut copy, new_name);
        }

        let target_node = self.list_node_mut(target)?;
        let mut last_id = target_node.last_item_id();
        let items = items_mut(target_node, folder)?;
        check_free(items, &copy.name)?;
        reinitialize(&mut copy, &mut last_id, Timestamp::now());

        let record = item_record(&copy);
        items.push(copy);
        self.persist();
        Ok(record)
    }
}
