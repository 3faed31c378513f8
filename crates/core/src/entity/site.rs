use std::cell::OnceCell;
use std::rc::Rc;

use uuid::Uuid;

use super::{Container, EntityKind, Info, ListContainer, Node, Removable};
use crate::path::{child_name, join_path};
use crate::record::{Properties, SiteRecord};

/// Hierarchical container of sub-sites, lists and container groups
///
/// The identifier of a site is not always known when the site is resolved;
/// some backends reveal it only with the lists of the site. It can be learnt
/// exactly once and never changes afterwards.
#[derive(Debug)]
pub struct Site {
    info: Info,
    id: OnceCell<Uuid>,
}

impl Site {
    /// Build a site placed at `path` from its raw record
    pub(crate) fn from_record(path: &str, record: SiteRecord) -> Self {
        let title = if record.title.is_empty() {
            record.name
        } else {
            record.title
        };
        let id = OnceCell::new();
        if let Some(known) = record.id {
            let _ = id.set(known);
        }
        Self {
            info: Info::new(path.to_string(), title, record.properties),
            id,
        }
    }

    /// Backend identifier, if already known
    pub fn id(&self) -> Option<Uuid> {
        self.id.get().copied()
    }

    /// Record an identifier revealed later; returns whether it was unknown before
    pub(crate) fn learn_id(&self, id: Uuid) -> bool {
        self.id.set(id).is_ok()
    }

    /// Whether this is the top site of the drive
    pub fn is_root(&self) -> bool {
        self.info.path().is_empty()
    }
}

impl Node for Site {
    fn info(&self) -> &Info {
        &self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Site
    }
}

impl Container for Site {}

impl ListContainer for Site {
    fn site(&self) -> &Site {
        self
    }

    fn site_relative_path(&self) -> &str {
        ""
    }
}

impl Removable for Site {}

/// Inferred path segment grouping lists whose site-relative path shares a prefix
///
/// A group has no backend identity. It exists only while at least one list of
/// its site lives below it.
#[derive(Debug)]
pub struct ContainerGroup {
    info: Info,
    site: Rc<Site>,
}

impl ContainerGroup {
    pub(crate) fn new(site: Rc<Site>, name: &str) -> Self {
        let path = join_path(site.path(), name);
        Self {
            info: Info::new(path, name.to_string(), Properties::new()),
            site,
        }
    }

    pub fn site(&self) -> &Rc<Site> {
        &self.site
    }
}

impl Node for ContainerGroup {
    fn info(&self) -> &Info {
        &self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Group
    }
}

impl Container for ContainerGroup {}

impl ListContainer for ContainerGroup {
    fn site(&self) -> &Site {
        &self.site
    }

    fn site_relative_path(&self) -> &str {
        child_name(self.info.path())
    }
}
