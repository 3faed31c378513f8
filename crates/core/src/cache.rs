//! Batch cache
//!
//! Shields the backend from repeated lookups during one burst of activity.
//! The cache keeps a single "last touched" instant; as long as operations
//! follow each other within the keep-alive window the content survives,
//! after a longer pause everything is dropped at the next access. There is
//! no per-entry expiry.
//!
//! Besides entities keyed by path, the cache memoizes child collections of
//! containers so that enumerations and membership updates after mutations do
//! not need another backend round-trip.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::entity::Entity;
use crate::path::{cache_key, eq_ci};

/// Keep-alive window used when a drive does not configure one
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(2);

/// Which child collection of a container is memoized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildSlot {
    /// Sub-sites of a site
    Sites,
    /// All lists of a site, grouped or not
    Lists,
    /// Items of a list or a folder
    Items,
}

/// Path-keyed entity cache with a sliding keep-alive window
#[derive(Debug)]
pub struct BatchCache {
    objects: HashMap<String, Entity>,
    children: HashMap<(String, ChildSlot), Vec<Entity>>,
    last_touched: Option<Instant>,
    keep_alive: Duration,
}

impl Default for BatchCache {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_ALIVE)
    }
}

impl BatchCache {
    pub fn new(keep_alive: Duration) -> Self {
        Self {
            objects: HashMap::new(),
            children: HashMap::new(),
            last_touched: None,
            keep_alive,
        }
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Keep the content if the cache is still warm, drop it otherwise
    ///
    /// Returns `true` if the cache was warm.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    pub(crate) fn check_at(&mut self, now: Instant) -> bool {
        match self.last_touched {
            Some(last) if now.saturating_duration_since(last) < self.keep_alive => {
                self.last_touched = Some(now);
                true
            }
            _ => {
                if !self.objects.is_empty() || !self.children.is_empty() {
                    trace!(
                        objects = self.objects.len(),
                        collections = self.children.len(),
                        "Batch cache went cold"
                    );
                }
                self.objects.clear();
                self.children.clear();
                false
            }
        }
    }

    fn touch(&mut self) {
        self.last_touched = Some(Instant::now());
    }

    /// Force the next check to report a cold cache
    pub fn invalidate(&mut self) {
        self.last_touched = None;
    }

    /// Look up an entity by path
    pub fn get(&mut self, path: &str) -> Option<Entity> {
        if !self.check() {
            return None;
        }
        let entity = self.objects.get(&cache_key(path)).cloned();
        if entity.is_some() {
            trace!(path, "Batch cache hit");
        }
        entity
    }

    /// Store an entity under its path, replacing an older one
    pub fn put(&mut self, entity: Entity) {
        self.check();
        self.objects.insert(cache_key(entity.path()), entity);
        self.touch();
    }

    /// Drop an entity; containers take all their cached descendants along
    pub fn remove(&mut self, entity: &Entity) {
        self.check();
        let key = cache_key(entity.path());
        self.objects.remove(&key);
        if entity.kind().is_container() {
            if key.is_empty() {
                self.objects.clear();
                self.children.clear();
            } else {
                let prefix = format!("{key}/");
                self.objects.retain(|path, _| !path.starts_with(&prefix));
                self.children
                    .retain(|(path, _), _| *path != key && !path.starts_with(&prefix));
            }
        }
        self.touch();
    }

    /// Drop the single entry stored under `path`
    pub fn evict(&mut self, path: &str) {
        self.check();
        self.objects.remove(&cache_key(path));
        self.touch();
    }

    /// Memoized children of the container at `path`, if known
    pub fn children(&mut self, path: &str, slot: ChildSlot) -> Option<Vec<Entity>> {
        if !self.check() {
            return None;
        }
        let children = self.children.get(&(cache_key(path), slot)).cloned();
        if children.is_some() {
            trace!(path, ?slot, "Batch cache hit for children");
        }
        children
    }

    /// Memoize the children of the container at `path`
    pub fn set_children(&mut self, path: &str, slot: ChildSlot, children: Vec<Entity>) {
        self.check();
        self.children.insert((cache_key(path), slot), children);
        self.touch();
    }

    /// Add a new child to a memoized collection; unknown collections stay unknown
    pub fn append_child(&mut self, path: &str, slot: ChildSlot, child: Entity) {
        self.update_children(path, slot, |children| children.push(child));
    }

    /// Take a child out of a memoized collection
    pub fn remove_child(&mut self, path: &str, slot: ChildSlot, child_path: &str) {
        self.update_children(path, slot, |children| {
            children.retain(|child| !eq_ci(child.path(), child_path));
        });
    }

    /// Swap a child of a memoized collection for its newer state
    pub fn replace_child(&mut self, path: &str, slot: ChildSlot, child: Entity) {
        self.update_children(path, slot, |children| {
            if let Some(existing) = children
                .iter_mut()
                .find(|existing| eq_ci(existing.path(), child.path()))
            {
                *existing = child;
            }
        });
    }

    /// Forget a memoized collection so the next listing asks the backend
    pub fn forget_children(&mut self, path: &str, slot: ChildSlot) {
        self.check();
        self.children.remove(&(cache_key(path), slot));
        self.touch();
    }

    /// Whether the children of `path` are memoized, without touching the cache
    pub fn knows_children(&self, path: &str, slot: ChildSlot) -> bool {
        self.children.contains_key(&(cache_key(path), slot))
    }

    fn update_children(&mut self, path: &str, slot: ChildSlot, update: impl FnOnce(&mut Vec<Entity>)) {
        if !self.check() {
            return;
        }
        if let Some(children) = self.children.get_mut(&(cache_key(path), slot)) {
            update(children);
            self.touch();
        }
    }

    /// Whether an entity is stored under `path`, without touching the cache
    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(&cache_key(path))
    }

    /// Number of cached entities
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
