//! Caching connector
//!
//! The connector walks slash-separated paths through the repository hierarchy,
//! consults and fills the batch cache on the way and delegates every actual
//! retrieval or mutation to a [`Backend`]. One connector serves one caller at a
//! time; callers needing parallelism create one connector per connection.

mod mutate;
mod resolve;

use std::time::Duration;

use crate::backend::Backend;
use crate::cache::{BatchCache, DEFAULT_KEEP_ALIVE};
use crate::entity::Entity;
use crate::error::Result;
use crate::path::normalize_path;

/// Settings of a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorOptions {
    /// Path of the anchor every resolution starts from
    pub root: String,
    /// Keep-alive window of the batch cache
    pub keep_alive: Duration,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            root: String::new(),
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }
}

impl ConnectorOptions {
    pub fn with_root(mut self, root: impl AsRef<str>) -> Self {
        self.root = normalize_path(root.as_ref());
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

/// Path resolver and mutation front-end over a backend
pub struct Connector<B: Backend> {
    backend: B,
    cache: BatchCache,
    root_path: String,
    root: Option<Entity>,
}

impl<B: Backend> Connector<B> {
    pub fn new(backend: B, options: ConnectorOptions) -> Self {
        Self {
            backend,
            cache: BatchCache::new(options.keep_alive),
            root_path: normalize_path(&options.root),
            root: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn cache(&self) -> &BatchCache {
        &self.cache
    }

    /// Path of the anchor root
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Forget all cached entities; the anchor root too if `include_root` is set
    pub fn clear_cache(&mut self, include_root: bool) {
        self.cache.invalidate();
        if include_root {
            self.root = None;
        }
    }

    /// Whether an object exists at `path`
    pub fn exists(&mut self, path: &str) -> Result<bool> {
        match self.resolve(path) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
