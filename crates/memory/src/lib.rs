//! sd-memory: In-memory repository backend for sitedrive
//!
//! This crate implements the backend contract of sd-core over a repository
//! tree held in memory. Trees are loaded from JSON snapshots and written back
//! after every mutation, which makes the backend usable for demos, local
//! drives and tests alike.

pub mod backend;
pub mod snapshot;

pub use backend::MemoryBackend;
pub use snapshot::{ItemNode, ListNode, SiteNode, Version};

/// Snapshot of the bundled sample site
pub const SAMPLE_SITE: &str = include_str!("../data/sample_site.json");
