//! sd-core: Core library for the sitedrive repository navigator
//!
//! This crate provides the core functionality for sitedrive, including:
//! - The entity model of sites, container groups, lists and items
//! - The batch cache shielding the backend during one unit of work
//! - The backend contract concrete repository adapters implement
//! - The caching connector resolving paths and applying mutations
//! - Configuration and drive management
//!
//! This crate is independent of any specific backend, allowing for easy
//! testing with mocks and an in-memory repository.

pub mod backend;
pub mod cache;
pub mod config;
pub mod connector;
pub mod drive;
pub mod entity;
pub mod error;
pub mod path;
pub mod record;

pub use backend::Backend;
pub use cache::{BatchCache, ChildSlot, DEFAULT_KEEP_ALIVE};
pub use config::{ColorMode, Config, ConfigManager, Defaults, OutputMode};
pub use connector::{Connector, ConnectorOptions};
pub use drive::{CacheConfig, DriveConfig, DriveManager};
pub use entity::{
    ContainerGroup, Entity, EntityKind, File, Folder, Item, List, Node, Site, check_can_be_child,
};
pub use error::{Error, Result};
pub use path::{DrivePath, parse_drive_path};
pub use record::{
    CopyOptions, FieldDefinition, ItemRecord, ItemType, ListCreation, ListRecord, Properties,
    SiteCreation, SiteRecord,
};
