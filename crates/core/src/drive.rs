//! Drive management
//!
//! A drive is a named connection to a repository: where it lives, which
//! backend talks to it and which path every resolution starts from.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::DEFAULT_KEEP_ALIVE;
use crate::config::{ConfigManager, Defaults};
use crate::connector::ConnectorOptions;
use crate::error::{Error, Result};
use crate::path::{is_valid_drive_name, normalize_path};

/// Batch cache settings of a drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keep-alive window in milliseconds
    #[serde(default = "default_keep_alive_ms")]
    pub keep_alive_ms: u64,
}

fn default_keep_alive_ms() -> u64 {
    DEFAULT_KEEP_ALIVE.as_millis() as u64
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_alive_ms: default_keep_alive_ms(),
        }
    }
}

/// A named connection to a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Unique name for this drive
    pub name: String,

    /// Location of the repository; the scheme selects the backend
    pub web_url: String,

    /// Path below the web URL every resolution starts from
    #[serde(default)]
    pub root: String,

    /// Backend kind
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Batch cache settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

fn default_backend() -> String {
    "memory".to_string()
}

impl DriveConfig {
    /// Create a new drive with required fields
    pub fn new(name: impl Into<String>, web_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            web_url: web_url.into(),
            root: String::new(),
            backend: default_backend(),
            cache: None,
        }
    }

    /// Set the anchor root of the drive
    pub fn with_root(mut self, root: impl AsRef<str>) -> Self {
        self.root = normalize_path(root.as_ref());
        self
    }

    /// Parse the web URL
    pub fn url(&self) -> Result<Url> {
        Ok(Url::parse(&self.web_url)?)
    }

    /// Check the name, the URL and the backend kind
    pub fn validate(&self) -> Result<()> {
        if !is_valid_drive_name(&self.name) {
            return Err(Error::Config(format!(
                "Invalid drive name '{}'. Use letters, digits, '-' or '_'",
                self.name
            )));
        }
        let url = self.url()?;
        if !matches!(url.scheme(), "memory" | "file") {
            return Err(Error::Config(format!(
                "Unsupported URL scheme '{}' for drive '{}'",
                url.scheme(),
                self.name
            )));
        }
        if self.backend != "memory" {
            return Err(Error::Config(format!(
                "Unsupported backend '{}' for drive '{}'",
                self.backend, self.name
            )));
        }
        Ok(())
    }

    /// Get the effective keep-alive window
    pub fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.cache.clone().unwrap_or_default().keep_alive_ms)
    }

    /// Connector settings for this drive
    pub fn connector_options(&self) -> ConnectorOptions {
        ConnectorOptions::default()
            .with_root(&self.root)
            .with_keep_alive(self.keep_alive())
    }
}

/// Manager for drive operations
pub struct DriveManager {
    config_manager: ConfigManager,
}

impl DriveManager {
    /// Create a new DriveManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new DriveManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured drives
    pub fn list(&self) -> Result<Vec<DriveConfig>> {
        let config = self.config_manager.load()?;
        let defaults = config.defaults;
        Ok(config
            .drives
            .into_iter()
            .map(|drive| defaults.apply(drive))
            .collect())
    }

    /// Get a drive by name, with the shared defaults filled in
    pub fn get(&self, name: &str) -> Result<DriveConfig> {
        let config = self.config_manager.load()?;
        let defaults = config.defaults;
        config
            .drives
            .into_iter()
            .find(|d| d.name == name)
            .map(|drive| defaults.apply(drive))
            .ok_or_else(|| Error::DriveNotFound(name.to_string()))
    }

    /// Settings shared by all drives
    pub fn defaults(&self) -> Result<Defaults> {
        Ok(self.config_manager.load()?.defaults)
    }

    /// Add or update a drive
    pub fn set(&self, drive: DriveConfig) -> Result<()> {
        drive.validate()?;
        let mut config = self.config_manager.load()?;

        config.drives.retain(|d| d.name != drive.name);
        config.drives.push(drive);

        self.config_manager.save(&config)
    }

    /// Remove a drive
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.drives.len();

        config.drives.retain(|d| d.name != name);

        if config.drives.len() == original_len {
            return Err(Error::DriveNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a drive exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.drives.iter().any(|d| d.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_drive_manager() -> (DriveManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        let drive_manager = DriveManager::with_config_manager(config_manager);
        (drive_manager, temp_dir)
    }

    #[test]
    fn test_drive_new() {
        let drive = DriveConfig::new("demo", "memory:").with_root("/Team/Docs/");
        assert_eq!(drive.name, "demo");
        assert_eq!(drive.root, "Team/Docs");
        assert_eq!(drive.backend, "memory");
        assert_eq!(drive.keep_alive(), Duration::from_secs(2));
    }

    #[test]
    fn test_connector_options() {
        let mut drive = DriveConfig::new("demo", "memory:").with_root("Team");
        drive.cache = Some(CacheConfig { keep_alive_ms: 500 });
        let options = drive.connector_options();
        assert_eq!(options.root, "Team");
        assert_eq!(options.keep_alive, Duration::from_millis(500));
    }

    #[test]
    fn test_validate() {
        assert!(DriveConfig::new("demo", "memory:").validate().is_ok());
        assert!(
            DriveConfig::new("local", "file:///tmp/site.json")
                .validate()
                .is_ok()
        );

        let err = DriveConfig::new("bad name", "memory:").validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = DriveConfig::new("web", "https://example.com/")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = DriveConfig::new("demo", "not a url").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_drive_manager_set_and_get() {
        let (manager, _temp_dir) = temp_drive_manager();

        manager.set(DriveConfig::new("demo", "memory:")).unwrap();

        let retrieved = manager.get("demo").unwrap();
        assert_eq!(retrieved.name, "demo");
        assert_eq!(retrieved.web_url, "memory:");
    }

    #[test]
    fn test_drive_manager_list() {
        let (manager, _temp_dir) = temp_drive_manager();

        manager.set(DriveConfig::new("a", "memory:")).unwrap();
        manager
            .set(DriveConfig::new("b", "file:///tmp/b.json"))
            .unwrap();

        let drives = manager.list().unwrap();
        assert_eq!(drives.len(), 2);
    }

    #[test]
    fn test_drive_manager_remove() {
        let (manager, _temp_dir) = temp_drive_manager();

        manager.set(DriveConfig::new("demo", "memory:")).unwrap();
        assert!(manager.exists("demo").unwrap());

        manager.remove("demo").unwrap();
        assert!(!manager.exists("demo").unwrap());
    }

    #[test]
    fn test_drive_manager_not_found() {
        let (manager, _temp_dir) = temp_drive_manager();

        assert!(matches!(
            manager.remove("missing").unwrap_err(),
            Error::DriveNotFound(_)
        ));
        assert!(matches!(
            manager.get("missing").unwrap_err(),
            Error::DriveNotFound(_)
        ));
    }

    #[test]
    fn test_drive_manager_applies_default_cache() {
        let (manager, temp_dir) = temp_drive_manager();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "schema_version = 1\n\n[defaults.cache]\nkeep_alive_ms = 250\n",
        )
        .unwrap();
        manager.set(DriveConfig::new("demo", "memory:")).unwrap();

        let drive = manager.get("demo").unwrap();
        assert_eq!(drive.keep_alive(), Duration::from_millis(250));
        assert_eq!(manager.defaults().unwrap().cache.unwrap().keep_alive_ms, 250);
    }

    #[test]
    fn test_drive_update_existing() {
        let (manager, _temp_dir) = temp_drive_manager();

        manager.set(DriveConfig::new("demo", "memory:")).unwrap();
        manager
            .set(DriveConfig::new("demo", "memory:").with_root("Team"))
            .unwrap();

        let drives = manager.list().unwrap();
        assert_eq!(drives.len(), 1);
        assert_eq!(drives[0].root, "Team");
    }
}
