//! Configuration management
//!
//! The sitedrive configuration is a TOML file at
//! ~/.config/sitedrive/config.toml holding the configured drives and the
//! defaults every command starts from. SD_CONFIG_DIR points it elsewhere.
//!
//! Changes to schema_version require migration support.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drive::{CacheConfig, DriveConfig};
use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "SD_CONFIG_DIR";

/// Output format commands use unless `--json` is given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

/// When human output is colored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colored unless NO_COLOR is set
    #[default]
    Auto,
    Always,
    Never,
}

/// Settings shared by all drives and commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub output: OutputMode,

    #[serde(default)]
    pub color: ColorMode,

    /// Batch cache settings for drives that do not carry their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

impl Defaults {
    /// Give a drive without cache settings the shared ones
    pub fn apply(&self, mut drive: DriveConfig) -> DriveConfig {
        if drive.cache.is_none() {
            drive.cache = self.cache.clone();
        }
        drive
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    #[serde(default)]
    pub defaults: Defaults,

    /// Configured drives
    #[serde(default)]
    pub drives: Vec<DriveConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            drives: Vec::new(),
        }
    }
}

/// Loads and stores the configuration file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the configuration in the default directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(default_config_dir()?.join("config.toml")))
    }

    /// Manager for a configuration file at a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration; a missing file is an empty configuration
    pub fn load(&self) -> Result<Config> {
        let content = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };

        let config: Config = toml::from_str(&content)?;
        match config.schema_version {
            SCHEMA_VERSION => Ok(config),
            version if version < SCHEMA_VERSION => Ok(migrate(config)),
            version => Err(Error::Config(format!(
                "Configuration file version {version} is newer than supported version {SCHEMA_VERSION}. Please upgrade sd."
            ))),
        }
    }

    /// Store the configuration, readable by its owner only
    ///
    /// The file is written next to its final location and renamed over it,
    /// so a failed write never leaves a truncated configuration behind.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let staging = self.config_path.with_extension("toml.new");
        std::fs::write(&staging, toml::to_string_pretty(config)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&staging, &self.config_path)?;
        tracing::debug!(path = %self.config_path.display(), "saved configuration");
        Ok(())
    }
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("sitedrive"))
        .ok_or_else(|| Error::Config("Could not determine config directory".into()))
}

/// Bring an older configuration up to the current schema
fn migrate(mut config: Config) -> Config {
    tracing::debug!(from = config.schema_version, "migrating configuration");
    config.schema_version = SCHEMA_VERSION;
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.defaults, Defaults::default());
        assert!(config.drives.is_empty());
    }

    #[test]
    fn test_save_and_load_drives() {
        let (manager, _temp_dir) = temp_config_manager();

        let mut config = Config::default();
        config
            .drives
            .push(DriveConfig::new("demo", "memory:").with_root("Team"));
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.drives, config.drives);
        assert!(!manager.config_path().with_extension("toml.new").exists());
    }

    #[test]
    fn test_defaults_parse() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path(),
            "schema_version = 1\n\n[defaults]\noutput = \"json\"\ncolor = \"never\"\n\n[defaults.cache]\nkeep_alive_ms = 750\n",
        )
        .unwrap();

        let defaults = manager.load().unwrap().defaults;
        assert_eq!(defaults.output, OutputMode::Json);
        assert_eq!(defaults.color, ColorMode::Never);
        assert_eq!(defaults.cache, Some(CacheConfig { keep_alive_ms: 750 }));
    }

    #[test]
    fn test_defaults_apply_cache() {
        let defaults = Defaults {
            cache: Some(CacheConfig { keep_alive_ms: 750 }),
            ..Default::default()
        };

        let drive = defaults.apply(DriveConfig::new("demo", "memory:"));
        assert_eq!(drive.keep_alive().as_millis(), 750);

        let mut own = DriveConfig::new("own", "memory:");
        own.cache = Some(CacheConfig { keep_alive_ms: 100 });
        assert_eq!(defaults.apply(own).keep_alive().as_millis(), 100);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (manager, _temp_dir) = temp_config_manager();
        manager.save(&Config::default()).unwrap();
        let mode = std::fs::metadata(manager.config_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_schema_versions() {
        let (manager, _temp_dir) = temp_config_manager();

        std::fs::write(manager.config_path(), "schema_version = 0\n").unwrap();
        assert_eq!(manager.load().unwrap().schema_version, SCHEMA_VERSION);

        let content = format!("schema_version = {}\n", SCHEMA_VERSION + 1);
        std::fs::write(manager.config_path(), content).unwrap();
        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }
}
