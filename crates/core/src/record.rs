//! Raw records exchanged with a backend
//!
//! Backends answer queries and mutations with these records; only the connector
//! turns them into entities. Creation parameters travel the other way.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::path::eq_ci;

/// Property bag captured from the backend
///
/// Lookups ignore the case of the key; iteration keeps the original keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, serde_json::Value>);

impl Properties {
    /// Create an empty property bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property ignoring the case of the key
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0
            .get(key)
            .or_else(|| self.0.iter().find(|(k, _)| eq_ci(k, key)).map(|(_, v)| v))
    }

    /// Look up a property holding a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|value| value.as_str())
    }

    /// Set a property, replacing any key that differs only in case
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        let key = key.into();
        self.0.retain(|existing, _| !eq_ci(existing, &key));
        self.0.insert(key, value.into());
    }

    /// Iterate over all properties
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

/// Raw information about a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Backend identifier, unknown for some backends until a list reveals it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Last segment of the site path
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Definition of a field carried by the items of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
}

/// Raw information about a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecord {
    pub id: Uuid,
    /// Identifier of the owning site, if the backend reports it with the list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    /// Path relative to the owning site; may contain one slash for grouped lists
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub created: Timestamp,
    pub modified: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Timestamp>,
    #[serde(default)]
    pub item_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDefinition>>,
    #[serde(default)]
    pub properties: Properties,
}

/// Concrete kind of a list item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Item carrying only meta-data
    #[default]
    Common,
    Folder,
    File,
}

/// Raw information about a list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub item_type: ItemType,
    /// Integer identifier, unique within the list
    pub id: i64,
    /// Stable identifier that survives renames and moves
    pub unique_id: Uuid,
    /// Last segment of the item path
    pub name: String,
    /// Folder path below the list as stored, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default)]
    pub title: String,
    pub created: Timestamp,
    pub modified: Timestamp,
    /// Number of direct children (folders only)
    #[serde(default)]
    pub child_count: u32,
    /// Byte length of the content (files only)
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub properties: Properties,
}

/// Parameters for creating a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteCreation {
    pub name: String,
    pub title: String,
    pub description: String,
    pub template: String,
    pub language: u32,
    pub locale: u32,
    pub unique_permissions: Option<bool>,
}

impl SiteCreation {
    /// Create parameters with the required fields
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            ..Default::default()
        }
    }

    /// Validate the required fields
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() && self.title.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "The name or title of the new site must be set".into(),
            ));
        }
        if self.template.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "The template of the new site must be specified".into(),
            ));
        }
        if self.effective_name().contains('/') {
            return Err(Error::InvalidArgument(
                "The name of the new site must not contain a slash".into(),
            ));
        }
        Ok(())
    }

    /// The name the site will get; falls back to the title
    pub fn effective_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.title.trim()
        } else {
            name
        }
    }
}

/// Parameters for creating a list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListCreation {
    /// Path relative to the owning site
    pub name: String,
    pub description: String,
    pub template: u32,
}

impl ListCreation {
    /// Create parameters with the required fields
    pub fn new(name: impl Into<String>, template: u32) -> Self {
        Self {
            name: name.into(),
            template,
            ..Default::default()
        }
    }

    /// Validate the required fields
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "The name of the new list must be provided".into(),
            ));
        }
        if self.template == 0 {
            return Err(Error::InvalidArgument(
                "The template of the new list must be specified".into(),
            ));
        }
        Ok(())
    }
}

/// Options for copying an item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Copy the children of a folder too
    pub recurse: bool,
    /// Name of the copy; the source name is kept when absent
    pub new_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_case_insensitive() {
        let mut properties = Properties::new();
        properties.insert("ContentType", "text/plain");
        assert_eq!(properties.get_str("contenttype"), Some("text/plain"));

        properties.insert("CONTENTTYPE", "image/png");
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get_str("ContentType"), Some("image/png"));
    }

    #[test]
    fn test_site_creation_check() {
        assert!(SiteCreation::new("team", "STS#0").check().is_ok());

        let err = SiteCreation::new("", "STS#0").check().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = SiteCreation::new("team", "").check().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let titled = SiteCreation {
            title: "Team".into(),
            template: "STS#0".into(),
            ..Default::default()
        };
        assert!(titled.check().is_ok());
        assert_eq!(titled.effective_name(), "Team");
    }

    #[test]
    fn test_list_creation_check() {
        assert!(ListCreation::new("Tasks", 107).check().is_ok());
        assert!(ListCreation::new("", 107).check().is_err());
        assert!(ListCreation::new("Tasks", 0).check().is_err());
    }

    #[test]
    fn test_item_record_defaults_to_common() {
        let json = r#"{
            "id": 3,
            "unique_id": "8c1d3a4e-2f4b-4b8e-9a7c-5f1e2d3c4b5a",
            "name": "note",
            "created": "2024-01-01T00:00:00Z",
            "modified": "2024-01-02T00:00:00Z"
        }"#;
        let record: ItemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.item_type, ItemType::Common);
        assert_eq!(record.size, 0);
        assert!(record.properties.is_empty());
    }
}
