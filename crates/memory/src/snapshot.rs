//! Serialized repository tree
//!
//! A snapshot is a JSON document holding the top site with everything below
//! it. File content is stored base64-encoded per version.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sd_core::path::eq_ci;
use sd_core::{FieldDefinition, ItemType, Properties};

/// A site with its sub-sites and lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteNode {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub template: String,
    pub created: Timestamp,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<SiteNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListNode>,
}

impl SiteNode {
    pub fn site(&self, name: &str) -> Option<&SiteNode> {
        self.sites.iter().find(|site| eq_ci(&site.name, name))
    }

    pub fn list(&self, name: &str) -> Option<&ListNode> {
        self.lists.iter().find(|list| eq_ci(&list.name, name))
    }

    /// Whether `name` is taken by a sub-site, a list or a container group
    pub fn has_child_named(&self, name: &str) -> bool {
        self.site(name).is_some()
            || self.lists.iter().any(|list| {
                eq_ci(&list.name, name) || list.group().is_some_and(|group| eq_ci(group, name))
            })
    }
}

/// A list with its items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListNode {
    pub id: Uuid,
    /// Path relative to the owning site
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub template: u32,
    pub created: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDefinition>>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemNode>,
}

impl ListNode {
    /// Container group segment of the list name
    pub fn group(&self) -> Option<&str> {
        self.name.split_once('/').map(|(group, _)| group)
    }

    /// Last change: creation, the latest deletion or the newest item change
    pub fn modified(&self) -> Timestamp {
        let mut modified = self.created;
        if let Some(deleted) = self.deleted {
            modified = modified.max(deleted);
        }
        self.items
            .iter()
            .map(ItemNode::effective_modified)
            .fold(modified, Timestamp::max)
    }

    /// Number of items at any depth
    pub fn item_count(&self) -> usize {
        self.items.iter().map(|item| 1 + item.descendant_count()).sum()
    }

    /// Highest item identifier at any depth
    pub fn last_item_id(&self) -> i64 {
        fn last(items: &[ItemNode]) -> i64 {
            items
                .iter()
                .map(|item| item.id.max(last(&item.children)))
                .max()
                .unwrap_or(0)
        }
        last(&self.items)
    }
}

/// A list item, folder or file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemNode {
    #[serde(rename = "type", default, skip_serializing_if = "is_common")]
    pub item_type: ItemType,
    pub id: i64,
    pub unique_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub created: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<Version>,
}

fn is_common(item_type: &ItemType) -> bool {
    *item_type == ItemType::Common
}

impl ItemNode {
    pub fn child(&self, name: &str) -> Option<&ItemNode> {
        self.children.iter().find(|child| eq_ci(&child.name, name))
    }

    /// Own modification time; folders also reflect their descendants
    pub fn effective_modified(&self) -> Timestamp {
        let own = self.modified.unwrap_or(self.created);
        if self.item_type != ItemType::Folder {
            return own;
        }
        self.children
            .iter()
            .map(ItemNode::effective_modified)
            .fold(own, Timestamp::max)
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Byte length of the latest version
    pub fn size(&self) -> u64 {
        self.versions
            .last()
            .map_or(0, |version| version.content.len() as u64)
    }

    pub fn next_version_number(&self) -> u32 {
        self.versions.last().map_or(1, |version| version.number + 1)
    }
}

/// One stored version of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub number: u32,
    #[serde(with = "base64_content")]
    pub content: Vec<u8>,
}

mod base64_content {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(content))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
