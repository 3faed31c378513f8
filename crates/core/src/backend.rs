//! Backend contract
//!
//! The narrow set of operations the connector needs from a concrete
//! repository implementation. Every method answers with raw records; the
//! connector alone turns them into entities. Paths handed to a backend are
//! slash-separated, relative and carry no leading or trailing slash.
//!
//! A backend reports a missing object with [`Error::ObjectNotFound`] and a
//! failed round-trip with [`Error::BackendUnavailable`]. It must not retry on
//! behalf of the connector.
//!
//! [`Error::ObjectNotFound`]: crate::Error::ObjectNotFound
//! [`Error::BackendUnavailable`]: crate::Error::BackendUnavailable

use crate::entity::{File, Item, List, Site};
use crate::error::Result;
use crate::record::{
    CopyOptions, ItemRecord, ItemType, ListCreation, ListRecord, SiteCreation, SiteRecord,
};

/// Raw repository access used by the connector
#[cfg_attr(test, mockall::automock)]
pub trait Backend {
    /// Fetch a single site by its full path
    fn query_site(&self, path: &str) -> Result<SiteRecord>;

    /// List the immediate child sites of a site
    fn query_sites(&self, site: &Site) -> Result<Vec<SiteRecord>>;

    /// List every list of a site, grouped or not
    fn query_lists(&self, site: &Site) -> Result<Vec<ListRecord>>;

    /// List the items directly inside `folder` (empty for the list root)
    fn query_items(&self, list: &List, folder: &str) -> Result<Vec<ItemRecord>>;

    /// Fetch a single item by its path below the list
    ///
    /// The path may be spelled in any case; backends that know the stored
    /// spelling of the folders on the way report it in `ItemRecord::folder`.
    fn query_item(&self, list: &List, path: &str) -> Result<ItemRecord>;

    /// Read the content of a file; the latest version when `version` is `None`
    fn open_file(&self, file: &File, version: Option<u32>) -> Result<Vec<u8>>;

    /// Create a sub-site of `parent`
    fn add_site(&mut self, parent: &Site, creation: &SiteCreation) -> Result<SiteRecord>;

    /// Delete a site with all its content
    fn remove_site(&mut self, site: &Site) -> Result<()>;

    /// Create a list; its name is relative to `site` and may include a group
    fn add_list(&mut self, site: &Site, creation: &ListCreation) -> Result<ListRecord>;

    /// Delete a list with all its items
    fn remove_list(&mut self, list: &List) -> Result<()>;

    /// Create an item or a folder inside `folder` of `list`
    fn add_item(
        &mut self,
        list: &List,
        folder: &str,
        name: &str,
        item_type: ItemType,
    ) -> Result<ItemRecord>;

    /// Create a file inside `folder` of `list`
    fn add_file(
        &mut self,
        list: &List,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> Result<ItemRecord>;

    /// Store a new version of a file
    fn save_file(&mut self, file: &File, content: &[u8]) -> Result<ItemRecord>;

    /// Delete an item; folders go with their children
    fn remove_item(&mut self, item: &Item) -> Result<()>;

    /// Give an item a new name within its folder
    fn rename_item(&mut self, item: &Item, new_name: &str) -> Result<ItemRecord>;

    /// Move an item into `folder` of `target`
    fn move_item(&mut self, item: &Item, target: &List, folder: &str) -> Result<ItemRecord>;

    /// Copy an item into `folder` of `target`
    fn copy_item(
        &mut self,
        item: &Item,
        target: &List,
        folder: &str,
        options: &CopyOptions,
    ) -> Result<ItemRecord>;
}
