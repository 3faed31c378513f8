//! Connector behaviour over the in-memory backend

use std::time::Duration;

use jiff::Timestamp;
use tempfile::TempDir;

use sd_core::{
    Connector, ConnectorOptions, CopyOptions, EntityKind, Error, ListCreation, SiteCreation,
};
use sd_memory::{MemoryBackend, SAMPLE_SITE};

fn options() -> ConnectorOptions {
    ConnectorOptions::default().with_keep_alive(Duration::from_secs(60))
}

fn connector() -> Connector<MemoryBackend> {
    Connector::new(MemoryBackend::sample().unwrap(), options())
}

fn names(entities: &[sd_core::Entity]) -> Vec<&str> {
    entities.iter().map(|entity| entity.name()).collect()
}

#[test]
fn test_resolve_ignores_case() {
    let mut connector = connector();
    let folder = connector.resolve("TEAM/shared documents/REPORTS").unwrap();
    assert_eq!(folder.kind(), EntityKind::Folder);
    assert_eq!(folder.path(), "Team/Shared Documents/Reports");

    let file = connector
        .resolve("/team/Shared Documents/Reports/Q1.TXT/")
        .unwrap();
    assert_eq!(file.kind(), EntityKind::File);
    assert_eq!(file.path(), "Team/Shared Documents/Reports/q1.txt");
    assert_eq!(file.as_content().unwrap().size(), 25);
}

#[test]
fn test_deep_item_takes_stored_folder_names() {
    let mut connector = connector();
    let file = connector
        .resolve("team/shared documents/REPORTS/q1.txt")
        .unwrap();
    assert_eq!(file.path(), "Team/Shared Documents/Reports/q1.txt");
    assert_eq!(file.as_item().unwrap().folder_path(), "Reports");
    assert!(connector.cache().contains("Team/Shared Documents/Reports/q1.txt"));
}

#[test]
fn test_missing_paths() {
    let mut connector = connector();
    let err = connector.resolve("Team/Nothing").unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));

    let err = connector.resolve("Documents/welcome.txt/deeper").unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));

    assert!(!connector.exists("Projects/Apollo/Docs").unwrap());
    assert!(connector.exists("Projects/Apollo").unwrap());
}

#[test]
fn test_children_of_top_site() {
    let mut connector = connector();
    let root = connector.root().unwrap();
    let children = connector.children(&root).unwrap();
    assert_eq!(
        names(&children),
        vec!["Team", "Projects", "Documents", "Lists"]
    );
    let kinds: Vec<EntityKind> = children.iter().map(|child| child.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::Site,
            EntityKind::Site,
            EntityKind::List,
            EntityKind::Group
        ]
    );
}

#[test]
fn test_container_groups_are_inferred() {
    let mut connector = connector();
    let group = connector.resolve("team/lists").unwrap();
    assert_eq!(group.kind(), EntityKind::Group);
    assert_eq!(group.path(), "Team/Lists");

    let lists = connector.children(&group).unwrap();
    assert_eq!(names(&lists), vec!["Tasks", "Contacts"]);
    assert!(lists.iter().all(|list| list.kind() == EntityKind::List));

    let tasks = connector.resolve("Team/Lists/TASKS").unwrap();
    assert_eq!(tasks.path(), "Team/Lists/Tasks");
    assert_eq!(tasks.title(), "Tasks");

    let team = connector.resolve("Team").unwrap();
    let groups = connector.groups(&team).unwrap();
    assert_eq!(names(&groups), vec!["Lists"]);
    let top_lists = connector.lists(&team).unwrap();
    assert_eq!(names(&top_lists), vec!["Shared Documents"]);
}

#[test]
fn test_has_object_with_wildcards() {
    let mut connector = connector();
    assert!(connector.has_object("Team/Lists/*").unwrap());
    assert!(connector.has_object("Team/Lists/Tasks/*").unwrap());
    assert!(!connector.has_object("Team/Lists/Contacts/*").unwrap());
    assert!(!connector.has_object("Projects/Apollo/*").unwrap());
    assert!(!connector.has_object("Missing/*/deeper").unwrap());
    assert!(connector.has_object("Team/Shared Documents/Reports/*").unwrap());
    assert!(connector.has_object("Documents/readme.txt").unwrap());
}

#[test]
fn test_wildcards_follow_item_changes() {
    let mut connector = connector();
    let docs = connector.resolve("Team/Shared Documents").unwrap();
    let empty = connector.add_folder(&docs, "Empty").unwrap();
    assert!(!connector.has_object("Team/Shared Documents/Empty/*").unwrap());

    let folder = connector.resolve("Team/Shared Documents/Empty").unwrap();
    let note = connector.add_item(&folder, "x").unwrap();
    assert!(connector.has_object("Team/Shared Documents/Empty/*").unwrap());

    let target = connector.resolve("Documents").unwrap();
    connector.move_to(&note, &target).unwrap();
    assert!(!connector.has_object("Team/Shared Documents/Empty/*").unwrap());
    assert!(connector.has_object("Documents/*").unwrap());

    connector.remove(&empty).unwrap();
    assert!(connector.has_object("Team/Shared Documents/*").unwrap());
}

#[test]
fn test_wildcards_follow_items_of_a_new_list() {
    let mut connector = connector();
    let team = connector.resolve("Team").unwrap();
    let fresh = connector
        .add_list(&team, &ListCreation::new("Fresh", 100))
        .unwrap();
    assert!(!connector.has_object("Team/Fresh/*").unwrap());

    let item = connector.add_item(&fresh, "x").unwrap();
    assert!(connector.has_object("Team/Fresh/*").unwrap());
    let list = connector.resolve("team/fresh").unwrap();
    assert!(connector.has_children(&list).unwrap());

    connector.remove(&item).unwrap();
    assert!(!connector.has_object("Team/Fresh/*").unwrap());
}

#[test]
fn test_anchored_root() {
    let backend = MemoryBackend::sample().unwrap();
    let mut connector = Connector::new(backend, options().with_root("team"));
    let root = connector.root().unwrap();
    assert_eq!(root.path(), "Team");

    let docs = connector.resolve("Team/Shared Documents").unwrap();
    assert_eq!(docs.kind(), EntityKind::List);

    let err = connector.resolve("Projects").unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));

    connector.clear_cache(false);
    assert_eq!(connector.resolve("TEAM").unwrap().path(), "Team");
}

#[test]
fn test_site_identity_learnt_from_lists() {
    let backend = MemoryBackend::sample().unwrap().withhold_site_ids(true);
    let expected = backend.root().site("Team").unwrap().id;
    let mut connector = Connector::new(backend, options());

    let team = connector.resolve("Team").unwrap();
    assert_eq!(team.site().id(), None);

    connector.resolve("Team/Shared Documents").unwrap();
    assert_eq!(team.site().id(), Some(expected));
}

#[test]
fn test_read_file_versions() {
    let mut connector = connector();
    let file = connector
        .resolve("Team/Shared Documents/Reports/q1.txt")
        .unwrap();

    let latest = connector.open_file(&file, None).unwrap();
    assert_eq!(latest, b"Quarterly report, final.\n");
    let first = connector.open_file(&file, Some(1)).unwrap();
    assert_eq!(first, b"Quarterly report, first draft.\n");

    let err = connector.open_file(&file, Some(9)).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));

    let folder = connector.resolve("Team/Shared Documents/Reports").unwrap();
    let err = connector.open_file(&folder, None).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}

#[test]
fn test_save_file_adds_version() {
    let mut connector = connector();
    let file = connector
        .resolve("Team/Shared Documents/Reports/q1.txt")
        .unwrap();

    let saved = connector.save_file(&file, b"Revised.\n").unwrap();
    assert_eq!(saved.as_content().unwrap().size(), 9);
    assert!(saved.as_item().unwrap().modified() > file.as_item().unwrap().modified());

    let again = connector
        .resolve("Team/Shared Documents/Reports/q1.txt")
        .unwrap();
    assert_eq!(connector.open_file(&again, None).unwrap(), b"Revised.\n");
    assert_eq!(connector.open_file(&again, Some(3)).unwrap(), b"Revised.\n");
    assert_eq!(
        connector.open_file(&again, Some(2)).unwrap(),
        b"Quarterly report, final.\n"
    );
}

#[test]
fn test_add_items() {
    let mut connector = connector();
    let docs = connector.resolve("Documents").unwrap();
    let before = connector.items(&docs).unwrap();
    assert_eq!(before.len(), 2);

    let folder = connector.add_folder(&docs, "Archive").unwrap();
    assert_eq!(folder.kind(), EntityKind::Folder);
    assert_eq!(folder.as_item().unwrap().id(), 3);

    let file = connector.add_file(&folder, "notes.txt", b"hello").unwrap();
    assert_eq!(file.path(), "Documents/Archive/notes.txt");
    assert_eq!(file.as_item().unwrap().id(), 4);
    assert_eq!(file.properties().get_str("contenttype"), Some("text/plain"));

    let item = connector.add_item(&docs, "memo").unwrap();
    assert_eq!(item.kind(), EntityKind::Item);

    let after = connector.items(&docs).unwrap();
    assert_eq!(names(&after), vec!["welcome.txt", "readme.txt", "Archive", "memo"]);

    let err = connector.add_file(&docs, "WELCOME.TXT", b"").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = connector.add_file(&item, "x.txt", b"").unwrap_err();
    assert!(matches!(err, Error::InvalidHierarchy(_)));

    let err = connector.add_folder(&docs, "a/b").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_add_sites_and_lists() {
    let mut connector = connector();
    let root = connector.root().unwrap();
    connector.children(&root).unwrap();

    let site = connector
        .add_site(&root, &SiteCreation::new("Wiki", "STS#0"))
        .unwrap();
    assert_eq!(site.path(), "Wiki");
    assert!(connector.exists("wiki").unwrap());

    let err = connector
        .add_site(&root, &SiteCreation::new("documents", "STS#0"))
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    let err = connector
        .add_site(&root, &SiteCreation::new("LISTS", "STS#0"))
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let group = connector.resolve("Lists").unwrap();
    let events = connector
        .add_list(&group, &ListCreation::new("Events", 106))
        .unwrap();
    assert_eq!(events.path(), "Lists/Events");
    let lists = connector.children(&group).unwrap();
    assert_eq!(names(&lists), vec!["Announcements", "Events"]);

    let list = connector
        .add_list(&site, &ListCreation::new("Pages", 119))
        .unwrap();
    assert_eq!(list.path(), "Wiki/Pages");
    let err = connector
        .add_list(&list, &ListCreation::new("Nested", 100))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHierarchy(_)));
}

#[test]
fn test_rename_folder_evicts_descendants() {
    let mut connector = connector();
    connector
        .resolve("Team/Shared Documents/Reports/q1.txt")
        .unwrap();
    let folder = connector.resolve("Team/Shared Documents/Reports").unwrap();
    assert!(connector.cache().contains("team/shared documents/reports/q1.txt"));

    let renamed = connector.rename(&folder, "Archive").unwrap();
    assert_eq!(renamed.path(), "Team/Shared Documents/Archive");
    assert!(!connector.cache().contains("Team/Shared Documents/Reports/q1.txt"));

    assert!(!connector.exists("Team/Shared Documents/Reports/q1.txt").unwrap());
    let file = connector
        .resolve("Team/Shared Documents/Archive/q1.txt")
        .unwrap();
    assert_eq!(file.kind(), EntityKind::File);
}

#[test]
fn test_rename_keeps_title_in_step() {
    let mut connector = connector();
    let charter = connector
        .resolve("Team/Shared Documents/charter.txt")
        .unwrap();
    assert_eq!(charter.title(), "Team Charter");

    let renamed = connector.rename(&charter, "mission.txt").unwrap();
    assert_eq!(renamed.title(), "mission.txt");
    assert_eq!(
        renamed.as_item().unwrap().unique_id(),
        charter.as_item().unwrap().unique_id()
    );

    let other = connector.resolve("Team/Shared Documents/mission.txt").unwrap();
    let reports = connector.resolve("Team/Shared Documents/Reports").unwrap();
    let err = connector.rename(&other, "REPORTS").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(connector.exists(reports.path()).unwrap());
}

#[test]
fn test_move_between_lists() {
    let mut connector = connector();
    let welcome = connector.resolve("Documents/welcome.txt").unwrap();
    let target = connector.resolve("Team/Shared Documents").unwrap();

    let moved = connector.move_to(&welcome, &target).unwrap();
    assert_eq!(moved.path(), "Team/Shared Documents/welcome.txt");
    assert_eq!(moved.as_item().unwrap().id(), 4);
    assert_eq!(
        moved.as_item().unwrap().unique_id(),
        welcome.as_item().unwrap().unique_id()
    );

    assert!(!connector.exists("Documents/welcome.txt").unwrap());
    assert_eq!(
        connector.open_file(&moved, None).unwrap(),
        b"Welcome to the demo portal.\n"
    );
}

#[test]
fn test_move_into_itself_is_rejected() {
    let mut connector = connector();
    let reports = connector.resolve("Team/Shared Documents/Reports").unwrap();
    let err = connector.move_to(&reports, &reports).unwrap_err();
    assert!(matches!(err, Error::InvalidHierarchy(_)));

    let site = connector.resolve("Team").unwrap();
    let err = connector.move_to(&reports, &site).unwrap_err();
    assert!(matches!(err, Error::InvalidHierarchy(_)));
}

#[test]
fn test_copy_folder() {
    let mut connector = connector();
    let reports = connector.resolve("Team/Shared Documents/Reports").unwrap();
    let docs = connector.resolve("Documents").unwrap();

    let shallow = connector
        .copy_to(&reports, &docs, &CopyOptions::default())
        .unwrap();
    assert_eq!(shallow.path(), "Documents/Reports");
    assert!(!connector.has_children(&shallow).unwrap());
    assert_eq!(shallow.as_item().unwrap().id(), 3);

    let options = CopyOptions {
        recurse: true,
        new_name: Some("Reports 2024".into()),
    };
    let deep = connector.copy_to(&reports, &docs, &options).unwrap();
    assert_eq!(deep.path(), "Documents/Reports 2024");
    assert!(connector.has_children(&deep).unwrap());

    let copied = connector.resolve("Documents/Reports 2024/q1.txt").unwrap();
    let original = connector
        .resolve("Team/Shared Documents/Reports/q1.txt")
        .unwrap();
    assert_eq!(copied.as_item().unwrap().id(), 5);
    assert_ne!(
        copied.as_item().unwrap().unique_id(),
        original.as_item().unwrap().unique_id()
    );
    assert_eq!(
        connector.open_file(&copied, None).unwrap(),
        b"Quarterly report, final.\n"
    );

    let err = connector
        .copy_to(&reports, &docs, &CopyOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn test_remove_lists_drops_empty_group() {
    let mut connector = connector();
    let tasks = connector.resolve("Team/Lists/Tasks").unwrap();
    let contacts = connector.resolve("Team/Lists/Contacts").unwrap();

    connector.remove(&tasks).unwrap();
    assert!(!connector.exists("Team/Lists/Tasks").unwrap());
    assert!(connector.exists("Team/Lists").unwrap());

    connector.remove(&contacts).unwrap();
    let err = connector.resolve("Team/Lists").unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
}

#[test]
fn test_remove_item_stamps_list() {
    let mut connector = connector();
    let item = connector.resolve("Team/Lists/Tasks/1_").unwrap();
    connector.remove(&item).unwrap();

    let stamp: Timestamp = "2024-03-01T08:00:00Z".parse().unwrap();
    let team = connector.backend().root().site("Team").unwrap();
    let tasks = team.list("Lists/Tasks").unwrap();
    assert!(tasks.deleted.unwrap() > stamp);
    assert_eq!(tasks.items.len(), 1);
}

#[test]
fn test_failed_item_removal_keeps_list_stamp() {
    let mut connector = connector();
    let item = connector.resolve("Team/Lists/Tasks/1_").unwrap();
    connector.remove(&item).unwrap();
    let stamp = {
        let team = connector.backend().root().site("Team").unwrap();
        team.list("Lists/Tasks").unwrap().deleted
    };
    assert!(stamp.is_some());

    let err = connector.remove(&item).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
    let team = connector.backend().root().site("Team").unwrap();
    assert_eq!(team.list("Lists/Tasks").unwrap().deleted, stamp);
}

#[test]
fn test_remove_site_and_top_site() {
    let mut connector = connector();
    let apollo = connector.resolve("Projects/Apollo").unwrap();
    let projects = connector.resolve("Projects").unwrap();
    assert!(connector.has_children(&projects).unwrap());

    connector.remove(&apollo).unwrap();
    assert!(!connector.exists("Projects/Apollo").unwrap());
    assert!(!connector.has_children(&projects).unwrap());

    let root = connector.root().unwrap();
    let err = connector.remove(&root).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let group = connector.resolve("Lists").unwrap();
    let err = connector.remove(&group).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}

#[test]
fn test_mutations_are_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("site.json");
    std::fs::write(&path, SAMPLE_SITE).unwrap();

    let mut connector = Connector::new(MemoryBackend::open(&path).unwrap(), options());
    let docs = connector.resolve("Documents").unwrap();
    connector.add_file(&docs, "saved.txt", b"kept").unwrap();

    let mut reopened = Connector::new(MemoryBackend::open(&path).unwrap(), options());
    let file = reopened.resolve("Documents/saved.txt").unwrap();
    assert_eq!(reopened.open_file(&file, None).unwrap(), b"kept");
}
