//! Integration tests for the root-confined file store.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tempfile::tempdir;

use filevault_server::FileStore;
use filevault_server::error::StoreError;

fn new_store(dir: &Path) -> FileStore {
    let store = FileStore::new(dir.to_str().unwrap()).expect("create store");
    store.init().expect("init store");
    store
}

fn entry_names(store: &FileStore, logical: &str) -> Vec<String> {
    let mut names: Vec<String> = store
        .list(logical)
        .expect("list")
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn init_creates_missing_root() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("nested").join("vault");

    let store = FileStore::new(root.to_str().unwrap()).unwrap();
    store.init().unwrap();

    assert!(root.is_dir());
}

#[test]
fn init_fails_when_root_collides_with_a_file() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("occupied");
    fs::write(&root, b"not a directory").unwrap();

    let store = FileStore::new(root.to_str().unwrap()).unwrap();
    assert!(matches!(store.init(), Err(StoreError::Initialization(_))));
}

#[test]
fn empty_location_is_rejected_at_construction() {
    assert!(matches!(
        FileStore::new("   "),
        Err(StoreError::Initialization(_))
    ));
}

#[test]
fn load_resolves_root_and_existing_entries() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();

    let root = store.load("").unwrap();
    assert_eq!(root, dir.path().canonicalize().unwrap());

    let docs = store.load("docs").unwrap();
    assert_eq!(docs, root.join("docs"));

    // A leading slash is root-relative, not absolute
    assert_eq!(store.load("/docs").unwrap(), docs);
}

#[test]
fn load_of_missing_entry_is_not_found() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());

    assert!(matches!(
        store.load("ghost.txt"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn traversal_attempts_never_resolve_outside_the_root() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();

    // A sibling of the root that definitely exists
    fs::write(dir.path().parent().unwrap().join("outside.txt"), b"x").ok();

    for logical in ["..", "../", "docs/../..", "../outside.txt", "docs/../../etc"] {
        let result = store.load(logical);
        match result {
            Err(StoreError::InvalidRequest(_)) | Err(StoreError::NotFound(_)) => {}
            other => panic!("expected failure for {:?}, got {:?}", logical, other.ok()),
        }
    }

    // Lexically contained dot segments are fine
    assert!(store.load("./docs").is_ok());
}

#[test]
fn list_returns_immediate_children() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.upload("", "a.txt", b"alpha").unwrap();
    store.upload("docs", "nested.txt", b"nested").unwrap();

    let names = entry_names(&store, "");
    assert_eq!(names, vec!["a.txt", "docs"]);

    let entries = store.list("").unwrap();
    let docs = entries.iter().find(|e| e.name() == "docs").unwrap();
    assert!(docs.is_directory());
    let file = entries.iter().find(|e| e.name() == "a.txt").unwrap();
    assert!(!file.is_directory());
}

#[test]
fn list_is_idempotent_on_an_unchanged_directory() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"a").unwrap();
    store.upload("", "b.txt", b"b").unwrap();

    assert_eq!(entry_names(&store, ""), entry_names(&store, ""));
}

#[test]
fn list_rejects_non_directories_and_missing_paths() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"a").unwrap();

    assert!(matches!(
        store.list("a.txt"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(store.list("ghost"), Err(StoreError::NotFound(_))));
}

#[test]
fn upload_writes_and_overwrites_content() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());

    let path = store.upload("", "a.txt", b"first").unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"first");

    let path = store.upload("", "a.txt", b"second, longer").unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"second, longer");
}

#[test]
fn upload_validates_content_name_and_parent() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"a").unwrap();

    assert!(matches!(
        store.upload("", "empty.txt", b""),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.upload("", "", b"x"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.upload("", "../escape.txt", b"x"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.upload("a.txt", "b.txt", b"x"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.upload("ghost", "b.txt", b"x"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn load_resource_streams_file_content() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"hello world").unwrap();

    let mut resource = store.load_resource("a.txt").unwrap();
    assert_eq!(resource.len(), 11);

    let mut content = Vec::new();
    resource.read_to_end(&mut content).unwrap();
    assert_eq!(content, b"hello world");
}

#[test]
fn load_resource_supports_ranged_reads() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"hello world").unwrap();

    let mut resource = store.load_resource("a.txt").unwrap();
    resource.seek(SeekFrom::Start(6)).unwrap();
    let mut tail = String::new();
    resource.read_to_string(&mut tail).unwrap();
    assert_eq!(tail, "world");
}

#[test]
fn load_resource_rejects_directories_and_missing_files() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();

    assert!(matches!(
        store.load_resource("docs"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.load_resource("ghost.txt"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn create_directory_strips_trailing_dots() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());

    let created = store.create_directory("", "logs...").unwrap();
    assert_eq!(created.file_name().unwrap(), "logs");
    assert!(created.is_dir());

    assert!(matches!(
        store.create_directory("", "..."),
        Err(StoreError::InvalidRequest(_))
    ));
}

#[test]
fn create_directory_rejects_collisions_and_bad_parents() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.upload("", "a.txt", b"a").unwrap();

    assert!(matches!(
        store.create_directory("", "docs"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.create_directory("a.txt", "sub"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.create_directory("ghost", "sub"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn move_relocates_into_a_sibling_directory() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.create_directory("docs", "archive").unwrap();
    store.upload("docs", "a.txt", b"alpha").unwrap();

    let moved = store.move_entry("docs/a.txt", "archive").unwrap();
    assert_eq!(fs::read(&moved).unwrap(), b"alpha");
    assert_eq!(entry_names(&store, "docs"), vec!["archive"]);
    assert_eq!(entry_names(&store, "docs/archive"), vec!["a.txt"]);
}

#[test]
fn move_dot_sentinel_means_up_one_level() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.create_directory("docs", "inner").unwrap();
    store.upload("docs/inner", "a.txt", b"alpha").unwrap();

    // a.txt sits in docs/inner; "." targets docs
    let moved = store.move_entry("docs/inner/a.txt", ".").unwrap();
    assert_eq!(moved.parent().unwrap().file_name().unwrap(), "docs");
    assert_eq!(entry_names(&store, "docs/inner"), Vec::<String>::new());
}

#[test]
fn move_to_root_is_always_rejected() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.upload("docs", "b.txt", b"beta").unwrap();

    // b.txt's parent is docs, so "." computes the root as the target
    assert!(matches!(
        store.move_entry("docs/b.txt", "."),
        Err(StoreError::InvalidRequest(_))
    ));

    // An entry directly under the root has no level to move up to
    store.upload("", "top.txt", b"top").unwrap();
    assert!(matches!(
        store.move_entry("top.txt", "."),
        Err(StoreError::InvalidRequest(_))
    ));
}

#[test]
fn move_rejects_invalid_targets() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.upload("docs", "a.txt", b"alpha").unwrap();
    store.upload("docs", "plain.txt", b"plain").unwrap();

    assert!(matches!(
        store.move_entry("docs/a.txt", "ghost"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.move_entry("docs/a.txt", "plain.txt"),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.move_entry("docs/a.txt", "../.."),
        Err(StoreError::InvalidRequest(_))
    ));
}

#[test]
fn move_overwrites_a_same_named_entry() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.create_directory("docs", "archive").unwrap();
    store.upload("docs", "a.txt", b"new").unwrap();
    store.upload("docs/archive", "a.txt", b"old").unwrap();

    let moved = store.move_entry("docs/a.txt", "archive").unwrap();
    assert_eq!(fs::read(&moved).unwrap(), b"new");
    assert_eq!(entry_names(&store, "docs/archive"), vec!["a.txt"]);
}

#[test]
fn rename_replaces_the_name_in_place() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.upload("docs", "a.txt", b"alpha").unwrap();

    let renamed = store.rename("docs/a.txt", "b.txt").unwrap();
    assert_eq!(renamed.file_name().unwrap(), "b.txt");
    assert_eq!(fs::read(&renamed).unwrap(), b"alpha");
    assert_eq!(entry_names(&store, "docs"), vec!["b.txt"]);
}

#[test]
fn rename_never_clobbers_an_existing_sibling() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"alpha").unwrap();
    store.upload("", "b.txt", b"beta").unwrap();

    assert!(matches!(
        store.rename("a.txt", "b.txt"),
        Err(StoreError::InvalidRequest(_))
    ));
    // Both survive untouched
    assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"alpha");
    assert_eq!(fs::read(dir.path().join("b.txt")).unwrap(), b"beta");
}

#[test]
fn rename_strips_trailing_dots() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.upload("", "a.txt", b"alpha").unwrap();

    let renamed = store.rename("a.txt", "b.txt...").unwrap();
    assert_eq!(renamed.file_name().unwrap(), "b.txt");
}

#[test]
fn create_rename_delete_round_trip_leaves_parent_unchanged() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.upload("", "a.txt", b"a").unwrap();
    let before = entry_names(&store, "");

    store.create_directory("", "scratch").unwrap();
    store.rename("scratch", "renamed").unwrap();
    store.delete("renamed").unwrap();

    assert_eq!(entry_names(&store, ""), before);
}

#[test]
fn delete_removes_a_directory_tree() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    store.create_directory("", "docs").unwrap();
    store.create_directory("docs", "inner").unwrap();
    store.upload("docs", "a.txt", b"a").unwrap();
    store.upload("docs/inner", "b.txt", b"b").unwrap();

    store.delete("docs").unwrap();

    assert!(matches!(store.load("docs"), Err(StoreError::NotFound(_))));
    assert_eq!(entry_names(&store, ""), Vec::<String>::new());
}

#[test]
fn delete_of_missing_entry_is_not_found() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());

    assert!(matches!(store.delete("ghost"), Err(StoreError::NotFound(_))));
}

#[test]
fn full_scenario_create_upload_list_rename_move() {
    let dir = tempdir().unwrap();
    let store = new_store(dir.path());
    let root = dir.path().canonicalize().unwrap();

    let docs = store.create_directory("", "docs").unwrap();
    assert_eq!(docs, root.join("docs"));

    let uploaded = store.upload("docs", "a.txt", b"hello").unwrap();
    assert_eq!(uploaded, root.join("docs").join("a.txt"));

    assert_eq!(entry_names(&store, "docs"), vec!["a.txt"]);

    let renamed = store.rename("docs/a.txt", "b.txt").unwrap();
    assert_eq!(renamed, root.join("docs").join("b.txt"));

    // b.txt's containing directory is docs, whose parent is the root
    assert!(matches!(
        store.move_entry("docs/b.txt", "."),
        Err(StoreError::InvalidRequest(_))
    ));
}
