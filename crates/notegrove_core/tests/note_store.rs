use notegrove_core::{
    open_db_in_memory, NewNote, NoteStore, SqliteNoteStore, StoreError, TitleTarget,
};

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn new_note(title: &str, folder_id: &str, parent: Option<&str>) -> NewNote {
    NewNote {
        title: title.to_string(),
        body: format!("{title} body"),
        folder_id: folder_id.to_string(),
        parent_note_id: parent.map(str::to_string),
    }
}

#[test]
fn insert_folder_returns_stored_row() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let folder = store.insert_folder("Inbox").unwrap();
    assert!(!folder.id.is_empty());
    assert_eq!(folder.title, "Inbox");
    assert!(folder.created_at > 0);

    let folders = store.fetch_folders().unwrap();
    assert_eq!(folders, vec![folder]);
}

#[test]
fn folders_list_in_insertion_order() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let first = store.insert_folder("First").unwrap();
    let second = store.insert_folder("Second").unwrap();
    let third = store.insert_folder("Third").unwrap();

    let ids: Vec<String> = store
        .fetch_folders()
        .unwrap()
        .into_iter()
        .map(|folder| folder.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn top_level_and_child_queries_are_disjoint() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let folder = store.insert_folder("Inbox").unwrap();
    let top = store.insert_note(&new_note("Top", &folder.id, None)).unwrap();
    let child = store
        .insert_note(&new_note("Child", &folder.id, Some(&top.id)))
        .unwrap();

    let top_level = store.fetch_top_level_notes(&folder.id).unwrap();
    assert_eq!(top_level.len(), 1);
    assert_eq!(top_level[0].id, top.id);
    assert_eq!(top_level[0].parent_note_id, None);

    let children = store.fetch_child_notes(&top.id).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);
    assert_eq!(children[0].folder_id, folder.id);

    assert_eq!(store.count_children(&top.id).unwrap(), 1);
    assert_eq!(store.count_children(&child.id).unwrap(), 0);
}

#[test]
fn insert_note_generates_unique_ids_and_timestamps() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let folder = store.insert_folder("Inbox").unwrap();
    let a = store.insert_note(&new_note("A", &folder.id, None)).unwrap();
    let b = store.insert_note(&new_note("B", &folder.id, None)).unwrap();

    assert_ne!(a.id, b.id);
    assert!(a.created_at > 0);
    assert_eq!(a.body, "A body");
}

#[test]
fn update_title_targets_the_right_table() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let folder = store.insert_folder("Inbox").unwrap();
    let note = store.insert_note(&new_note("Old", &folder.id, None)).unwrap();

    store
        .update_title(&folder.id, TitleTarget::Folder, "Archive")
        .unwrap();
    store
        .update_title(&note.id, TitleTarget::Note, "New")
        .unwrap();

    assert_eq!(store.fetch_folders().unwrap()[0].title, "Archive");
    assert_eq!(store.fetch_top_level_notes(&folder.id).unwrap()[0].title, "New");
}

#[test]
fn update_title_on_missing_row_is_not_found() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let err = store
        .update_title("nope", TitleTarget::Note, "Title")
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteNoteStore::try_new(&conn).unwrap_err();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection { actual_version: 0, .. }
    ));
}

// `unwrap`/`unwrap_err` on try_new results need the store to be Debug.
#[test]
fn store_is_debug_formattable() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    assert!(format!("{store:?}").contains("SqliteNoteStore"));
}

#[test]
fn note_row_serializes_with_schema_field_names() {
    let conn = setup();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let folder = store.insert_folder("Inbox").unwrap();
    let note = store.insert_note(&new_note("A", &folder.id, None)).unwrap();

    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(json["folder_id"], folder.id);
    assert_eq!(json["parent_note_id"], serde_json::Value::Null);
}
