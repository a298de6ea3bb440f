use notegrove_core::db::migrations::latest_version;
use notegrove_core::{open_db, open_db_in_memory};

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let column_name: String = row.get(1).unwrap();
        columns.push(column_name);
    }
    columns
}

#[test]
fn migration_creates_folders_and_notes_tables() {
    let conn = open_db_in_memory().unwrap();

    for table in ["folders", "notes"] {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1, "table `{table}` should exist");
    }

    let folder_columns = table_columns(&conn, "folders");
    for column in ["id", "name", "created_at", "updated_at"] {
        assert!(folder_columns.contains(&column.to_string()));
    }

    let note_columns = table_columns(&conn, "notes");
    for column in [
        "id",
        "title",
        "body",
        "folder_id",
        "parent_note_id",
        "created_at",
        "updated_at",
    ] {
        assert!(note_columns.contains(&column.to_string()));
    }
}

#[test]
fn user_version_matches_latest_migration() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn reopening_a_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite");

    let first = open_db(&path).unwrap();
    drop(first);
    let second = open_db(&path).unwrap();

    let version: u32 = second
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn deleting_a_folder_cascades_to_its_notes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO folders (id, name) VALUES ('f1', 'Inbox');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO notes (id, title, body, folder_id, parent_note_id)
         VALUES ('n1', 'Top', '', 'f1', NULL);",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO notes (id, title, body, folder_id, parent_note_id)
         VALUES ('n2', 'Nested', '', 'f1', 'n1');",
        [],
    )
    .unwrap();

    conn.execute("DELETE FROM folders WHERE id = 'f1';", [])
        .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}
