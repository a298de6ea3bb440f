//! Folder/note persistence gateway and SQLite implementation.
//!
//! # Responsibility
//! - Provide flat CRUD operations over the `folders` and `notes` tables.
//! - Resolve the self-referencing `parent_note_id` link only as a query
//!   filter; reconstructing ownership edges is the materializer's job.
//!
//! # Invariants
//! - Child listings are deterministic: storage insertion order
//!   (`rowid ASC`).
//! - Every write is a single-statement commit; there is no batching.
//! - Generated note ids are UUIDv4 strings and are never reused.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by gateway operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from persistence gateway operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "row not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "note store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which table a title update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleTarget {
    Folder,
    Note,
}

/// Flat folder row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRow {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Flat note row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: String,
    pub title: String,
    pub body: String,
    pub folder_id: String,
    pub parent_note_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Insert request for one new note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub body: String,
    /// Enclosing folder, even when nested under another note.
    pub folder_id: String,
    /// `None` makes the note top-level in its folder.
    pub parent_note_id: Option<String>,
}

/// Flat persistence gateway for folders and notes.
pub trait NoteStore {
    /// Lists all folders in storage insertion order.
    fn fetch_folders(&self) -> StoreResult<Vec<FolderRow>>;
    /// Lists a folder's direct notes (`parent_note_id IS NULL`).
    fn fetch_top_level_notes(&self, folder_id: &str) -> StoreResult<Vec<NoteRow>>;
    /// Lists direct children of one note.
    fn fetch_child_notes(&self, parent_note_id: &str) -> StoreResult<Vec<NoteRow>>;
    /// Counts direct children of one note.
    fn count_children(&self, note_id: &str) -> StoreResult<u64>;
    /// Creates one folder and returns the stored row.
    fn insert_folder(&self, title: &str) -> StoreResult<FolderRow>;
    /// Creates one note and returns the stored row with generated id and
    /// timestamps.
    fn insert_note(&self, note: &NewNote) -> StoreResult<NoteRow>;
    /// Renames one folder or note title.
    fn update_title(&self, id: &str, target: TitleTarget, new_title: &str) -> StoreResult<()>;
}

/// SQLite-backed note store.
#[derive(Debug)]
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn fetch_folders(&self) -> StoreResult<Vec<FolderRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at, updated_at
             FROM folders
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(FolderRow {
                id: row.get(0)?,
                title: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            });
        }
        Ok(items)
    }

    fn fetch_top_level_notes(&self, folder_id: &str) -> StoreResult<Vec<NoteRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, body, folder_id, parent_note_id, created_at, updated_at
             FROM notes
             WHERE folder_id = ?1
               AND parent_note_id IS NULL
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([folder_id])?;
        collect_note_rows(&mut rows)
    }

    fn fetch_child_notes(&self, parent_note_id: &str) -> StoreResult<Vec<NoteRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, body, folder_id, parent_note_id, created_at, updated_at
             FROM notes
             WHERE parent_note_id = ?1
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([parent_note_id])?;
        collect_note_rows(&mut rows)
    }

    fn count_children(&self, note_id: &str) -> StoreResult<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE parent_note_id = ?1;",
            [note_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn insert_folder(&self, title: &str) -> StoreResult<FolderRow> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO folders (id, name) VALUES (?1, ?2);",
            params![id, title],
        )?;
        self.conn
            .query_row(
                "SELECT id, name, created_at, updated_at
                 FROM folders
                 WHERE id = ?1;",
                [id.as_str()],
                |row| {
                    Ok(FolderRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .map_err(Into::into)
    }

    fn insert_note(&self, note: &NewNote) -> StoreResult<NoteRow> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO notes (id, title, body, folder_id, parent_note_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id,
                note.title,
                note.body,
                note.folder_id,
                note.parent_note_id,
            ],
        )?;
        self.conn
            .query_row(
                "SELECT id, title, body, folder_id, parent_note_id, created_at, updated_at
                 FROM notes
                 WHERE id = ?1;",
                [id.as_str()],
                parse_note_row,
            )
            .map_err(Into::into)
    }

    fn update_title(&self, id: &str, target: TitleTarget, new_title: &str) -> StoreResult<()> {
        let sql = match target {
            TitleTarget::Folder => {
                "UPDATE folders
                 SET name = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;"
            }
            TitleTarget::Note => {
                "UPDATE notes
                 SET title = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;"
            }
        };
        let changed = self.conn.execute(sql, params![id, new_title])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn collect_note_rows(rows: &mut rusqlite::Rows<'_>) -> StoreResult<Vec<NoteRow>> {
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_note_row(row)?);
    }
    Ok(items)
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        title: row.get(1)?,
        // body column is nullable in the schema; absent means empty.
        body: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        folder_id: row.get(3)?,
        parent_note_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    const REQUIRED: &[(&str, &[&str])] = &[
        ("folders", &["id", "name", "created_at", "updated_at"]),
        (
            "notes",
            &[
                "id",
                "title",
                "body",
                "folder_id",
                "parent_note_id",
                "created_at",
                "updated_at",
            ],
        ),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
