//! Core domain logic for notegrove, a desktop note organizer.
//!
//! Folders contain notes, notes contain sub-notes to arbitrary depth; the
//! whole tree is persisted in SQLite and exposed to a view layer through
//! the addressable index protocol in [`tree::index_model`].

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod tree;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{FolderData, Node, NodeArena, NodeId, NodeKind, NodeTag, NoteData};
pub use repo::store::{
    FolderRow, NewNote, NoteRow, NoteStore, SqliteNoteStore, StoreError, StoreResult, TitleTarget,
};
pub use tree::index_model::{
    DisplayField, FieldValue, ItemFlags, ModelError, ModelIndex, TreeIndexModel, TreeModelEvent,
    COLUMN_COUNT,
};
pub use tree::materialize::load_tree;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
