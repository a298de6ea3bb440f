//! Tree materializer: flat rows in, owned tree out.
//!
//! # Responsibility
//! - Fetch folders and notes from the gateway and reconstruct the
//!   recursive tree inside a fresh [`NodeArena`].
//!
//! # Invariants
//! - Folders attach to the synthetic root in storage insertion order.
//! - A node's parent handle is wired before it becomes reachable through
//!   the parent's children (arena insertion guarantees this).
//! - Traversal uses an explicit worklist, so nesting depth is bounded by
//!   the heap, not the call stack.

use crate::model::node::{FolderData, NodeArena, NodeId, NodeKind, NoteData};
use crate::repo::store::{NoteRow, NoteStore, StoreResult};
use log::info;

/// Loads the whole folder/note tree from `store`.
///
/// Returns a well-formed arena even when storage holds zero folders (the
/// synthetic root with no children). Any gateway failure propagates
/// unchanged.
pub fn load_tree(store: &dyn NoteStore) -> StoreResult<NodeArena> {
    let mut arena = NodeArena::new();
    let root = arena.root();

    // (parent handle, rows still to attach under it)
    let mut worklist: Vec<(NodeId, Vec<NoteRow>)> = Vec::new();

    for folder_row in store.fetch_folders()? {
        let top_level = store.fetch_top_level_notes(&folder_row.id)?;
        let folder = arena.insert(
            root,
            NodeKind::Folder(FolderData {
                id: folder_row.id,
                title: folder_row.title,
                created_at: folder_row.created_at,
                updated_at: folder_row.updated_at,
            }),
        );
        worklist.push((folder, top_level));
    }

    while let Some((parent, rows)) = worklist.pop() {
        for row in rows {
            // Skip the children query for leaves; mirrors the gateway's
            // count-before-descend access pattern.
            let children = if store.count_children(&row.id)? > 0 {
                store.fetch_child_notes(&row.id)?
            } else {
                Vec::new()
            };

            let note = arena.insert(
                parent,
                NodeKind::Note(NoteData {
                    id: row.id,
                    title: row.title,
                    body: row.body,
                    folder_id: row.folder_id,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }),
            );
            if !children.is_empty() {
                worklist.push((note, children));
            }
        }
    }

    info!(
        "event=tree_load module=tree status=ok nodes={}",
        arena.len() - 1
    );
    Ok(arena)
}
