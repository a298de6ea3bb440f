//! Arena-backed tree of folders and notes.
//!
//! # Responsibility
//! - Own every node of the materialized tree in one flat arena.
//! - Provide identity-based parent/child navigation without reference
//!   cycles.
//!
//! # Invariants
//! - Slot 0 is always the synthetic root; it is never handed out as a
//!   user-visible node.
//! - A node's `parent` handle is set at insertion time, before the node is
//!   attached to its parent's `children` list.
//! - `children` order is insertion order; row numbers are positional and
//!   never stored.

use serde::{Deserialize, Serialize};

/// Opaque handle to one node in a [`NodeArena`].
///
/// Compares by identity (arena slot), so two nodes with identical titles
/// are still distinguishable. Stable for the lifetime of one tree build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Display tag distinguishing folders from notes (decoration kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    Folder,
    Note,
}

/// Folder payload. Top-level container; its parent is always the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderData {
    /// Stable persistent id, immutable and globally unique.
    pub id: String,
    pub title: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Note payload. Nests under a folder or another note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteData {
    /// Stable persistent id, immutable and globally unique.
    pub id: String,
    pub title: String,
    pub body: String,
    /// Enclosing folder, denormalized up through the note chain.
    pub folder_id: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Tagged node variant. The synthetic root carries no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Folder(FolderData),
    Note(NoteData),
}

/// One arena entry: payload plus navigation edges.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Non-owning back-handle used only for upward navigation.
    pub parent: Option<NodeId>,
    /// Owned child handles in insertion order.
    pub children: Vec<NodeId>,
}

impl Node {
    /// Persistent id, `None` for the synthetic root.
    pub fn id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Folder(folder) => Some(&folder.id),
            NodeKind::Note(note) => Some(&note.id),
        }
    }

    /// User-facing title, `None` for the synthetic root.
    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Folder(folder) => Some(&folder.title),
            NodeKind::Note(note) => Some(&note.title),
        }
    }

    /// Decoration tag, `None` for the synthetic root.
    pub fn tag(&self) -> Option<NodeTag> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Folder(_) => Some(NodeTag::Folder),
            NodeKind::Note(_) => Some(NodeTag::Note),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }
}

/// Flat arena that owns one whole tree build.
///
/// Nodes are only ever appended; a full reload replaces the arena
/// wholesale rather than removing slots, so handles stay valid for the
/// lifetime of the build that issued them.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Creates an arena holding only the synthetic root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Handle of the synthetic root (slot 0).
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Inserts a node under `parent` and returns its handle.
    ///
    /// The back-reference is wired before the child becomes reachable
    /// through `parent.children`, so no reader can observe an attached
    /// child with an unset parent.
    pub fn insert(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        debug_assert!(parent.0 < self.nodes.len(), "parent handle out of arena");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Total node count including the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // Slot 0 always exists; "empty" means no domain nodes.
        self.nodes.len() <= 1
    }

    /// Positional row of `id` inside its parent's children.
    ///
    /// Resolved by identity scan of the handle, never by field values, so
    /// siblings with identical titles resolve correctly. `None` for the
    /// root and for handles outside the arena.
    pub fn row_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self.get(parent)?
            .children
            .iter()
            .position(|child| *child == id)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{FolderData, NodeArena, NodeKind, NodeTag, NoteData};

    fn folder(id: &str, title: &str) -> NodeKind {
        NodeKind::Folder(FolderData {
            id: id.to_string(),
            title: title.to_string(),
            created_at: 0,
            updated_at: 0,
        })
    }

    fn note(id: &str, title: &str) -> NodeKind {
        NodeKind::Note(NoteData {
            id: id.to_string(),
            title: title.to_string(),
            body: String::new(),
            folder_id: "f1".to_string(),
            created_at: 0,
            updated_at: 0,
        })
    }

    #[test]
    fn insert_wires_parent_and_row() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let f = arena.insert(root, folder("f1", "Inbox"));
        let a = arena.insert(f, note("n1", "A"));
        let b = arena.insert(f, note("n2", "B"));

        assert_eq!(arena.get(a).unwrap().parent, Some(f));
        assert_eq!(arena.get(f).unwrap().children, vec![a, b]);
        assert_eq!(arena.row_of(a), Some(0));
        assert_eq!(arena.row_of(b), Some(1));
        assert_eq!(arena.row_of(root), None);
    }

    #[test]
    fn row_of_distinguishes_identical_titles() {
        let mut arena = NodeArena::new();
        let f = arena.insert(arena.root(), folder("f1", "Inbox"));
        let first = arena.insert(f, note("n1", "Duplicate"));
        let second = arena.insert(f, note("n2", "Duplicate"));

        assert_eq!(arena.row_of(first), Some(0));
        assert_eq!(arena.row_of(second), Some(1));
    }

    #[test]
    fn node_accessors_hide_the_root() {
        let mut arena = NodeArena::new();
        let f = arena.insert(arena.root(), folder("f1", "Inbox"));

        let root = arena.get(arena.root()).unwrap();
        assert!(root.is_root());
        assert_eq!(root.id(), None);
        assert_eq!(root.tag(), None);

        let folder_node = arena.get(f).unwrap();
        assert_eq!(folder_node.id(), Some("f1"));
        assert_eq!(folder_node.title(), Some("Inbox"));
        assert_eq!(folder_node.tag(), Some(NodeTag::Folder));
    }
}
