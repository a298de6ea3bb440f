//! Addressable tree-index adapter over the materialized folder/note tree.
//!
//! # Responsibility
//! - Expose the tree through a (row, column, handle) index protocol that a
//!   view layer polls synchronously.
//! - Maintain the id → address identity index alongside the tree.
//! - Frame every structural mutation with the matching notification pair.
//!
//! # Invariants
//! - Read-path queries degrade to empty results on invalid addresses and
//!   log a diagnostic; they never panic or abort.
//! - Write paths persist before touching the in-memory tree; a storage
//!   failure leaves the tree unchanged.
//! - Tree and identity index mutate within the same `&mut self` call, so
//!   no caller can observe one without the other.
//! - Addresses carry the generation of the tree build that issued them;
//!   a full reload invalidates every previously issued address.

use crate::model::node::{Node, NodeArena, NodeId, NodeKind, NodeTag, NoteData};
use crate::repo::store::{NewNote, NoteStore, StoreError, TitleTarget};
use crate::tree::materialize::load_tree;
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The protocol is single-column; display fields are selected by
/// [`DisplayField`], not by extra columns.
pub const COLUMN_COUNT: usize = 1;

/// Header label for column 0.
const TITLE_HEADER: &str = "Title";

/// Address handed to the view: positional row plus an opaque node handle.
///
/// Column is fixed at 0 and not stored. `generation` ties the address to
/// one tree build; addresses from before a reload are rejected instead of
/// silently denoting whatever now occupies the arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    node: NodeId,
    generation: u64,
}

impl ModelIndex {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        0
    }

    /// Opaque handle to the denoted node. Equal iff same node of the same
    /// tree build.
    pub fn node_handle(&self) -> NodeId {
        self.node
    }
}

/// Field selector for [`TreeIndexModel::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayField {
    /// Title shown in the tree column.
    DisplayTitle,
    /// Stable persistent id.
    Identifier,
    /// Title as presented to an inline editor.
    EditTitle,
    /// Tag distinguishing folders from notes.
    DecorationKind,
}

/// Value returned by [`TreeIndexModel::data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Decoration(NodeTag),
}

impl FieldValue {
    /// Text payload, `None` for decoration values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Decoration(_) => None,
        }
    }
}

/// Interaction capabilities of one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    pub enabled: bool,
    pub selectable: bool,
    pub editable: bool,
}

impl ItemFlags {
    /// No capabilities; returned for invalid addresses.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every live node is enabled, selectable and title-editable.
    pub fn interactive() -> Self {
        Self {
            enabled: true,
            selectable: true,
            editable: true,
        }
    }
}

/// Change notifications delivered synchronously to subscribers.
///
/// Insert and reset events come in about-to/done pairs framing the
/// in-memory mutation; `DataChanged` is emitted after the fact for
/// in-place edits.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeModelEvent {
    RowsAboutToBeInserted {
        /// `None` means the synthetic root.
        parent: Option<ModelIndex>,
        first: usize,
        last: usize,
    },
    RowsInserted,
    ModelAboutToBeReset,
    ModelReset,
    DataChanged {
        top_left: ModelIndex,
        bottom_right: ModelIndex,
        fields: Vec<DisplayField>,
    },
}

/// Errors from write-path operations.
#[derive(Debug)]
pub enum ModelError {
    /// Supplied title is empty after trimming.
    InvalidTitle,
    /// Address does not denote a live node of the current tree build.
    StaleAddress,
    /// Persistence write or reload failed.
    Store(StoreError),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::StaleAddress => write!(f, "address does not denote a live node"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ModelError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

type Subscriber = Box<dyn FnMut(&TreeModelEvent)>;

/// Tree-index adapter: owns the arena, the identity index and the event
/// subscribers.
///
/// All operations run on the caller's thread and never yield mid-call;
/// `&mut self` write paths are serialized by the borrow checker.
pub struct TreeIndexModel<S: NoteStore> {
    store: S,
    arena: NodeArena,
    /// id → most recently issued address. Rebuilt wholesale on refresh,
    /// extended by exactly one entry on insert.
    identity: HashMap<String, ModelIndex>,
    generation: u64,
    subscribers: Vec<Subscriber>,
}

impl<S: NoteStore> TreeIndexModel<S> {
    /// Materializes the tree from `store` and builds the identity index.
    pub fn load(store: S) -> Result<Self, StoreError> {
        let arena = load_tree(&store)?;
        let mut model = Self {
            store,
            arena,
            identity: HashMap::new(),
            generation: 0,
            subscribers: Vec::new(),
        };
        model.rebuild_identity_index();
        Ok(model)
    }

    /// Registers a synchronous observer for change notifications.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&TreeModelEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Number of children of the denoted node; `None` means the root.
    ///
    /// Invalid addresses degrade to 0.
    pub fn row_count(&self, parent: Option<ModelIndex>) -> usize {
        match self.resolve_container(parent) {
            Some(node_id) => self
                .arena
                .get(node_id)
                .map_or(0, |node| node.children.len()),
            None => 0,
        }
    }

    /// Always [`COLUMN_COUNT`]; the hierarchy is single-column.
    pub fn column_count(&self, _parent: Option<ModelIndex>) -> usize {
        COLUMN_COUNT
    }

    /// Constructs the address of the `row`-th child under `parent`.
    ///
    /// Returns `None` for column ≠ 0, out-of-bounds rows, or an invalid
    /// parent address.
    pub fn index(&self, row: usize, column: usize, parent: Option<ModelIndex>) -> Option<ModelIndex> {
        if column >= COLUMN_COUNT {
            warn!("event=bad_address module=tree reason=column_out_of_range column={column}");
            return None;
        }
        let parent_id = self.resolve_container(parent)?;
        let child = *self.arena.get(parent_id)?.children.get(row)?;
        Some(self.make_index(child, row))
    }

    /// Address of the denoted node's parent, `None` when the parent is
    /// the root or the address is invalid.
    ///
    /// The parent's own row is resolved by identity scan of the
    /// grandparent's children, so siblings sharing field values cannot be
    /// confused.
    pub fn parent(&self, index: ModelIndex) -> Option<ModelIndex> {
        let node = self.resolve(index)?;
        let parent_id = node.parent?;
        let parent_node = self.arena.get(parent_id)?;
        if parent_node.is_root() {
            return None;
        }
        let row = self.arena.row_of(parent_id)?;
        Some(self.make_index(parent_id, row))
    }

    /// Field value for the denoted node, `None` on invalid input.
    pub fn data(&self, index: ModelIndex, field: DisplayField) -> Option<FieldValue> {
        let node = self.resolve(index)?;
        match field {
            DisplayField::DisplayTitle | DisplayField::EditTitle => node
                .title()
                .map(|title| FieldValue::Text(title.to_string())),
            DisplayField::Identifier => node.id().map(|id| FieldValue::Text(id.to_string())),
            DisplayField::DecorationKind => node.tag().map(FieldValue::Decoration),
        }
    }

    /// Interaction flags; [`ItemFlags::none`] for invalid addresses.
    pub fn flags(&self, index: ModelIndex) -> ItemFlags {
        if self.resolve(index).is_some() {
            ItemFlags::interactive()
        } else {
            ItemFlags::none()
        }
    }

    /// Header label, `Some("Title")` for column 0 only.
    pub fn header_label(&self, column: usize) -> Option<&'static str> {
        (column == 0).then_some(TITLE_HEADER)
    }

    /// Detail text for the side pane: a note's body, or a synthesized
    /// summary for folders.
    pub fn details(&self, index: ModelIndex) -> Option<String> {
        let node = self.resolve(index)?;
        match &node.kind {
            NodeKind::Note(note) => Some(note.body.clone()),
            NodeKind::Folder(folder) => Some(format!(
                "Folder: {}\nContains {} items",
                folder.title,
                node.children.len()
            )),
            NodeKind::Root => None,
        }
    }

    /// Persistent id of the first child under `parent`, used for
    /// expand-to-node navigation.
    pub fn first_child_id(&self, parent: Option<ModelIndex>) -> Option<String> {
        let parent_id = self.resolve_container(parent)?;
        let first = *self.arena.get(parent_id)?.children.first()?;
        self.arena.get(first)?.id().map(str::to_string)
    }

    /// O(1) identity-index lookup. Unknown ids are `None`, not an error.
    pub fn lookup_by_id(&self, id: &str) -> Option<ModelIndex> {
        self.identity.get(id).copied()
    }

    /// Creates a note under `parent` (a folder or another note), appended
    /// at the last sibling position.
    ///
    /// Persists first, then frames the in-memory append with
    /// about-to-insert/inserted notifications and extends the identity
    /// index. If the storage insert succeeds the write is not rolled back
    /// by later failures; the tree reconverges on the next [`refresh`].
    ///
    /// [`refresh`]: Self::refresh
    pub fn create_note(
        &mut self,
        parent: ModelIndex,
        title: &str,
        body: &str,
    ) -> Result<ModelIndex, ModelError> {
        let title = normalize_title(title)?;
        let (parent_node_id, new_note) = {
            let node = self.resolve_for_write(parent)?;
            let request = match &node.kind {
                NodeKind::Folder(folder) => NewNote {
                    title,
                    body: body.to_string(),
                    folder_id: folder.id.clone(),
                    parent_note_id: None,
                },
                NodeKind::Note(note) => NewNote {
                    title,
                    body: body.to_string(),
                    // folder_id stays denormalized down the chain
                    folder_id: note.folder_id.clone(),
                    parent_note_id: Some(note.id.clone()),
                },
                NodeKind::Root => return Err(ModelError::StaleAddress),
            };
            (parent.node, request)
        };

        let row = self.store.insert_note(&new_note)?;

        let position = self
            .arena
            .get(parent_node_id)
            .map_or(0, |node| node.children.len());
        self.emit(TreeModelEvent::RowsAboutToBeInserted {
            parent: Some(parent),
            first: position,
            last: position,
        });

        let note_id = row.id.clone();
        let node_id = self.arena.insert(
            parent_node_id,
            NodeKind::Note(NoteData {
                id: row.id,
                title: row.title,
                body: row.body,
                folder_id: row.folder_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            }),
        );
        let index = self.make_index(node_id, position);
        self.identity.insert(note_id.clone(), index);

        self.emit(TreeModelEvent::RowsInserted);
        info!("event=note_created module=tree status=ok id={note_id} row={position}");
        Ok(index)
    }

    /// Renames the denoted folder or note.
    ///
    /// Persists first; a storage failure leaves the in-memory node
    /// unchanged. Emits a data-changed notification scoped to the single
    /// address on success.
    pub fn rename_title(&mut self, index: ModelIndex, new_title: &str) -> Result<(), ModelError> {
        let title = normalize_title(new_title)?;
        let (id, target) = {
            let node = self.resolve_for_write(index)?;
            match &node.kind {
                NodeKind::Folder(folder) => (folder.id.clone(), TitleTarget::Folder),
                NodeKind::Note(note) => (note.id.clone(), TitleTarget::Note),
                NodeKind::Root => return Err(ModelError::StaleAddress),
            }
        };

        self.store.update_title(&id, target, &title)?;

        if let Some(node) = self.arena.get_mut(index.node) {
            match &mut node.kind {
                NodeKind::Folder(folder) => folder.title = title,
                NodeKind::Note(note) => note.title = title,
                NodeKind::Root => {}
            }
        }

        self.emit(TreeModelEvent::DataChanged {
            top_left: index,
            bottom_right: index,
            fields: vec![DisplayField::DisplayTitle, DisplayField::EditTitle],
        });
        info!("event=title_renamed module=tree status=ok id={id}");
        Ok(())
    }

    /// Discards the tree and identity index and rebuilds both from
    /// storage, bracketed by reset notifications.
    ///
    /// The replacement tree is loaded before any framing is emitted, so a
    /// storage failure leaves the current tree intact and the view
    /// unnotified.
    pub fn refresh(&mut self) -> Result<(), ModelError> {
        let arena = load_tree(&self.store)?;

        self.emit(TreeModelEvent::ModelAboutToBeReset);
        self.arena = arena;
        self.generation += 1;
        self.rebuild_identity_index();
        self.emit(TreeModelEvent::ModelReset);

        info!(
            "event=tree_refresh module=tree status=ok generation={} nodes={}",
            self.generation,
            self.arena.len() - 1
        );
        Ok(())
    }

    fn emit(&mut self, event: TreeModelEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    /// One pre-order walk writing id → address for every folder and note.
    fn rebuild_identity_index(&mut self) {
        self.identity.clear();
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        if let Some(root) = self.arena.get(self.arena.root()) {
            stack.extend(root.children.iter().enumerate().map(|(row, id)| (*id, row)));
        }
        while let Some((node_id, row)) = stack.pop() {
            if let Some(node) = self.arena.get(node_id) {
                if let Some(id) = node.id() {
                    self.identity
                        .insert(id.to_string(), self.make_index(node_id, row));
                }
                stack.extend(node.children.iter().enumerate().map(|(r, id)| (*id, r)));
            }
        }
    }

    fn make_index(&self, node: NodeId, row: usize) -> ModelIndex {
        ModelIndex {
            row,
            node,
            generation: self.generation,
        }
    }

    /// Read-path address check: generation, arena bounds, not the root.
    /// Failures log a diagnostic and yield `None`.
    fn resolve(&self, index: ModelIndex) -> Option<&Node> {
        if index.generation != self.generation {
            warn!(
                "event=bad_address module=tree reason=stale_generation got={} current={}",
                index.generation, self.generation
            );
            return None;
        }
        let Some(node) = self.arena.get(index.node) else {
            warn!("event=bad_address module=tree reason=handle_out_of_arena");
            return None;
        };
        if node.is_root() {
            // A view should never hold an address for the synthetic root;
            // this is an internal-invariant violation, not user error.
            warn!("event=bad_address module=tree reason=root_handle");
            return None;
        }
        Some(node)
    }

    /// Write-path address check; same rules as [`resolve`](Self::resolve)
    /// but surfaced as an error.
    fn resolve_for_write(&self, index: ModelIndex) -> Result<&Node, ModelError> {
        self.resolve(index).ok_or(ModelError::StaleAddress)
    }

    /// Maps an optional parent address to a container handle; `None`
    /// input means the synthetic root.
    fn resolve_container(&self, parent: Option<ModelIndex>) -> Option<NodeId> {
        match parent {
            None => Some(self.arena.root()),
            Some(index) => {
                self.resolve(index)?;
                Some(index.node)
            }
        }
    }
}

fn normalize_title(title: &str) -> Result<String, ModelError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ModelError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}
