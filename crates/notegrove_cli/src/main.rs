//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notegrove_core` wiring end to end without a GUI: open an
//!   in-memory database, seed a small tree, and dump it through the index
//!   protocol.
//! - Keep output deterministic for quick local sanity checks.

use notegrove_core::{
    open_db_in_memory, DisplayField, ModelIndex, NewNote, NoteStore, SqliteNoteStore,
    TreeIndexModel,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("notegrove_cli failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    seed(&SqliteNoteStore::try_new(&conn)?)?;

    let model = TreeIndexModel::load(SqliteNoteStore::try_new(&conn)?)?;
    println!("notegrove_core version={}", notegrove_core::core_version());
    println!("header[0]={}", model.header_label(0).unwrap_or("?"));
    print_tree(&model);
    Ok(())
}

fn seed(store: &SqliteNoteStore<'_>) -> Result<(), notegrove_core::StoreError> {
    let folder = store.insert_folder("Test Folder")?;
    let parent1 = store.insert_note(&NewNote {
        title: "Parent1".to_string(),
        body: "Parent1 description".to_string(),
        folder_id: folder.id.clone(),
        parent_note_id: None,
    })?;
    store.insert_note(&NewNote {
        title: "Parent2".to_string(),
        body: "Parent2 description".to_string(),
        folder_id: folder.id.clone(),
        parent_note_id: None,
    })?;
    store.insert_note(&NewNote {
        title: "Child1".to_string(),
        body: "Child1 description".to_string(),
        folder_id: folder.id.clone(),
        parent_note_id: Some(parent1.id.clone()),
    })?;
    let child2 = store.insert_note(&NewNote {
        title: "Child2".to_string(),
        body: "Child2 description".to_string(),
        folder_id: folder.id.clone(),
        parent_note_id: Some(parent1.id),
    })?;
    store.insert_note(&NewNote {
        title: "Grandchild1".to_string(),
        body: "Grandchild1 description".to_string(),
        folder_id: folder.id,
        parent_note_id: Some(child2.id),
    })?;
    Ok(())
}

fn print_tree(model: &TreeIndexModel<SqliteNoteStore<'_>>) {
    // Depth-first dump through the same protocol a view would poll.
    let mut stack: Vec<(ModelIndex, usize)> = Vec::new();
    push_children(model, None, 0, &mut stack);
    while let Some((index, depth)) = stack.pop() {
        if let Some(title) = model
            .data(index, DisplayField::DisplayTitle)
            .and_then(|value| value.as_text().map(str::to_string))
        {
            println!("{}- {title}", "  ".repeat(depth));
        }
        push_children(model, Some(index), depth + 1, &mut stack);
    }
}

// Rows are pushed in reverse so the stack pops them in display order.
fn push_children(
    model: &TreeIndexModel<SqliteNoteStore<'_>>,
    parent: Option<ModelIndex>,
    depth: usize,
    stack: &mut Vec<(ModelIndex, usize)>,
) {
    for row in (0..model.row_count(parent)).rev() {
        if let Some(index) = model.index(row, 0, parent) {
            stack.push((index, depth));
        }
    }
}
