//! Pure hierarchy utilities over a flat todo sequence.
//!
//! Sequence order is the sole encoding of the two-level hierarchy: a block is
//! a top-level item plus its contiguous run of indent-1 followers. Everything
//! here is stateless; mutation entry points live in `ops::todo_ops`.

use crate::model::todo::{Section, Todo};

/// Error type for drag-and-drop validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cannot drop an item onto itself")]
    SameItem,
    #[error("item not found: {0}")]
    NotFound(u64),
    #[error("cannot move an item across completion sections")]
    CrossSection,
    #[error("cannot drop an item into its own subtree")]
    IntoOwnSubtree,
}

/// Position of `id` in the full sequence.
pub fn position_of(todos: &[Todo], id: u64) -> Option<usize> {
    todos.iter().position(|t| t.id == id)
}

/// Derived completion section of the item with `id`.
///
/// A top-level item is `Completed` only while it and every child in its block
/// are completed. A child is `Completed` only while it and its nearest
/// preceding top-level item are completed; a front-orphan child is judged as
/// top-level. Unknown ids and un-completed items are `Active`.
pub fn effective_section(todos: &[Todo], id: u64) -> Section {
    let Some(idx) = position_of(todos, id) else {
        return Section::Active;
    };
    let item = &todos[idx];
    if !item.completed {
        return Section::Active;
    }
    if item.indent == 0 {
        for child in todos[idx + 1..].iter().take_while(|t| t.is_child()) {
            if !child.completed {
                return Section::Active;
            }
        }
        Section::Completed
    } else {
        match todos[..idx].iter().rev().find(|t| !t.is_child()) {
            Some(parent) if parent.completed => Section::Completed,
            Some(_) => Section::Active,
            None => Section::Completed,
        }
    }
}

/// Whether `target_id` sits inside the block that starts at `source_id`.
///
/// True iff the target comes after the source, is more deeply indented, lives
/// in the same effective section, and no intervening item at the source's
/// level (or above) breaks the chain. Self-comparison and reversed order are
/// false.
pub fn is_descendant_of(source_id: u64, target_id: u64, todos: &[Todo]) -> bool {
    if source_id == target_id {
        return false;
    }
    let (Some(src), Some(tgt)) = (position_of(todos, source_id), position_of(todos, target_id))
    else {
        return false;
    };
    if tgt <= src {
        return false;
    }
    let source_indent = todos[src].indent;
    if todos[tgt].indent <= source_indent {
        return false;
    }
    if effective_section(todos, source_id) != effective_section(todos, target_id) {
        return false;
    }
    todos[src + 1..tgt].iter().all(|t| t.indent > source_indent)
}

/// The block starting at `start`: a clone of the items plus the exclusive end
/// index. A top-level item carries its contiguous indent-1 run; a child item
/// is a block of one.
///
/// `start` must be in range.
pub fn extract_block(todos: &[Todo], start: usize) -> (Vec<Todo>, usize) {
    let end = block_end(todos, start);
    (todos[start..end].to_vec(), end)
}

/// Exclusive end index of the block starting at `start`.
pub fn block_end(todos: &[Todo], start: usize) -> usize {
    let mut end = start + 1;
    if !todos[start].is_child() {
        while end < todos.len() && todos[end].is_child() {
            end += 1;
        }
    }
    end
}

/// Splice `block` into the sequence at `at` (clamped to the sequence end).
pub fn insert_block(todos: &mut Vec<Todo>, block: Vec<Todo>, at: usize) {
    let at = at.min(todos.len());
    todos.splice(at..at, block);
}

/// Remove and return the items in `start..end`.
pub fn remove_block_range(todos: &mut Vec<Todo>, start: usize, end: usize) -> Vec<Todo> {
    todos.drain(start..end.min(todos.len())).collect()
}

/// Promote the item at `index` to top-level if it is a child with no
/// top-level item anywhere before it. Runs after block moves so the front of
/// the list never holds a parentless child.
pub fn repair_orphaned_child(todos: &mut [Todo], index: usize) {
    if index >= todos.len() || !todos[index].is_child() {
        return;
    }
    let has_parent = todos[..index].iter().any(|t| !t.is_child());
    if !has_parent {
        todos[index].indent = 0;
        todos[index].parent_id = None;
    }
}

/// Re-derive every child's parent link from the sequence: each indent-1 item
/// points at the nearest preceding top-level item, or None when nothing
/// precedes it. Top-level items always carry None.
pub fn relink_children(todos: &mut [Todo]) {
    let mut current_parent: Option<u64> = None;
    for todo in todos.iter_mut() {
        if todo.is_child() {
            todo.parent_id = current_parent;
        } else {
            current_parent = Some(todo.id);
            todo.parent_id = None;
        }
    }
}

/// Index of the last item whose effective section matches, scanning from the
/// end. None if the section is empty.
pub fn last_index_in_section(todos: &[Todo], section: Section) -> Option<usize> {
    (0..todos.len())
        .rev()
        .find(|&i| effective_section(todos, todos[i].id) == section)
}

/// Children may only attach under a parent in the same completion section.
pub fn can_attach_child(parent_section: Section, child_section: Section) -> bool {
    parent_section == child_section
}

/// Validate a drag-and-drop block move. Rejects self-drops, unknown ids,
/// cross-section drops, and dropping a parent into its own subtree.
pub fn validate_block_move(source_id: u64, target_id: u64, todos: &[Todo]) -> Result<(), MoveError> {
    if source_id == target_id {
        return Err(MoveError::SameItem);
    }
    if position_of(todos, source_id).is_none() {
        return Err(MoveError::NotFound(source_id));
    }
    if position_of(todos, target_id).is_none() {
        return Err(MoveError::NotFound(target_id));
    }
    if effective_section(todos, source_id) != effective_section(todos, target_id) {
        return Err(MoveError::CrossSection);
    }
    if is_descendant_of(source_id, target_id, todos) {
        return Err(MoveError::IntoOwnSubtree);
    }
    Ok(())
}
