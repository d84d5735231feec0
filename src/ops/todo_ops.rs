//! Mutation primitives over a todo sequence.
//!
//! Every mutator reports whether it changed anything so the session layer
//! can map change onto save scheduling; boundary cases (unknown id, clamp
//! limits, only remaining item) are defined no-ops, never errors.

use crate::model::todo::{IdAlloc, MAX_INDENT, Section, Todo, clamp_indent};
use crate::ops::hierarchy::{
    block_end, effective_section, extract_block, insert_block, position_of, relink_children,
    remove_block_range, repair_orphaned_child, validate_block_move,
};

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

/// Append a new item and return its id.
pub fn add_todo(
    todos: &mut Vec<Todo>,
    ids: &mut IdAlloc,
    text: impl Into<String>,
    indent: u8,
) -> u64 {
    let id = ids.allocate();
    let mut todo = Todo::new(id, text);
    todo.indent = clamp_indent(indent);
    if todo.is_child() {
        todo.parent_id = todos.iter().rev().find(|t| !t.is_child()).map(|t| t.id);
    }
    todos.push(todo);
    id
}

/// Insert a new item immediately after `index`, inheriting the base item's
/// indent (and, for a child base, its parent). Returns the new id.
///
/// `index` must be in range.
pub fn insert_below(
    todos: &mut Vec<Todo>,
    ids: &mut IdAlloc,
    index: usize,
    text: impl Into<String>,
) -> u64 {
    let id = ids.allocate();
    let base = &todos[index];
    let mut todo = Todo::new(id, text);
    todo.indent = clamp_indent(base.indent);
    if base.is_child() {
        todo.parent_id = base.parent_id;
    }
    todos.insert(index + 1, todo);
    // a top-level insert mid-block splits the block; re-derive the links
    relink_children(todos);
    id
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

/// Replace an item's text. Returns false (no save) when nothing changed.
pub fn update_text(todos: &mut [Todo], id: u64, text: &str) -> bool {
    let Some(idx) = position_of(todos, id) else {
        return false;
    };
    if todos[idx].text == text {
        return false;
    }
    todos[idx].text = text.to_string();
    true
}

/// Flip an item's completed flag. Toggling a top-level item cascades the new
/// value to every child in its block so the block changes section as a unit.
pub fn toggle_completion(todos: &mut [Todo], id: u64) -> bool {
    let Some(idx) = position_of(todos, id) else {
        return false;
    };
    let value = !todos[idx].completed;
    todos[idx].completed = value;
    if !todos[idx].is_child() {
        for child in todos[idx + 1..].iter_mut().take_while(|t| t.is_child()) {
            child.completed = value;
        }
    }
    true
}

/// Set an item's indent (clamped to the supported range), rederiving parent
/// links for the whole sequence. A child with no preceding top-level item
/// keeps `parent_id = None`; no parent is ever synthesized.
pub fn set_indent(todos: &mut [Todo], id: u64, indent: u8) -> bool {
    let Some(idx) = position_of(todos, id) else {
        return false;
    };
    let indent = clamp_indent(indent);
    if todos[idx].indent == indent {
        return false;
    }
    todos[idx].indent = indent;
    relink_children(todos);
    true
}

/// Adjust an item's indent by a delta, clamped to `0..=MAX_INDENT`.
pub fn change_indent(todos: &mut [Todo], id: u64, delta: i8) -> bool {
    let Some(idx) = position_of(todos, id) else {
        return false;
    };
    let current = todos[idx].indent as i8;
    let next = (current + delta).clamp(0, MAX_INDENT as i8) as u8;
    set_indent(todos, id, next)
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

/// Delete the item at `index` and return it.
///
/// Children orphaned by deleting their parent re-attach to the nearest
/// preceding top-level item, provided its effective section matches the
/// orphan's own completion flag; otherwise the orphan is outdented to
/// top-level. An orphan outdented this way becomes an attach candidate for
/// the orphans after it.
pub fn remove_at(todos: &mut Vec<Todo>, index: usize) -> Option<Todo> {
    if index >= todos.len() {
        return None;
    }
    let removed = todos.remove(index);
    if removed.is_child() {
        return Some(removed);
    }

    let mut i = index;
    while i < todos.len() && todos[i].is_child() {
        let orphan_section = if todos[i].completed {
            Section::Completed
        } else {
            Section::Active
        };
        // judge the candidate on the sequence up to the orphan, so the
        // not-yet-adopted orphan run cannot drag its section around
        let candidate = (0..i).rev().find(|&j| !todos[j].is_child());
        match candidate {
            Some(j) if effective_section(&todos[..i], todos[j].id) == orphan_section => {
                todos[i].parent_id = Some(todos[j].id);
            }
            _ => {
                todos[i].indent = 0;
                todos[i].parent_id = None;
            }
        }
        i += 1;
    }
    Some(removed)
}

// ---------------------------------------------------------------------------
// Drag-and-drop reordering
// ---------------------------------------------------------------------------

/// Move the source's whole block adjacent to the target. Upward drags land
/// at the target's index; downward drags land just past the target's block,
/// so dropping onto a child inserts among its level-1 siblings instead of
/// snapping to the parent. Invalid moves (self, cross-section, into own
/// subtree, unknown id) are silent no-ops. Returns whether a move happened.
pub fn reorder(todos: &mut Vec<Todo>, source_id: u64, target_id: u64) -> bool {
    if validate_block_move(source_id, target_id, todos).is_err() {
        return false;
    }
    // validate guarantees both positions exist
    let Some(src_idx) = position_of(todos, source_id) else {
        return false;
    };
    let Some(tgt_idx) = position_of(todos, target_id) else {
        return false;
    };

    let (block, end) = extract_block(todos, src_idx);
    remove_block_range(todos, src_idx, end);

    let Some(tgt_pos) = position_of(todos, target_id) else {
        return false;
    };
    let at = if src_idx < tgt_idx {
        block_end(todos, tgt_pos)
    } else {
        tgt_pos
    };
    insert_block(todos, block, at);
    repair_orphaned_child(todos, at);
    relink_children(todos);
    true
}
