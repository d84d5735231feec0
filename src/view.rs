//! Filtered view projection.
//!
//! The full sequence stays canonical; the view is a derived slice. Callers
//! address todos by id everywhere, so there is no filtered-index translation
//! to get wrong: `index_of` resolves an id to its full-sequence position and
//! mutations happen there.

use crate::model::todo::Todo;

/// The visible subsequence: everything, or only un-completed items when
/// hiding completed ones.
pub fn visible(todos: &[Todo], hide_completed: bool) -> Vec<&Todo> {
    todos
        .iter()
        .filter(|t| !hide_completed || !t.completed)
        .collect()
}

/// Full-sequence position of `id`.
pub fn index_of(todos: &[Todo], id: u64) -> Option<usize> {
    todos.iter().position(|t| t.id == id)
}

/// The id that should take focus after removing the item at `removed_index`:
/// the immediately preceding item in the full sequence, else the first
/// remaining item. Expects the sequence *after* the removal.
pub fn focus_after_removal(todos: &[Todo], removed_index: usize) -> Option<u64> {
    if todos.is_empty() {
        return None;
    }
    let idx = removed_index.saturating_sub(1).min(todos.len() - 1);
    Some(todos[idx].id)
}
