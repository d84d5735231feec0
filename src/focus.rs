//! Focus coordination.
//!
//! Structural edits decide which item should hold the caret next, but the
//! actual focusing happens on the host's next render pass. The planner holds
//! at most one pending request (latest wins) plus the set of ids whose
//! inputs are currently mounted, and resolves a request only once its target
//! can receive focus.

use std::collections::HashSet;

use crate::model::todo::Todo;
use crate::util::unicode;

/// Requested caret placement within an item's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    Start,
    End,
    /// Byte offset, clamped to the text and snapped to a grapheme boundary.
    Offset(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub id: u64,
    pub caret: Caret,
}

#[derive(Debug, Default)]
pub struct FocusPlanner {
    mounted: HashSet<u64>,
    pending: Option<FocusRequest>,
}

impl FocusPlanner {
    /// A live input handle exists for `id`.
    pub fn register(&mut self, id: u64) {
        self.mounted.insert(id);
    }

    pub fn unregister(&mut self, id: u64) {
        self.mounted.remove(&id);
    }

    /// Schedule focus for the next render pass. Replaces any earlier request.
    pub fn request(&mut self, id: u64, caret: Caret) {
        self.pending = Some(FocusRequest { id, caret });
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve on a render pass: the focus target and byte offset, if any.
    ///
    /// While a title edit is active the request stays parked. A request
    /// whose target vanished from the sequence is dropped; one whose input
    /// has not mounted yet is kept for a later pass. With nothing pending,
    /// a sole remaining todo is auto-focused (caret at end) so an
    /// almost-empty list is immediately editable.
    pub fn resolve(&mut self, todos: &[Todo], editing_title: bool) -> Option<(u64, usize)> {
        if editing_title {
            return None;
        }
        if let Some(req) = self.pending {
            let Some(todo) = todos.iter().find(|t| t.id == req.id) else {
                self.pending = None;
                return self.auto_focus(todos);
            };
            if !self.mounted.contains(&req.id) {
                return None;
            }
            self.pending = None;
            let offset = match req.caret {
                Caret::Start => 0,
                Caret::End => todo.text.len(),
                Caret::Offset(o) => unicode::snap_to_boundary(&todo.text, o),
            };
            return Some((req.id, offset));
        }
        self.auto_focus(todos)
    }

    fn auto_focus(&self, todos: &[Todo]) -> Option<(u64, usize)> {
        match todos {
            [only] => Some((only.id, only.text.len())),
            _ => None,
        }
    }
}
