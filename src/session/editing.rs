//! Todo editing on the session: primitive mutations mapped onto save
//! scheduling, plus the Enter/Backspace/Tab composites expressed in terms of
//! the primitives and caret offsets.

use std::time::Instant;

use chrono::Utc;

use crate::focus::Caret;
use crate::io::save_queue::{DEBOUNCE, SaveMode};
use crate::io::store::Store;
use crate::model::todo::{IdAlloc, Todo};
use crate::ops::hierarchy::position_of;
use crate::ops::todo_ops;
use crate::session::Session;
use crate::util::unicode;
use crate::view;

impl<S: Store> Session<S> {
    /// Run `f` against the selected list's sheet (todos + id allocator).
    fn with_sheet<R>(&mut self, f: impl FnOnce(&mut Vec<Todo>, &mut IdAlloc) -> R) -> Option<R> {
        let sel = self.selected.clone()?;
        let list = self.lists.iter_mut().find(|l| l.id == sel)?;
        Some(f(&mut list.todos, &mut self.ids))
    }

    /// Bookkeeping after a mutation: bump `updated_at` and schedule saves.
    /// The index rides along debounced since it carries the timestamp.
    fn after_change(&mut self, mode: SaveMode) {
        let now = Utc::now();
        if let Some(list) = self.selected_list_mut() {
            list.touch(now);
        }
        self.todos_channel.enqueue(Instant::now(), mode);
        self.index_channel
            .enqueue(Instant::now(), SaveMode::Debounced(DEBOUNCE));
    }

    // -----------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------

    /// Append a todo to the selected list. Returns its id.
    pub fn add_todo(&mut self, text: &str, indent: u8) -> Option<u64> {
        let id = self.with_sheet(|todos, ids| todo_ops::add_todo(todos, ids, text, indent))?;
        self.after_change(SaveMode::Immediate);
        self.focus.request(id, Caret::End);
        Some(id)
    }

    /// Replace a todo's text. Clearing to empty updates the state but does
    /// not schedule a save; the next persisted mutation carries it.
    pub fn update_todo_text(&mut self, id: u64, text: &str) -> bool {
        let changed = self
            .with_sheet(|todos, _| todo_ops::update_text(todos, id, text))
            .unwrap_or(false);
        if changed {
            let now = Utc::now();
            if let Some(list) = self.selected_list_mut() {
                list.touch(now);
            }
            if !text.is_empty() {
                self.todos_channel
                    .enqueue(Instant::now(), SaveMode::Debounced(DEBOUNCE));
                self.index_channel
                    .enqueue(Instant::now(), SaveMode::Debounced(DEBOUNCE));
            }
        }
        changed
    }

    /// Toggle completion; a top-level toggle flips its whole block. Saved
    /// immediately: completion changes must not be lost to a debounce.
    pub fn toggle_todo(&mut self, id: u64) -> bool {
        let changed = self
            .with_sheet(|todos, _| todo_ops::toggle_completion(todos, id))
            .unwrap_or(false);
        if changed {
            self.after_change(SaveMode::Immediate);
        }
        changed
    }

    pub fn set_todo_indent(&mut self, id: u64, indent: u8) -> bool {
        let changed = self
            .with_sheet(|todos, _| todo_ops::set_indent(todos, id, indent))
            .unwrap_or(false);
        if changed {
            self.after_change(SaveMode::Debounced(DEBOUNCE));
        }
        changed
    }

    pub fn change_todo_indent(&mut self, id: u64, delta: i8) -> bool {
        let changed = self
            .with_sheet(|todos, _| todo_ops::change_indent(todos, id, delta))
            .unwrap_or(false);
        if changed {
            self.after_change(SaveMode::Debounced(DEBOUNCE));
        }
        changed
    }

    /// Insert a new todo below the one with `id`, inheriting its indent and
    /// parent. Focus moves to the new item.
    pub fn insert_todo_below(&mut self, id: u64, text: &str) -> Option<u64> {
        let new_id = self
            .with_sheet(|todos, ids| {
                let idx = position_of(todos, id)?;
                Some(todo_ops::insert_below(todos, ids, idx, text))
            })
            .flatten()?;
        self.after_change(SaveMode::Immediate);
        self.focus.request(new_id, Caret::Start);
        Some(new_id)
    }

    /// Remove the todo with `id`; orphaned children re-attach or outdent per
    /// the backward-scan policy. Focus moves to the preceding item.
    pub fn remove_todo(&mut self, id: u64) -> bool {
        let removed_index = self
            .with_sheet(|todos, _| {
                let idx = position_of(todos, id)?;
                todo_ops::remove_at(todos, idx).map(|_| idx)
            })
            .flatten();
        let Some(idx) = removed_index else {
            return false;
        };
        self.after_change(SaveMode::Immediate);
        if let Some(next) = view::focus_after_removal(self.selected_todos(), idx) {
            self.focus.request(next, Caret::End);
        }
        true
    }

    /// Drag-and-drop block move. Invalid moves are silent no-ops with no
    /// save.
    pub fn reorder_todo(&mut self, source_id: u64, target_id: u64) -> bool {
        let moved = self
            .with_sheet(|todos, _| todo_ops::reorder(todos, source_id, target_id))
            .unwrap_or(false);
        if moved {
            self.after_change(SaveMode::Immediate);
        }
        moved
    }

    // -----------------------------------------------------------------
    // Keyboard composites
    // -----------------------------------------------------------------

    /// Enter: split the item's text at the caret. The item keeps the left
    /// half, a new item below gets the right half, and the caret lands at
    /// the start of the new item. No-op when the trimmed text is empty.
    pub fn split_todo_at(&mut self, id: u64, caret_byte: usize) -> Option<u64> {
        let text = self
            .selected_todos()
            .iter()
            .find(|t| t.id == id)?
            .text
            .clone();
        if text.trim().is_empty() {
            return None;
        }
        let at = unicode::snap_to_boundary(&text, caret_byte);
        let left = &text[..at];
        let right = text[at..].to_string();
        let new_id = self
            .with_sheet(|todos, ids| {
                todo_ops::update_text(todos, id, left);
                let idx = position_of(todos, id)?;
                Some(todo_ops::insert_below(todos, ids, idx, right))
            })
            .flatten()?;
        self.after_change(SaveMode::Immediate);
        self.focus.request(new_id, Caret::Start);
        Some(new_id)
    }

    /// Backspace with the caret at offset 0 and a collapsed selection.
    ///
    /// An empty child outdents (a later backspace deletes it); otherwise the
    /// item's text merges into the end of the previous item, the item is
    /// removed, and the caret lands on the junction. No-op on the only
    /// remaining item, on the first item, or with an active selection.
    pub fn backspace_at_start(&mut self, id: u64, selection_collapsed: bool) -> bool {
        if !selection_collapsed {
            return false;
        }
        let todos = self.selected_todos();
        let Some(idx) = position_of(todos, id) else {
            return false;
        };
        if todos.len() <= 1 {
            return false;
        }
        let item = &todos[idx];
        if item.is_child() && item.text.is_empty() {
            return self.set_todo_indent(id, 0);
        }
        if idx == 0 {
            return false;
        }
        let prev = &todos[idx - 1];
        let prev_id = prev.id;
        let junction = prev.text.len();
        let merged = format!("{}{}", prev.text, item.text);
        self.with_sheet(|todos, _| {
            todo_ops::update_text(todos, prev_id, &merged);
            todo_ops::remove_at(todos, idx);
        });
        self.after_change(SaveMode::Immediate);
        self.focus.request(prev_id, Caret::Offset(junction));
        true
    }

    /// Tab: indent one level. Requires a preceding item to hang under.
    pub fn indent_todo(&mut self, id: u64) -> bool {
        let todos = self.selected_todos();
        let Some(idx) = position_of(todos, id) else {
            return false;
        };
        if idx == 0 {
            return false;
        }
        self.change_todo_indent(id, 1)
    }

    /// Shift-Tab: outdent one level. No-op at top level.
    pub fn outdent_todo(&mut self, id: u64) -> bool {
        self.change_todo_indent(id, -1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryStore;
    use crate::io::store::{ListTodosDoc, ListsIndexDoc};
    use crate::model::list::ListMeta;
    use crate::ops::hierarchy::relink_children;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn session_with(todos: &[(u64, &str, bool, u8)]) -> Session<MemoryStore> {
        let mut seq: Vec<Todo> = todos
            .iter()
            .map(|&(id, text, completed, indent)| Todo {
                id,
                text: text.to_string(),
                completed,
                indent,
                parent_id: None,
            })
            .collect();
        relink_children(&mut seq);

        let mut store = MemoryStore::new();
        let now = Utc::now();
        store
            .save_index(&ListsIndexDoc {
                lists: vec![ListMeta {
                    id: "main".into(),
                    name: "Main".into(),
                    created_at: now,
                    updated_at: now,
                }],
                selected_list_id: Some("main".into()),
            })
            .unwrap();
        store
            .save_todos("main", &ListTodosDoc { todos: seq })
            .unwrap();

        let mut session = Session::new(store);
        session.load();
        session.store_mut().clear_calls();
        session
    }

    fn texts(s: &Session<MemoryStore>) -> Vec<String> {
        s.selected_todos().iter().map(|t| t.text.clone()).collect()
    }

    fn saved_calls(s: &Session<MemoryStore>) -> Vec<String> {
        s.store().calls().to_vec()
    }

    // ── save scheduling ────────────────────────────────────────────

    #[test]
    fn toggle_saves_immediately_in_one_call() {
        let mut s = session_with(&[(1, "p", false, 0), (2, "c1", false, 1), (3, "c2", false, 1)]);
        assert!(s.toggle_todo(1));
        s.pump(Instant::now());
        assert!(s.selected_todos().iter().all(|t| t.completed));
        let saves: Vec<_> = saved_calls(&s)
            .into_iter()
            .filter(|c| c.starts_with("save_todos"))
            .collect();
        assert_eq!(saves.len(), 1, "whole-block toggle lands in one save");
    }

    #[test]
    fn noop_mutations_schedule_no_save() {
        let mut s = session_with(&[(1, "same", false, 0)]);
        assert!(!s.update_todo_text(1, "same"));
        assert!(!s.set_todo_indent(1, 0));
        assert!(!s.toggle_todo(99));
        assert!(!s.has_pending_todo_save());
    }

    #[test]
    fn clearing_text_updates_state_without_save() {
        let mut s = session_with(&[(1, "draft", false, 0), (2, "other", false, 0)]);
        assert!(s.update_todo_text(1, ""));
        assert_eq!(s.selected_todos()[0].text, "");
        assert!(!s.has_pending_todo_save());
    }

    #[test]
    fn indent_change_is_debounced() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", false, 0)]);
        assert!(s.set_todo_indent(2, 1));
        assert!(s.has_pending_todo_save());
        s.pump(Instant::now());
        assert!(
            saved_calls(&s).iter().all(|c| !c.starts_with("save_todos")),
            "debounce timer still running"
        );
        s.pump(Instant::now() + Duration::from_millis(250));
        assert!(saved_calls(&s).iter().any(|c| c == "save_todos:main"));
    }

    // ── enter / split ──────────────────────────────────────────────

    #[test]
    fn split_divides_text_at_caret() {
        let mut s = session_with(&[(1, "milk bread", false, 0)]);
        let new_id = s.split_todo_at(1, 4).unwrap();
        assert_eq!(texts(&s), vec!["milk", " bread"]);
        s.register_input(new_id);
        assert_eq!(s.resolve_focus(false), Some((new_id, 0)));
    }

    #[test]
    fn split_child_inherits_indent_and_parent() {
        let mut s = session_with(&[(1, "p", false, 0), (2, "ab", false, 1)]);
        let new_id = s.split_todo_at(2, 1).unwrap();
        let todos = s.selected_todos();
        let new = todos.iter().find(|t| t.id == new_id).unwrap();
        assert_eq!(new.indent, 1);
        assert_eq!(new.parent_id, Some(1));
    }

    #[test]
    fn split_on_blank_item_is_noop() {
        let mut s = session_with(&[(1, "   ", false, 0)]);
        assert_eq!(s.split_todo_at(1, 1), None);
        assert_eq!(s.selected_todos().len(), 1);
        assert!(!s.has_pending_todo_save());
    }

    // ── backspace ──────────────────────────────────────────────────

    #[test]
    fn backspace_merges_into_previous_item() {
        let mut s = session_with(&[(1, "milk", false, 0), (2, " bread", false, 0)]);
        assert!(s.backspace_at_start(2, true));
        assert_eq!(texts(&s), vec!["milk bread"]);
        // caret lands on the junction
        s.register_input(1);
        assert_eq!(s.resolve_focus(false), Some((1, 4)));
    }

    #[test]
    fn backspace_on_sole_empty_item_is_noop() {
        let mut s = session_with(&[(1, "", false, 0)]);
        assert!(!s.backspace_at_start(1, true));
        assert_eq!(s.selected_todos().len(), 1);
        assert!(!s.has_pending_todo_save());
        assert!(saved_calls(&s).is_empty(), "no save call at all");
    }

    #[test]
    fn backspace_on_first_item_is_noop() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", false, 0)]);
        assert!(!s.backspace_at_start(1, true));
        assert_eq!(s.selected_todos().len(), 2);
    }

    #[test]
    fn backspace_with_selection_is_noop() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", false, 0)]);
        assert!(!s.backspace_at_start(2, false));
    }

    #[test]
    fn backspace_outdents_empty_child_before_deleting() {
        let mut s = session_with(&[(1, "p", false, 0), (2, "", false, 1)]);
        assert!(s.backspace_at_start(2, true));
        assert_eq!(s.selected_todos()[1].indent, 0);
        assert_eq!(s.selected_todos().len(), 2, "first backspace only outdents");

        assert!(s.backspace_at_start(2, true));
        assert_eq!(s.selected_todos().len(), 1, "second backspace merges away");
    }

    #[test]
    fn backspace_merge_reparents_orphans() {
        let mut s = session_with(&[
            (1, "a", false, 0),
            (2, "p", false, 0),
            (3, "c", false, 1),
        ]);
        assert!(s.backspace_at_start(2, true));
        assert_eq!(texts(&s), vec!["ap", "c"]);
        assert_eq!(s.selected_todos()[1].parent_id, Some(1));
    }

    // ── tab / shift-tab ────────────────────────────────────────────

    #[test]
    fn tab_indents_under_preceding_item() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", false, 0)]);
        assert!(s.indent_todo(2));
        assert_eq!(s.selected_todos()[1].indent, 1);
        assert_eq!(s.selected_todos()[1].parent_id, Some(1));
    }

    #[test]
    fn tab_boundaries_are_noops() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", false, 1)]);
        assert!(!s.indent_todo(1), "first item has no parent candidate");
        assert!(!s.indent_todo(2), "already at max indent");
        assert!(!s.outdent_todo(1), "already top-level");
        assert!(s.outdent_todo(2));
    }

    // ── structural ops through the session ─────────────────────────

    #[test]
    fn remove_focuses_preceding_item() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", false, 0), (3, "c", false, 0)]);
        assert!(s.remove_todo(2));
        s.register_input(1);
        assert_eq!(s.resolve_focus(false), Some((1, 1)));
    }

    #[test]
    fn reorder_via_session_saves_once() {
        let mut s = session_with(&[
            (1, "A", false, 0),
            (2, "B", false, 1),
            (3, "C", false, 1),
            (4, "X", false, 0),
        ]);
        assert!(s.reorder_todo(4, 3));
        let order: Vec<u64> = s.selected_todos().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
        assert!(s.has_pending_todo_save());
    }

    #[test]
    fn invalid_reorder_schedules_nothing() {
        let mut s = session_with(&[(1, "a", false, 0), (2, "b", true, 0)]);
        assert!(!s.reorder_todo(1, 2));
        assert!(!s.has_pending_todo_save());
    }

    #[test]
    fn insert_below_by_id() {
        let mut s = session_with(&[(1, "p", false, 0), (2, "c", false, 1)]);
        let new_id = s.insert_todo_below(2, "").unwrap();
        let todos = s.selected_todos();
        assert_eq!(todos[2].id, new_id);
        assert_eq!(todos[2].indent, 1);
        assert!(new_id > 2, "fresh monotonic id");
    }
}
