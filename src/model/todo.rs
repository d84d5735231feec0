use serde::{Deserialize, Serialize};

/// Deepest indent level the engine supports (0 = top-level, 1 = child).
pub const MAX_INDENT: u8 = 1;

/// Clamp an indent value into the supported range.
pub fn clamp_indent(indent: u8) -> u8 {
    indent.min(MAX_INDENT)
}

/// Derived completion-section classification.
///
/// Never stored: an item's section is computed from the sequence so a child
/// can never be classified `Completed` while its parent is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Active,
    Completed,
}

/// A single to-do item.
///
/// Sequence order within the owning list is significant: it is the sole
/// encoding of the hierarchy. A top-level item (`indent == 0`) plus its
/// contiguous run of `indent == 1` followers forms a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique within the owning list, assigned monotonically, never reused.
    pub id: u64,
    pub text: String,
    pub completed: bool,
    /// 0 = top-level, 1 = child of the nearest preceding top-level item.
    pub indent: u8,
    /// Id of the nearest preceding top-level item, or None for top-level
    /// items and front-orphans awaiting repair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

impl Todo {
    /// Create a top-level item with the given id and text.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Todo {
            id,
            text: text.into(),
            completed: false,
            indent: 0,
            parent_id: None,
        }
    }

    pub fn is_child(&self) -> bool {
        self.indent > 0
    }
}

/// Monotonic todo-id allocator, owned by the session.
///
/// Re-synced to `max(existing ids) + 1` whenever a list's todos are loaded;
/// the counter never regresses below the maximum id ever observed.
#[derive(Debug, Clone)]
pub struct IdAlloc {
    next: u64,
}

impl Default for IdAlloc {
    fn default() -> Self {
        IdAlloc { next: 1 }
    }
}

impl IdAlloc {
    /// Hand out the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Ensure future ids stay above `max_seen`.
    pub fn sync(&mut self, max_seen: u64) {
        self.next = self.next.max(max_seen + 1);
    }

    /// Reset for a freshly loaded list: ids resume after the highest
    /// id present in `todos`.
    pub fn sync_to(&mut self, todos: &[Todo]) {
        let max_seen = todos.iter().map(|t| t.id).max().unwrap_or(0);
        self.sync(max_seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_indent_caps_at_max() {
        assert_eq!(clamp_indent(0), 0);
        assert_eq!(clamp_indent(1), 1);
        assert_eq!(clamp_indent(7), 1);
    }

    #[test]
    fn id_alloc_is_strictly_increasing() {
        let mut ids = IdAlloc::default();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();
        assert!(a < b && b < c);
        assert_eq!(a, 1);
    }

    #[test]
    fn id_alloc_sync_never_regresses() {
        let mut ids = IdAlloc::default();
        ids.sync(10);
        assert_eq!(ids.allocate(), 11);
        ids.sync(5); // lower watermark must not rewind the counter
        assert_eq!(ids.allocate(), 12);
    }

    #[test]
    fn id_alloc_syncs_to_loaded_todos() {
        let mut ids = IdAlloc::default();
        let todos = vec![Todo::new(3, "a"), Todo::new(9, "b"), Todo::new(4, "c")];
        ids.sync_to(&todos);
        assert_eq!(ids.allocate(), 10);
    }

    #[test]
    fn todo_serde_uses_camel_case_and_omits_null_parent() {
        let todo = Todo::new(1, "buy milk");
        let json = serde_json::to_string(&todo).unwrap();
        assert!(!json.contains("parentId"));

        let child: Todo = serde_json::from_str(
            r#"{"id":2,"text":"sub","completed":false,"indent":1,"parentId":1}"#,
        )
        .unwrap();
        assert_eq!(child.parent_id, Some(1));
        assert!(child.is_child());
    }
}
