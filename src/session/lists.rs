//! List collection management: add, rename, delete, duplicate, selection
//! bootstrap, and recency ordering.

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::focus::Caret;
use crate::io::save_queue::{DEBOUNCE, SaveMode};
use crate::io::store::Store;
use crate::model::list::TodoList;
use crate::model::todo::IdAlloc;
use crate::ops::todo_ops;
use crate::session::Session;

/// Error type for list collection operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("list not found: {0}")]
    NotFound(String),
    #[error("cannot delete the only remaining list")]
    OnlyList,
}

impl<S: Store> Session<S> {
    /// Synthesize the default list when the store held none. Guarded so a
    /// reentrant initialization cannot create two.
    pub(crate) fn ensure_default_list(&mut self) {
        if self.bootstrapped || !self.lists.is_empty() {
            return;
        }
        self.bootstrapped = true;
        self.create_list();
    }

    /// Create, select, and immediately persist a new empty list (seeded with
    /// one empty todo). Returns its id.
    pub fn add_list(&mut self) -> String {
        let id = self.create_list();
        self.pump(Instant::now());
        id
    }

    fn create_list(&mut self) -> String {
        // land pending edits of the outgoing list before switching
        self.flush_todos();

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let name = format!("List {}", self.lists.len() + 1);
        let mut list = TodoList::new(id.clone(), name, now);
        self.ids = IdAlloc::default();
        let seed = todo_ops::add_todo(&mut list.todos, &mut self.ids, "", 0);
        self.lists.push(list);
        self.loaded.insert(id.clone());
        self.selected = Some(id.clone());

        let at = Instant::now();
        self.index_channel.enqueue(at, SaveMode::Immediate);
        self.todos_channel.enqueue(at, SaveMode::Immediate);
        self.focus.request(seed, Caret::Start);
        id
    }

    /// Rename a list, bumping its recency stamp.
    pub fn rename_list(&mut self, id: &str, name: &str) -> Result<(), ListError> {
        let now = Utc::now();
        let list = self
            .lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ListError::NotFound(id.to_string()))?;
        if list.name == name {
            return Ok(());
        }
        list.name = name.to_string();
        list.touch(now);
        self.index_channel
            .enqueue(Instant::now(), SaveMode::Debounced(DEBOUNCE));
        Ok(())
    }

    /// Delete a list. Refused for the only remaining list. Deleting the
    /// selected list drops its pending edits, selects the first remaining
    /// list, and persists the index immediately.
    pub fn delete_list(&mut self, id: &str) -> Result<(), ListError> {
        if self.lists.len() <= 1 {
            return Err(ListError::OnlyList);
        }
        let Some(pos) = self.lists.iter().position(|l| l.id == id) else {
            return Err(ListError::NotFound(id.to_string()));
        };
        let was_selected = self.selected.as_deref() == Some(id);
        if was_selected {
            // edits of a deleted list must not resurface at the next pump
            self.todos_channel.cancel();
        }
        self.lists.remove(pos);
        self.loaded.remove(id);
        if was_selected {
            let first = self.lists[0].id.clone();
            self.activate(&first);
        }
        if let Err(err) = self.store.delete_list(id) {
            tracing::warn!(list = %id, %err, "store delete failed, removing locally anyway");
        }
        self.index_channel
            .enqueue(Instant::now(), SaveMode::Immediate);
        self.pump(Instant::now());
        Ok(())
    }

    /// Duplicate a list through the store (ids remapped backend-side) and
    /// select the copy. A selected source with pending debounced edits is
    /// flushed first so the copy never captures stale data. Returns None on
    /// any store failure or while a duplicate of the same source is already
    /// in flight; local state is untouched in both cases.
    pub fn duplicate_list(&mut self, source_id: &str, new_name: Option<&str>) -> Option<String> {
        if self.duplicating.contains(source_id) {
            return None;
        }
        let source = self.lists.iter().find(|l| l.id == source_id)?;
        let name = new_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} copy", source.name));
        self.duplicating.insert(source_id.to_string());

        if self.selected.as_deref() == Some(source_id) {
            self.flush_todos();
        }
        let result = self.store.duplicate_list(source_id, &name);
        self.duplicating.remove(source_id);

        let new_id = match result {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(source = %source_id, %err, "duplicate failed");
                return None;
            }
        };

        let todos = self
            .store
            .load_todos(&new_id)
            .map(|doc| doc.todos)
            .unwrap_or_else(|err| {
                tracing::warn!(list = %new_id, %err, "copied todos load failed, starting empty");
                Vec::new()
            });
        let now = Utc::now();
        let mut list = TodoList::new(new_id.clone(), name, now);
        list.todos = todos;
        self.ids = IdAlloc::default();
        self.ids.sync_to(&list.todos);
        self.lists.push(list);
        self.loaded.insert(new_id.clone());
        self.selected = Some(new_id.clone());

        self.index_channel
            .enqueue(Instant::now(), SaveMode::Immediate);
        self.pump(Instant::now());
        Some(new_id)
    }

    /// Lists ordered by recency (`updated_at` descending), name as the
    /// stable tiebreak.
    pub fn sorted_lists(&self) -> Vec<&TodoList> {
        let mut lists: Vec<&TodoList> = self.lists.iter().collect();
        lists.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        lists
    }
}
