//! In-memory storage backend.
//!
//! Used by tests and by embedders that persist elsewhere. Records a
//! method-call trace so tests can assert persistence *ordering* (e.g. the
//! flush-before-duplicate rule), and can be switched into a failing mode to
//! exercise the optimistic error path.

use chrono::Utc;
use indexmap::IndexMap;

use crate::io::store::{ListTodosDoc, ListsIndexDoc, Store, StoreError, remap_ids};
use crate::model::list::ListMeta;
use crate::model::settings::AppSettings;

#[derive(Debug, Default)]
pub struct MemoryStore {
    index: ListsIndexDoc,
    todos: IndexMap<String, ListTodosDoc>,
    settings: AppSettings,
    calls: Vec<String>,
    fail_saves: bool,
    copies: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The method-call trace, oldest first.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Make every save fail with an internal error.
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn index(&self) -> &ListsIndexDoc {
        &self.index
    }

    pub fn todos_of(&self, list_id: &str) -> Option<&ListTodosDoc> {
        self.todos.get(list_id)
    }

    fn record(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }

    fn writable(&self) -> Result<(), StoreError> {
        if self.fail_saves {
            Err(StoreError::Internal("injected save failure".into()))
        } else {
            Ok(())
        }
    }
}

impl Store for MemoryStore {
    fn load_index(&mut self) -> Result<ListsIndexDoc, StoreError> {
        self.record("load_index");
        Ok(self.index.clone())
    }

    fn save_index(&mut self, doc: &ListsIndexDoc) -> Result<(), StoreError> {
        self.record("save_index");
        self.writable()?;
        self.index = doc.clone();
        Ok(())
    }

    fn load_todos(&mut self, list_id: &str) -> Result<ListTodosDoc, StoreError> {
        self.record(format!("load_todos:{list_id}"));
        Ok(self.todos.get(list_id).cloned().unwrap_or_default())
    }

    fn save_todos(&mut self, list_id: &str, doc: &ListTodosDoc) -> Result<(), StoreError> {
        self.record(format!("save_todos:{list_id}"));
        self.writable()?;
        self.todos.insert(list_id.to_string(), doc.clone());
        Ok(())
    }

    fn duplicate_list(&mut self, source_id: &str, new_name: &str) -> Result<String, StoreError> {
        self.record(format!("duplicate_list:{source_id}"));
        self.writable()?;
        if source_id.is_empty() {
            return Err(StoreError::InvalidSourceId(source_id.to_string()));
        }
        if !self.index.lists.iter().any(|m| m.id == source_id) {
            return Err(StoreError::NotFound(source_id.to_string()));
        }
        let source = self.todos.get(source_id).cloned().unwrap_or_default();
        self.copies += 1;
        let new_id = format!("{source_id}-copy-{}", self.copies);
        self.todos.insert(
            new_id.clone(),
            ListTodosDoc {
                todos: remap_ids(&source.todos),
            },
        );
        let now = Utc::now();
        self.index.lists.push(ListMeta {
            id: new_id.clone(),
            name: new_name.to_string(),
            created_at: now,
            updated_at: now,
        });
        Ok(new_id)
    }

    fn delete_list(&mut self, list_id: &str) -> Result<(), StoreError> {
        self.record(format!("delete_list:{list_id}"));
        self.writable()?;
        let before = self.index.lists.len();
        self.index.lists.retain(|m| m.id != list_id);
        if self.index.lists.len() == before {
            return Err(StoreError::NotFound(list_id.to_string()));
        }
        self.todos.shift_remove(list_id);
        Ok(())
    }

    fn load_settings(&mut self) -> Result<AppSettings, StoreError> {
        self.record("load_settings");
        Ok(self.settings)
    }

    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), StoreError> {
        self.record("save_settings");
        self.writable()?;
        self.settings = *settings;
        Ok(())
    }
}
