//! Persistence contract.
//!
//! The engine never talks to a concrete backend; it holds a `Store` and
//! treats every failure as non-fatal (the in-memory state is the source of
//! truth until the next successful save). Documents are plain serde shapes
//! with camelCase wire names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::list::ListMeta;
use crate::model::settings::AppSettings;
use crate::model::todo::Todo;

/// Error type for storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("list not found: {0}")]
    NotFound(String),
    #[error("invalid source list id: {0:?}")]
    InvalidSourceId(String),
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Internal(String),
}

/// The lists-index document: every list's metadata plus the selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListsIndexDoc {
    #[serde(default)]
    pub lists: Vec<ListMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_list_id: Option<String>,
}

/// The per-list todos document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosDoc {
    #[serde(default)]
    pub todos: Vec<Todo>,
}

/// Renumber a todo sequence into a fresh `1..=n` id range, preserving order
/// and content; parent links follow the mapping. Used when duplicating a
/// list so the copy gets its own monotonic range.
pub fn remap_ids(todos: &[Todo]) -> Vec<Todo> {
    let mapping: HashMap<u64, u64> = todos
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id, i as u64 + 1))
        .collect();
    todos
        .iter()
        .map(|t| {
            let mut copy = t.clone();
            copy.id = mapping[&t.id];
            copy.parent_id = t.parent_id.and_then(|p| mapping.get(&p).copied());
            copy
        })
        .collect()
}

/// Asynchronous-in-spirit persistence collaborator. Calls are issued from
/// the save pump (never from inside a mutation), so the engine observes them
/// as decoupled from state changes even on a synchronous backend.
pub trait Store {
    fn load_index(&mut self) -> Result<ListsIndexDoc, StoreError>;
    fn save_index(&mut self, doc: &ListsIndexDoc) -> Result<(), StoreError>;

    fn load_todos(&mut self, list_id: &str) -> Result<ListTodosDoc, StoreError>;
    fn save_todos(&mut self, list_id: &str, doc: &ListTodosDoc) -> Result<(), StoreError>;

    /// Create a backend-side copy of `source_id` named `new_name`, with ids
    /// remapped to a fresh range. Returns the new list's id.
    fn duplicate_list(&mut self, source_id: &str, new_name: &str) -> Result<String, StoreError>;
    fn delete_list(&mut self, list_id: &str) -> Result<(), StoreError>;

    fn load_settings(&mut self) -> Result<AppSettings, StoreError>;
    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), StoreError>;
}
