use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::todo::Todo;

/// A named to-do list: index metadata plus the todo sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    /// Unique across the collection (uuid v4 for locally created lists).
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoList {
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        TodoList {
            id: id.into(),
            name: name.into(),
            todos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a content or metadata change.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// The index entry for this list (metadata without todos).
    pub fn meta(&self) -> ListMeta {
        ListMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Index entry persisted in the lists-index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
