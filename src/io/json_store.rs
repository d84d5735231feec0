//! JSON file storage backend.
//!
//! One document per channel in a data directory: `lists.json` (index),
//! `todos-<id>.json` per list, `settings.json`. Missing or malformed
//! documents degrade to safe defaults rather than failing the load; writes
//! go through a temp file in the same directory and rename into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::io::store::{ListTodosDoc, ListsIndexDoc, Store, StoreError, remap_ids};
use crate::model::list::ListMeta;
use crate::model::settings::AppSettings;

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonFileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join("lists.json")
    }

    fn todos_path(&self, list_id: &str) -> PathBuf {
        self.dir.join(format!("todos-{list_id}.json"))
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    /// Read a document, treating a missing or malformed file as absent.
    fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), %err, "unreadable document, using defaults");
                }
                return T::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "malformed document, using defaults");
                T::default()
            }
        }
    }

    fn write_doc<T: Serialize>(&self, path: &Path, doc: &T) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(doc)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn load_index(&mut self) -> Result<ListsIndexDoc, StoreError> {
        Ok(Self::read_or_default(&self.index_path()))
    }

    fn save_index(&mut self, doc: &ListsIndexDoc) -> Result<(), StoreError> {
        self.write_doc(&self.index_path(), doc)
    }

    fn load_todos(&mut self, list_id: &str) -> Result<ListTodosDoc, StoreError> {
        Ok(Self::read_or_default(&self.todos_path(list_id)))
    }

    fn save_todos(&mut self, list_id: &str, doc: &ListTodosDoc) -> Result<(), StoreError> {
        self.write_doc(&self.todos_path(list_id), doc)
    }

    fn duplicate_list(&mut self, source_id: &str, new_name: &str) -> Result<String, StoreError> {
        if source_id.is_empty() {
            return Err(StoreError::InvalidSourceId(source_id.to_string()));
        }
        let mut index: ListsIndexDoc = Self::read_or_default(&self.index_path());
        if !index.lists.iter().any(|m| m.id == source_id) {
            return Err(StoreError::NotFound(source_id.to_string()));
        }
        let source: ListTodosDoc = Self::read_or_default(&self.todos_path(source_id));

        let new_id = Uuid::new_v4().to_string();
        self.write_doc(
            &self.todos_path(&new_id),
            &ListTodosDoc {
                todos: remap_ids(&source.todos),
            },
        )?;
        let now = Utc::now();
        index.lists.push(ListMeta {
            id: new_id.clone(),
            name: new_name.to_string(),
            created_at: now,
            updated_at: now,
        });
        self.write_doc(&self.index_path(), &index)?;
        Ok(new_id)
    }

    fn delete_list(&mut self, list_id: &str) -> Result<(), StoreError> {
        let mut index: ListsIndexDoc = Self::read_or_default(&self.index_path());
        let before = index.lists.len();
        index.lists.retain(|m| m.id != list_id);
        if index.lists.len() == before {
            return Err(StoreError::NotFound(list_id.to_string()));
        }
        self.write_doc(&self.index_path(), &index)?;
        match fs::remove_file(self.todos_path(list_id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn load_settings(&mut self) -> Result<AppSettings, StoreError> {
        Ok(Self::read_or_default(&self.settings_path()))
    }

    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), StoreError> {
        self.write_doc(&self.settings_path(), settings)
    }
}
