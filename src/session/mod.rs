//! Engine session.
//!
//! One `Session` owns the list collection, the selection, the id allocator,
//! display settings, the focus planner, and the two save channels. Mutations
//! are synchronous and atomic; persistence is decoupled through the channels
//! and performed by `pump`/`flush`, which serialize whatever the state is at
//! save time. A failed save is logged and the in-memory state stands — it is
//! the source of truth until the next successful save.

mod editing;
mod lists;

pub use lists::ListError;

use std::collections::HashSet;
use std::time::Instant;

use crate::focus::{Caret, FocusPlanner};
use crate::io::save_queue::{DEBOUNCE, SaveChannel, SaveMode};
use crate::io::store::{ListTodosDoc, ListsIndexDoc, Store};
use crate::model::list::TodoList;
use crate::model::settings::AppSettings;
use crate::model::todo::{IdAlloc, Todo};
use crate::view;

pub struct Session<S: Store> {
    store: S,
    lists: Vec<TodoList>,
    selected: Option<String>,
    /// List ids whose todos have been loaded, to avoid redundant loads.
    loaded: HashSet<String>,
    ids: IdAlloc,
    settings: AppSettings,
    focus: FocusPlanner,
    index_channel: SaveChannel,
    todos_channel: SaveChannel,
    /// Sources with a duplicate in flight; repeat requests are ignored.
    duplicating: HashSet<String>,
    bootstrapped: bool,
}

impl<S: Store> Session<S> {
    pub fn new(store: S) -> Self {
        Session {
            store,
            lists: Vec::new(),
            selected: None,
            loaded: HashSet::new(),
            ids: IdAlloc::default(),
            settings: AppSettings::default(),
            focus: FocusPlanner::default(),
            index_channel: SaveChannel::default(),
            todos_channel: SaveChannel::default(),
            duplicating: HashSet::new(),
            bootstrapped: false,
        }
    }

    /// Load settings, the lists index, and the selected list's todos.
    /// Synthesizes one default list when the store holds none (at most once,
    /// even if initialization re-enters).
    pub fn load(&mut self) {
        self.settings = self.store.load_settings().unwrap_or_else(|err| {
            tracing::warn!(%err, "settings load failed, using defaults");
            AppSettings::default()
        });
        let index = self.store.load_index().unwrap_or_else(|err| {
            tracing::warn!(%err, "index load failed, starting empty");
            ListsIndexDoc::default()
        });
        self.lists = index
            .lists
            .into_iter()
            .map(|meta| TodoList {
                id: meta.id,
                name: meta.name,
                todos: Vec::new(),
                created_at: meta.created_at,
                updated_at: meta.updated_at,
            })
            .collect();

        if self.lists.is_empty() {
            self.ensure_default_list();
        } else {
            let selected = index
                .selected_list_id
                .filter(|id| self.lists.iter().any(|l| &l.id == id))
                .unwrap_or_else(|| self.lists[0].id.clone());
            self.activate(&selected);
        }
        self.pump(Instant::now());
    }

    /// Switch the active list, landing any pending edits of the outgoing
    /// list first. False when the id is unknown or already selected.
    pub fn select_list(&mut self, id: &str) -> bool {
        if self.selected.as_deref() == Some(id) {
            return false;
        }
        if !self.lists.iter().any(|l| l.id == id) {
            return false;
        }
        self.flush_todos();
        self.activate(id);
        self.index_channel
            .enqueue(Instant::now(), SaveMode::Debounced(DEBOUNCE));
        true
    }

    /// Make `id` the selected list, loading its todos once and re-syncing
    /// the id counter to the loaded maximum.
    fn activate(&mut self, id: &str) {
        if !self.loaded.contains(id) {
            let doc = self.store.load_todos(id).unwrap_or_else(|err| {
                tracing::warn!(list = %id, %err, "todos load failed, starting empty");
                ListTodosDoc::default()
            });
            if let Some(list) = self.lists.iter_mut().find(|l| l.id == id) {
                list.todos = doc.todos;
            }
            self.loaded.insert(id.to_string());
        }
        self.ids = IdAlloc::default();
        if let Some(list) = self.lists.iter().find(|l| l.id == id) {
            self.ids.sync_to(&list.todos);
        }
        self.selected = Some(id.to_string());
    }

    // -----------------------------------------------------------------
    // Save pump
    // -----------------------------------------------------------------

    /// Perform any saves that have come due. Hosts call this from their
    /// event loop; state is serialized here, not at enqueue time.
    pub fn pump(&mut self, now: Instant) {
        if self.todos_channel.take_due(now) {
            self.perform_save_todos();
        }
        if self.index_channel.take_due(now) {
            self.perform_save_index();
        }
    }

    /// Drain both channels regardless of timers. Hosts call this on
    /// blur/hide/close so debounced edits are not lost.
    pub fn flush(&mut self) {
        self.flush_todos();
        if self.index_channel.flush() {
            self.perform_save_index();
        }
    }

    pub(crate) fn flush_todos(&mut self) {
        if self.todos_channel.flush() {
            self.perform_save_todos();
        }
    }

    fn perform_save_todos(&mut self) {
        let Some(sel) = self.selected.clone() else {
            return;
        };
        let Some(list) = self.lists.iter().find(|l| l.id == sel) else {
            return;
        };
        let doc = ListTodosDoc {
            todos: list.todos.clone(),
        };
        if let Err(err) = self.store.save_todos(&sel, &doc) {
            tracing::warn!(list = %sel, %err, "todos save failed, keeping local state");
        }
    }

    fn perform_save_index(&mut self) {
        let doc = ListsIndexDoc {
            lists: self.lists.iter().map(|l| l.meta()).collect(),
            selected_list_id: self.selected.clone(),
        };
        if let Err(err) = self.store.save_index(&doc) {
            tracing::warn!(%err, "index save failed, keeping local state");
        }
    }

    // -----------------------------------------------------------------
    // Settings / projection
    // -----------------------------------------------------------------

    pub fn hide_completed(&self) -> bool {
        self.settings.hide_completed_items
    }

    pub fn set_hide_completed(&mut self, hide: bool) {
        if self.settings.hide_completed_items == hide {
            return;
        }
        self.settings.hide_completed_items = hide;
        if let Err(err) = self.store.save_settings(&self.settings) {
            tracing::warn!(%err, "settings save failed, keeping local state");
        }
    }

    /// The selected list's visible subsequence under the current settings.
    pub fn visible_todos(&self) -> Vec<&Todo> {
        view::visible(self.selected_todos(), self.settings.hide_completed_items)
    }

    // -----------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------

    pub fn register_input(&mut self, id: u64) {
        self.focus.register(id);
    }

    pub fn unregister_input(&mut self, id: u64) {
        self.focus.unregister(id);
    }

    pub fn request_focus(&mut self, id: u64, caret: Caret) {
        self.focus.request(id, caret);
    }

    /// Resolve the focus target for this render pass, if any.
    pub fn resolve_focus(&mut self, editing_title: bool) -> Option<(u64, usize)> {
        let todos: &[Todo] = match self
            .selected
            .as_deref()
            .and_then(|id| self.lists.iter().find(|l| l.id == id))
        {
            Some(list) => &list.todos,
            None => &[],
        };
        self.focus.resolve(todos, editing_title)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_list(&self) -> Option<&TodoList> {
        let id = self.selected.as_deref()?;
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn selected_todos(&self) -> &[Todo] {
        self.selected_list().map(|l| l.todos.as_slice()).unwrap_or(&[])
    }

    pub fn has_pending_todo_save(&self) -> bool {
        self.todos_channel.is_pending()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub(crate) fn selected_list_mut(&mut self) -> Option<&mut TodoList> {
        let id = self.selected.clone()?;
        self.lists.iter_mut().find(|l| l.id == id)
    }
}
