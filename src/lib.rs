//! Two-level nested to-do list engine.
//!
//! A flat, ordered todo sequence is the single source of truth: sequence
//! order plus an `indent` of 0 or 1 encodes the parent/child structure, and
//! completion sections are derived from it rather than stored. On top of the
//! pure hierarchy and mutation operations sit a filtered view projection, a
//! focus planner, coalescing save channels, and a list collection manager —
//! everything a front-end needs short of rendering.
//!
//! Typical embedding:
//!
//! ```no_run
//! use twig::Session;
//! use twig::io::json_store::JsonFileStore;
//!
//! let store = JsonFileStore::open("/tmp/twig-data").unwrap();
//! let mut session = Session::new(store);
//! session.load();
//! let id = session.add_todo("water the plants", 0).unwrap();
//! session.toggle_todo(id);
//! session.flush();
//! ```

pub mod focus;
pub mod io;
pub mod model;
pub mod ops;
pub mod session;
pub mod util;
pub mod view;

pub use focus::{Caret, FocusPlanner};
pub use model::{AppSettings, IdAlloc, ListMeta, Section, Todo, TodoList};
pub use session::{ListError, Session};
