//! slate-store: SQLite persistence for Slate tasks.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteTaskStore;
