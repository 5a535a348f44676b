//! SQLite-backed key-value store.
//!
//! An alternative to the file-per-key [`LocalStore`](verse_storage::backend::LocalStore)
//! for hosts that would rather keep device state in a single database file.
//! SQLite's own locking makes [`insert_if_absent`](verse_storage::KeyValueStore::insert_if_absent)
//! atomic across processes.

mod db;
pub mod error;
mod store;

pub use crate::db::Database;
pub use crate::store::SqliteStore;
