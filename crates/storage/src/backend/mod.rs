//! Key-value store trait and implementations.
//!
//! The selector only needs a handful of small named values that outlive the
//! process (the device seed, the preferred language). This module defines
//! the [`KeyValueStore`] trait that hides where they live.

mod local;
mod memory;

pub use self::local::LocalStore;
pub use self::memory::MemoryStore;
use crate::error::Result;
use crate::value::Value;
use async_trait::async_trait;

/// Unified interface for small persistent values.
///
/// # Keys
/// Keys must pass [`validate_key`](crate::validate_key). Implementations
/// enforce this on every call.
///
/// # Concurrency
/// The store may be shared with other processes (an app and its widget
/// extension, say). [`insert_if_absent()`](Self::insert_if_absent) is the
/// only operation that must be atomic across processes; it is what makes
/// "create the device seed exactly once" safe.
///
/// # Examples
///
/// ```
/// use verse_storage::{KeyValueStore, Value, error::Result};
///
/// async fn seed_or_default(store: &dyn KeyValueStore) -> Result<i64> {
///     let value = store.get("device_seed").await?;
///     Ok(value.and_then(|v| v.as_integer()).unwrap_or(0))
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Name of the store, used for logging only.
    fn name(&self) -> &str;

    /// Read a value. Returns `Ok(None)` when the key has never been set.
    ///
    /// Returns [`Corrupt`](crate::error::ErrorKind::Corrupt) if something is
    /// stored under the key but it cannot be decoded.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Store `value` only if nothing is stored under `key` yet.
    ///
    /// Returns the value that is stored once the call completes: `value`
    /// itself if this call won, otherwise whatever was already there. Two
    /// racing callers therefore always agree on the result.
    async fn insert_if_absent(&self, key: &str, value: Value) -> Result<Value>;

    /// Delete a value. Returns `false` if there was nothing to delete.
    async fn remove(&self, key: &str) -> Result<bool>;
}
