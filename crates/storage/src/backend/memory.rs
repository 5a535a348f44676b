//! In-memory key-value store.

use crate::error::Result;
use crate::{KeyValueStore, Value, validate_key};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory key-value store.
///
/// Values live in a `HashMap` behind a [`RwLock`] and vanish with the
/// process. Used for tests and as the store of last resort when the
/// configured store cannot be opened.
///
/// # Examples
///
/// ```
/// use verse_storage::{KeyValueStore, Value, backend::MemoryStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::with_values([("language", Value::from("fr"))]);
/// assert_eq!(store.get("language").await?, Some(Value::from("fr")));
/// # Ok(())
/// # }
/// ```
pub struct MemoryStore {
    name: String,
    values: RwLock<HashMap<String, Value>>,
}
impl MemoryStore {
    /// Create a store pre-populated with values.
    ///
    /// Panics if any key fails validation. Intended for test setup, where a
    /// bad key is a bug in the test.
    pub fn with_values(values: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        let mut map = HashMap::new();
        for (key, value) in values {
            let key = key.into();
            if validate_key(&key).is_err() {
                panic!("MemoryStore::with_values: invalid key {key:?}");
            }
            map.insert(key, value);
        }
        Self { name: "memory".to_string(), values: RwLock::new(map) }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_values(std::iter::empty::<(String, Value)>())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = validate_key(key)?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let key = validate_key(key)?;
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn insert_if_absent(&self, key: &str, value: Value) -> Result<Value> {
        let key = validate_key(key)?;
        Ok(self.values.write().await.entry(key.to_string()).or_insert(value).clone())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let key = validate_key(key)?;
        Ok(self.values.write().await.remove(key).is_some())
    }
}
