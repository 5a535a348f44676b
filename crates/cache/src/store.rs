use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;
use verse_storage::error::{ErrorKind as StorageErrorKind, Result as StorageResult};
use verse_storage::{KeyValueStore, Value, validate_key};

use crate::Database;

/// [`KeyValueStore`] over a single SQLite table.
///
/// Values are kept as JSON text so the on-disk representation matches the
/// file-backed store.
///
/// # Examples
///
/// ```
/// use verse_cache::{Database, SqliteStore};
/// use verse_storage::{KeyValueStore, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::from(&Database::connect_in_memory().await?);
/// let seed = store.insert_if_absent("device_seed", Value::Integer(42)).await?;
/// assert_eq!(seed, Value::Integer(42));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}
impl From<&Database> for SqliteStore {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn backend_error() -> StorageErrorKind {
        StorageErrorKind::BackendError("sqlite query failed".to_string())
    }

    fn decode(key: &str, raw: &str) -> StorageResult<Value> {
        serde_json::from_str(raw)
            .or_raise(|| StorageErrorKind::Corrupt { key: key.to_string(), reason: format!("stored text {raw:?}") })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let key = validate_key(key)?;
        let raw: Option<String> = sqlx::query_scalar(include_str!("../queries/get_entry.sql"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(Self::backend_error)?;
        raw.map(|raw| Self::decode(key, &raw)).transpose()
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let key = validate_key(key)?;
        sqlx::query(include_str!("../queries/upsert_entry.sql"))
            .bind(key)
            .bind(String::from_utf8_lossy(&value.to_json()).into_owned())
            .execute(&self.pool)
            .await
            .or_raise(Self::backend_error)?;
        Ok(())
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn insert_if_absent(&self, key: &str, value: Value) -> StorageResult<Value> {
        let key = validate_key(key)?;
        let mut tx = self.pool.begin().await.or_raise(Self::backend_error)?;
        let inserted = sqlx::query(include_str!("../queries/insert_entry_if_absent.sql"))
            .bind(key)
            .bind(String::from_utf8_lossy(&value.to_json()).into_owned())
            .execute(&mut *tx)
            .await
            .or_raise(Self::backend_error)?
            .rows_affected();
        let raw: String = sqlx::query_scalar(include_str!("../queries/get_entry.sql"))
            .bind(key)
            .fetch_one(&mut *tx)
            .await
            .or_raise(Self::backend_error)?;
        tx.commit().await.or_raise(Self::backend_error)?;
        tracing::debug!(inserted = inserted == 1, "Resolved conditional insert");
        Self::decode(key, &raw)
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        let key = validate_key(key)?;
        let result = sqlx::query(include_str!("../queries/delete_entry.sql"))
            .bind(key)
            .execute(&self.pool)
            .await
            .or_raise(Self::backend_error)?;
        Ok(result.rows_affected() > 0)
    }
}
