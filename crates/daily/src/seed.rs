use exn::ResultExt;
use rand::Rng;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;
use verse_storage::error::ErrorKind as StorageErrorKind;
use verse_storage::{KeyValueStore, Value};

use crate::error::{ErrorKind, Result};

/// Where a [`DeviceSeed`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedOrigin {
    /// Read back from the store.
    Stored,
    /// Generated by this process and persisted.
    Created,
    /// Generated by this process but not persisted. Selections made with it
    /// are only stable until the process exits.
    Ephemeral,
}

/// A device's random seed, in `0..=i64::MAX`.
///
/// Created once per installation and shared by every process that reads the
/// same store, so they all pick the same verse on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSeed {
    value: u64,
    origin: SeedOrigin,
}
impl DeviceSeed {
    /// Store key holding the seed.
    pub const KEY: &'static str = "device_seed";

    /// A known seed, e.g. for reproducing another device's selection.
    pub fn from_value(value: u64) -> Result<Self> {
        match i64::try_from(value) {
            Ok(_) => Ok(Self { value, origin: SeedOrigin::Stored }),
            Err(_) => exn::bail!(ErrorKind::InvalidSeed(value.to_string())),
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn origin(&self) -> SeedOrigin {
        self.origin
    }

    pub fn is_ephemeral(&self) -> bool {
        self.origin == SeedOrigin::Ephemeral
    }

    fn random() -> u64 {
        rand::thread_rng().gen_range(0..=i64::MAX) as u64
    }

    fn ephemeral() -> Self {
        Self { value: Self::random(), origin: SeedOrigin::Ephemeral }
    }

    fn decode(value: &Value) -> Option<u64> {
        value.as_integer().and_then(|i| u64::try_from(i).ok())
    }

    /// Read the device seed, creating and persisting one on first use.
    ///
    /// Never fails. Concurrent first calls from several processes all end up
    /// with the same seed, because creation goes through
    /// [`insert_if_absent`](KeyValueStore::insert_if_absent). When the store
    /// cannot be used the seed is ephemeral, and a stored value that is not a
    /// valid seed is left as it is: see [`reset()`](Self::reset).
    #[instrument(skip(store), fields(store = store.name()))]
    pub async fn get_or_create(store: &dyn KeyValueStore) -> Self {
        let stored = match store.get(Self::KEY).await {
            Ok(stored) => stored,
            Err(err) => return Self::degraded(err),
        };
        if let Some(value) = stored {
            return match Self::decode(&value) {
                Some(seed) => Self { value: seed, origin: SeedOrigin::Stored },
                None => Self::invalid(&value),
            };
        }
        let candidate = Self::random();
        match store.insert_if_absent(Self::KEY, Value::Integer(candidate as i64)).await {
            Ok(winner) => match Self::decode(&winner) {
                Some(seed) if seed == candidate => {
                    tracing::info!("Created new device seed");
                    Self { value: seed, origin: SeedOrigin::Created }
                },
                Some(seed) => {
                    tracing::debug!("Another process created the device seed first");
                    Self { value: seed, origin: SeedOrigin::Stored }
                },
                None => Self::invalid(&winner),
            },
            Err(err) => Self::degraded(err),
        }
    }

    fn degraded(err: verse_storage::error::Error) -> Self {
        match &*err {
            StorageErrorKind::Corrupt { .. } => {
                tracing::error!(error = ?err, "Stored device seed is unreadable; using a temporary seed");
            },
            _ => tracing::warn!(error = ?err, "Device store unavailable; using a temporary seed"),
        }
        Self::ephemeral()
    }

    fn invalid(value: &Value) -> Self {
        tracing::error!(stored = %value, "Stored device seed is not a valid seed; using a temporary seed");
        Self::ephemeral()
    }

    /// Replace the stored seed with a fresh one. This is the only way an
    /// unreadable stored seed gets overwritten.
    #[instrument(skip(store), fields(store = store.name()))]
    pub async fn reset(store: &dyn KeyValueStore) -> Result<Self> {
        let value = Self::random();
        store.set(Self::KEY, Value::Integer(value as i64)).await.or_raise(|| ErrorKind::Store)?;
        tracing::info!("Device seed reset");
        Ok(Self { value, origin: SeedOrigin::Created })
    }
}
impl Display for DeviceSeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use rstest::rstest;
    use verse_storage::backend::MemoryStore;
    use verse_storage::error::Result as StorageResult;

    /// A store that fails every operation.
    pub(crate) struct BrokenStore;
    #[async_trait]
    impl KeyValueStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn get(&self, _key: &str) -> StorageResult<Option<Value>> {
            exn::bail!(StorageErrorKind::BackendError("unplugged".to_string()))
        }

        async fn set(&self, _key: &str, _value: Value) -> StorageResult<()> {
            exn::bail!(StorageErrorKind::BackendError("unplugged".to_string()))
        }

        async fn insert_if_absent(&self, _key: &str, _value: Value) -> StorageResult<Value> {
            exn::bail!(StorageErrorKind::BackendError("unplugged".to_string()))
        }

        async fn remove(&self, _key: &str) -> StorageResult<bool> {
            exn::bail!(StorageErrorKind::BackendError("unplugged".to_string()))
        }
    }

    #[tokio::test]
    async fn test_creates_then_reuses() {
        let store = MemoryStore::default();
        let first = DeviceSeed::get_or_create(&store).await;
        assert_eq!(first.origin(), SeedOrigin::Created);
        assert!(first.value() <= i64::MAX as u64);
        let second = DeviceSeed::get_or_create(&store).await;
        assert_eq!(second.origin(), SeedOrigin::Stored);
        assert_eq!(second.value(), first.value());
        assert_eq!(store.get(DeviceSeed::KEY).await.unwrap(), Some(Value::Integer(first.value() as i64)));
    }

    #[rstest]
    #[case(Value::Integer(42), 42)]
    #[case(Value::Integer(0), 0)]
    #[case(Value::Integer(i64::MAX), i64::MAX as u64)]
    #[case(Value::from("42"), 42)]
    #[tokio::test]
    async fn test_reads_stored_seed(#[case] stored: Value, #[case] expected: u64) {
        let store = MemoryStore::with_values([(DeviceSeed::KEY, stored)]);
        let seed = DeviceSeed::get_or_create(&store).await;
        assert_eq!(seed.value(), expected);
        assert_eq!(seed.origin(), SeedOrigin::Stored);
    }

    #[rstest]
    #[case(Value::Integer(-1))]
    #[case(Value::from("forty-two"))]
    #[tokio::test]
    async fn test_invalid_stored_seed_is_kept(#[case] stored: Value) {
        let store = MemoryStore::with_values([(DeviceSeed::KEY, stored.clone())]);
        let seed = DeviceSeed::get_or_create(&store).await;
        assert!(seed.is_ephemeral());
        assert_eq!(store.get(DeviceSeed::KEY).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_broken_store_degrades() {
        let seed = DeviceSeed::get_or_create(&BrokenStore).await;
        assert!(seed.is_ephemeral());
        assert!(seed.value() <= i64::MAX as u64);
        let err = DeviceSeed::reset(&BrokenStore).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Store);
    }

    #[tokio::test]
    async fn test_reset_overwrites() {
        let store = MemoryStore::with_values([(DeviceSeed::KEY, Value::from("garbage"))]);
        let seed = DeviceSeed::reset(&store).await.unwrap();
        let again = DeviceSeed::get_or_create(&store).await;
        assert_eq!(again.value(), seed.value());
        assert_eq!(again.origin(), SeedOrigin::Stored);
    }

    #[test]
    fn test_from_value() {
        assert_eq!(DeviceSeed::from_value(42).unwrap().value(), 42);
        assert!(DeviceSeed::from_value(i64::MAX as u64).is_ok());
        let err = DeviceSeed::from_value(u64::MAX).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidSeed(_)));
    }
}
