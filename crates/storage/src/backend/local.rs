//! Local filesystem key-value store.
//!
//! Every key is one small JSON file in a directory. Writes go to a temporary
//! file in the same directory first and are then published atomically, so a
//! reader never sees a partially-written value.

use crate::error::{ErrorKind, Result};
use crate::{KeyValueStore, Value, validate_key};
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::create_dir_all as sync_create_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

const EXTENSION: &str = "json";

/// Local filesystem key-value store.
///
/// # Examples
///
/// ```no_run
/// use verse_storage::backend::LocalStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalStore::new("local", "/var/lib/verse")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalStore {
    name: String,
    root: PathBuf,
}
impl LocalStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or exists but is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Non-async on purpose: happens once at startup.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    fn file_path(&self, key: &str) -> Result<PathBuf> {
        let key = validate_key(key)?;
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    fn decode(key: &str, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).or_raise(|| ErrorKind::Corrupt {
            key: key.to_string(),
            reason: format!("{} bytes of undecodable data", bytes.len()),
        })
    }

    async fn read_value(&self, key: &str, path: &Path) -> Result<Option<Value>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(Self::decode(key, &bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::map_io_error(e, path).into()),
        }
    }

    /// Write `data` to a fresh temporary file next to `path`. The returned
    /// file is fully flushed but not yet visible under its final name.
    fn stage(root: &Path, data: &[u8]) -> std::result::Result<NamedTempFile, ErrorKind> {
        let mut staged = NamedTempFile::with_prefix_in(".tmp", root).map_err(|e| Self::map_io_error(e, root))?;
        staged.write_all(data).map_err(ErrorKind::Io)?;
        staged.as_file().sync_all().map_err(ErrorKind::Io)?;
        Ok(staged)
    }

    async fn blocking<T: Send + 'static>(
        f: impl FnOnce() -> std::result::Result<T, ErrorKind> + Send + 'static,
    ) -> Result<T> {
        let joined = tokio::task::spawn_blocking(f)
            .await
            .or_raise(|| ErrorKind::BackendError("blocking write task failed".to_string()))?;
        Ok(joined?)
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.file_path(key)?;
        self.read_value(key, &path).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.file_path(key)?;
        let root = self.root.clone();
        let data = value.to_json();
        Self::blocking(move || {
            let staged = Self::stage(&root, &data)?;
            staged.persist(&path).map_err(|e| Self::map_io_error(e.error, &path))?;
            Ok(())
        })
        .await
    }

    async fn insert_if_absent(&self, key: &str, value: Value) -> Result<Value> {
        let path = self.file_path(key)?;
        let root = self.root.clone();
        let data = value.to_json();
        let target = path.clone();
        // Publishing with no-clobber is a hard link (or renameat2) under the
        // hood: exactly one racing writer gets to create the file.
        let won = Self::blocking(move || {
            let staged = Self::stage(&root, &data)?;
            match staged.persist_noclobber(&target) {
                Ok(_) => Ok(true),
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
                Err(e) => Err(Self::map_io_error(e.error, &target)),
            }
        })
        .await?;
        if won {
            tracing::debug!(store = %self.name, key, "Inserted new value");
            return Ok(value);
        }
        tracing::debug!(store = %self.name, key, "Value already present, reading existing value");
        self.read_value(key, &path).await?.ok_or_else(|| {
            exn::Exn::from(ErrorKind::BackendError(format!("value for {key:?} vanished after a conflicting insert")))
        })
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.file_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::map_io_error(e, &path).into()),
        }
    }
}
