//! Local persistent storage ("offline" mode).
//!
//! A directory-backed key-value store: one `{key}.json` file per key, each
//! holding a single JSON document. Writes go to a temporary file first and
//! are renamed into place, so a crash never leaves a half-written value.
//!
//! Keys used by the catalog:
//!
//! | key                        | value                          |
//! |----------------------------|--------------------------------|
//! | `eclat_products`           | array of products              |
//! | `eclat_brands`             | array of brands                |
//! | `eclat_categories`         | array of categories            |
//! | `eclat_contact_info`       | array with at most one record  |
//! | `eclat_favorites`          | array of (user, product) pairs |
//! | `eclat_image_<uuid>`       | image data URL                 |
//! | `eclat_search_history_<u>` | recent queries for one user    |

mod favorites;
mod images;
mod table;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eclat_core::Entity;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

pub use favorites::LocalFavorites;
pub use images::{LOCAL_IMAGE_SCHEME, LocalImageStore};
pub use table::LocalTable;

/// Prefix shared by every key the catalog writes.
pub const KEY_PREFIX: &str = "eclat_";

/// Storage key holding the collection for `T`.
#[must_use]
pub fn collection_key<T: Entity>() -> String {
    format!("{KEY_PREFIX}{}", T::COLLECTION)
}

// =============================================================================
// LocalStorage
// =============================================================================

/// Directory-backed key-value storage.
///
/// Cheap to clone. Read-modify-write sequences hold the storage lock, so two
/// writers in the same process never interleave.
#[derive(Clone)]
pub struct LocalStorage {
    inner: Arc<LocalStorageInner>,
}

struct LocalStorageInner {
    root: PathBuf,
    lock: Mutex<()>,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("root", &self.inner.root)
            .finish_non_exhaustive()
    }
}

impl LocalStorage {
    /// Open (creating if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "local storage opened");
        Ok(Self {
            inner: Arc::new(LocalStorageInner {
                root,
                lock: Mutex::new(()),
            }),
        })
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Take the write lock for a read-modify-write sequence.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner.lock.lock().await
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StoreError::ValidationFailed(format!(
                "invalid storage key {key:?}"
            )));
        }
        Ok(self.inner.root.join(format!("{key}.json")))
    }

    /// Raw stored value, `None` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on I/O failure.
    pub async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)?).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on I/O failure.
    pub async fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Remove `key`. Returns whether a value was present.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on I/O failure.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        match tokio::fs::remove_file(self.path_for(key)?).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Decode the JSON value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `CorruptLocalState` when the stored value does not parse.
    pub async fn read_json<V: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<V>> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            warn!(key, error = %e, "stored value failed to parse");
            StoreError::CorruptLocalState {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Encode `value` as JSON under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on I/O failure.
    pub async fn write_json<V: Serialize + ?Sized + Sync>(&self, key: &str, value: &V) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::ValidationFailed(e.to_string()))?;
        self.set_raw(key, &raw).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path()).await.unwrap();

        assert_eq!(storage.get_raw("eclat_brands").await.unwrap(), None);
        storage.write_json("eclat_brands", &vec!["a", "b"]).await.unwrap();
        let stored: Vec<String> = storage.read_json("eclat_brands").await.unwrap().unwrap();
        assert_eq!(stored, ["a", "b"]);

        assert!(storage.remove("eclat_brands").await.unwrap());
        assert!(!storage.remove("eclat_brands").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path()).await.unwrap();
        storage.set_raw("eclat_products", "{not json").await.unwrap();

        let err = storage
            .read_json::<Vec<String>>("eclat_products")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CorruptLocalState { ref key, .. } if key == "eclat_products"));
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path()).await.unwrap();
        assert!(storage.get_raw("../etc/passwd").await.is_err());
        assert!(storage.set_raw("", "x").await.is_err());
    }

    #[test]
    fn test_collection_key() {
        assert_eq!(collection_key::<eclat_core::Brand>(), "eclat_brands");
        assert_eq!(collection_key::<eclat_core::ContactInfo>(), "eclat_contact_info");
    }
}
