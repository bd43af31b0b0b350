//! Product images stored as data URLs.
//!
//! Each upload is written under `eclat_image_<uuid>` and the product keeps a
//! `local-image://<uuid>` reference to it.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eclat_core::PLACEHOLDER_IMAGE_URL;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{KEY_PREFIX, LocalStorage};
use crate::error::{StoreError, StoreResult};
use crate::store::{ImageStore, ImageUpload};

/// Scheme of image references produced by the local store.
pub const LOCAL_IMAGE_SCHEME: &str = "local-image://";

/// Image store backed by local storage.
#[derive(Clone)]
pub struct LocalImageStore {
    storage: LocalStorage,
}

impl LocalImageStore {
    #[must_use]
    pub const fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Storage key for a `local-image://` reference.
    fn key_for(image_url: &str) -> StoreResult<String> {
        image_url
            .strip_prefix(LOCAL_IMAGE_SCHEME)
            .and_then(|id| Uuid::parse_str(id).ok())
            .map(|id| format!("{KEY_PREFIX}image_{id}"))
            .ok_or_else(|| {
                StoreError::ValidationFailed(format!("{image_url} is not a local image reference"))
            })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    #[instrument(skip(self, image), fields(file_name = %image.file_name, bytes = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> StoreResult<String> {
        image.validate()?;
        let id = Uuid::new_v4();
        let data_url = format!(
            "data:{};base64,{}",
            image.content_type,
            STANDARD.encode(&image.bytes)
        );
        self.storage
            .write_json(&format!("{KEY_PREFIX}image_{id}"), &data_url)
            .await?;
        info!(%id, "image stored locally");
        Ok(format!("{LOCAL_IMAGE_SCHEME}{id}"))
    }

    #[instrument(skip(self))]
    async fn delete(&self, image_url: &str) -> StoreResult<()> {
        if image_url == PLACEHOLDER_IMAGE_URL {
            return Ok(());
        }
        if self.storage.remove(&Self::key_for(image_url)?).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn resolve(&self, image_url: &str) -> StoreResult<String> {
        if !image_url.starts_with(LOCAL_IMAGE_SCHEME) {
            return Ok(image_url.to_string());
        }
        let stored: Option<String> = self.storage.read_json(&Self::key_for(image_url)?).await?;
        Ok(stored.unwrap_or_else(|| {
            warn!(image_url, "local image missing, showing placeholder");
            PLACEHOLDER_IMAGE_URL.to_string()
        }))
    }
}
