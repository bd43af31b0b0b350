//! Object storage for product images.
//!
//! Uploads land under `products/{uuid}.{ext}` in the configured bucket and are
//! referenced by their public URL. Deletes derive the object path back from
//! that URL.

use async_trait::async_trait;
use eclat_core::PLACEHOLDER_IMAGE_URL;
use reqwest::Method;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::RemoteClient;
use crate::error::{StoreError, StoreResult};
use crate::store::{ImageStore, ImageUpload};

/// Image bucket on the hosted backend.
#[derive(Clone)]
pub struct RemoteImageStore {
    client: RemoteClient,
}

impl RemoteImageStore {
    pub(crate) const fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    fn public_prefix(&self) -> String {
        format!(
            "{}storage/v1/object/public/{}/",
            self.client.base_url(),
            self.client.storage_bucket()
        )
    }

    /// Object path inside the bucket for a public URL, if it belongs to it.
    pub(crate) fn storage_path(&self, image_url: &str) -> Option<String> {
        image_url
            .strip_prefix(&self.public_prefix())
            .map(|path| path.split(['?', '#']).next().unwrap_or_default().to_string())
            .filter(|path| !path.is_empty())
    }
}

#[async_trait]
impl ImageStore for RemoteImageStore {
    #[instrument(skip(self, image), fields(file_name = %image.file_name, bytes = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> StoreResult<String> {
        image.validate()?;
        let bucket = self.client.storage_bucket();
        let path = format!("products/{}.{}", Uuid::new_v4(), image.extension());

        let request = self
            .client
            .request(
                Method::POST,
                self.client.url(&format!("storage/v1/object/{bucket}/{path}"))?,
            )
            .header("Content-Type", image.content_type)
            .header("x-upsert", "false")
            .body(image.bytes);
        self.client.send(request).await?;

        let public_url = format!("{}{path}", self.public_prefix());
        info!(path = %path, "image uploaded");
        Ok(public_url)
    }

    #[instrument(skip(self))]
    async fn delete(&self, image_url: &str) -> StoreResult<()> {
        if image_url == PLACEHOLDER_IMAGE_URL {
            return Ok(());
        }
        let path = self.storage_path(image_url).ok_or_else(|| {
            StoreError::ValidationFailed(format!("{image_url} is not stored in this bucket"))
        })?;

        let bucket = self.client.storage_bucket();
        let request = self
            .client
            .request(Method::DELETE, self.client.url(&format!("storage/v1/object/{bucket}"))?)
            .json(&json!({ "prefixes": [path] }));
        self.client.send(request).await?;
        Ok(())
    }

    async fn resolve(&self, image_url: &str) -> StoreResult<String> {
        Ok(image_url.to_string())
    }
}
