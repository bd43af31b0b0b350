//! Entity store adapters.
//!
//! Adapters sit between callers and the backing store chosen at startup.
//! They validate payloads, keep list ordering identical across stores, and
//! own the product-delete image cleanup rule. They never touch the cache:
//! invalidation is the caller's second step.

use std::sync::Arc;

use eclat_core::{
    CONTACT_INFO_ID, ContactInfo, ContactInfoId, Entity, NewContactInfo, NewProduct, Product,
    ProductId, Validate, sort_by_name,
};
use tracing::{info, instrument, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{EntityStore, ImageStore, ImageUpload, ProductQuery, ProductSearch};

// =============================================================================
// EntityAdapter
// =============================================================================

/// Uniform CRUD over one entity type.
pub struct EntityAdapter<T: Entity> {
    store: Arc<dyn EntityStore<T>>,
}

impl<T: Entity> Clone for EntityAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Entity> EntityAdapter<T> {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<T>>) -> Self {
        Self { store }
    }

    /// All records, ordered by name when the entity has one.
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` or `CorruptLocalState` from the backing store.
    pub async fn list(&self) -> StoreResult<Vec<T>> {
        let mut records = self.store.list().await?;
        // The remote store's collation may differ; normalize to catalog order.
        if T::ORDERED_BY_NAME {
            sort_by_name(&mut records);
        }
        Ok(records)
    }

    /// Single record, `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` or `CorruptLocalState` from the backing store.
    pub async fn get_by_id(&self, id: &T::Id) -> StoreResult<Option<T>> {
        self.store.get_by_id(id).await
    }

    /// Validate and persist a new record.
    ///
    /// Single-record collections are written under their fixed id and refuse
    /// a second record.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for invalid payloads, otherwise backing-store errors.
    #[instrument(skip(self, draft), fields(collection = T::COLLECTION))]
    pub async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        draft.validate()?;
        let created = match T::singleton_id() {
            Some(id) => {
                if !self.store.list().await?.is_empty() {
                    return Err(StoreError::ValidationFailed(format!(
                        "{} already holds its record",
                        T::COLLECTION
                    )));
                }
                self.store.upsert(T::from_draft(id, draft)).await?
            }
            None => self.store.create(draft).await?,
        };
        info!(id = %created.id(), "record created");
        Ok(created)
    }

    /// Validate and replace an existing record.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `ValidationFailed` for invalid records.
    #[instrument(skip(self, entity), fields(collection = T::COLLECTION, id = %entity.id()))]
    pub async fn update(&self, entity: T) -> StoreResult<T> {
        entity.validate_record()?;
        self.store.update(entity).await
    }

    /// Validate and write a record whether or not its id exists yet.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for invalid records, otherwise backing-store errors.
    #[instrument(skip(self, entity), fields(collection = T::COLLECTION, id = %entity.id()))]
    pub async fn upsert(&self, entity: T) -> StoreResult<T> {
        entity.validate_record()?;
        self.store.upsert(entity).await
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids; callers treat it as already satisfied.
    #[instrument(skip(self, id), fields(collection = T::COLLECTION, id = %id))]
    pub async fn delete(&self, id: &T::Id) -> StoreResult<()> {
        self.store.delete(id).await?;
        info!("record deleted");
        Ok(())
    }
}

// =============================================================================
// ProductAdapter
// =============================================================================

/// Products: CRUD plus filtered listing and image handling.
#[derive(Clone)]
pub struct ProductAdapter {
    entities: EntityAdapter<Product>,
    search: Arc<dyn ProductSearch>,
    images: Arc<dyn ImageStore>,
}

impl ProductAdapter {
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<Product>>,
        search: Arc<dyn ProductSearch>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            entities: EntityAdapter::new(store),
            search,
            images,
        }
    }

    /// The uniform contract, for callers generic over entity types.
    #[must_use]
    pub const fn entities(&self) -> &EntityAdapter<Product> {
        &self.entities
    }

    /// # Errors
    ///
    /// See [`EntityAdapter::list`].
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        self.entities.list().await
    }

    /// Filtered, sorted and paginated listing.
    ///
    /// The store only filters; ordering and the page cut happen here so both
    /// stores return the same page for the same query.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for invalid queries, otherwise backing-store errors.
    pub async fn query(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let matching = self.search.query(&query.unpaged()).await?;
        Ok(query.sort_and_page(matching))
    }

    /// # Errors
    ///
    /// See [`EntityAdapter::get_by_id`].
    pub async fn get_by_id(&self, id: &ProductId) -> StoreResult<Option<Product>> {
        self.entities.get_by_id(id).await
    }

    /// # Errors
    ///
    /// See [`EntityAdapter::create`].
    pub async fn create(&self, draft: NewProduct) -> StoreResult<Product> {
        self.entities.create(draft).await
    }

    /// Replace the product, then best-effort delete the stored image it no
    /// longer points at.
    ///
    /// # Errors
    ///
    /// See [`EntityAdapter::update`].
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub async fn update(&self, product: Product) -> StoreResult<Product> {
        product.validate_record()?;
        let previous = self
            .entities
            .get_by_id(&product.id)
            .await?
            .ok_or(StoreError::NotFound)?;
        let updated = self.entities.update(product).await?;

        if let Some(image_url) = previous.stored_image()
            && updated.stored_image() != Some(image_url)
            && let Err(e) = self.images.delete(image_url).await
        {
            warn!(error = %e, image_url = %image_url, "replaced image cleanup failed");
        }
        Ok(updated)
    }

    /// Delete the product, then best-effort delete its stored image.
    ///
    /// The record deletion is authoritative: image cleanup failures are
    /// logged and never returned. Products without an image, or showing the
    /// placeholder, make no storage call.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, otherwise backing-store errors.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn delete(&self, id: &ProductId) -> StoreResult<()> {
        let image = match self.entities.get_by_id(id).await? {
            Some(product) => product.stored_image().map(str::to_string),
            None => return Err(StoreError::NotFound),
        };

        self.entities.delete(id).await?;

        if let Some(image_url) = image
            && let Err(e) = self.images.delete(&image_url).await
        {
            warn!(error = %e, image_url = %image_url, "product deleted but image cleanup failed");
        }
        Ok(())
    }

    /// Store an image and point the product at it.
    ///
    /// The previous stored image, if any, is cleaned up best-effort.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown products, `ValidationFailed` for bad uploads.
    #[instrument(skip(self, upload), fields(id = %id))]
    pub async fn set_image(&self, id: &ProductId, upload: ImageUpload) -> StoreResult<Product> {
        let mut product = self.entities.get_by_id(id).await?.ok_or(StoreError::NotFound)?;
        let previous = product.stored_image().map(str::to_string);

        product.image_url = Some(self.images.upload(upload).await?);
        let updated = self.entities.update(product).await?;

        if let Some(image_url) = previous
            && let Err(e) = self.images.delete(&image_url).await
        {
            warn!(error = %e, image_url = %image_url, "replaced image cleanup failed");
        }
        Ok(updated)
    }

    /// Displayable URL for a product's image.
    ///
    /// # Errors
    ///
    /// Backing-store errors while reading a locally stored image.
    pub async fn image_for_display(&self, product: &Product) -> StoreResult<String> {
        match product.stored_image() {
            Some(url) => self.images.resolve(url).await,
            None => Ok(eclat_core::PLACEHOLDER_IMAGE_URL.to_string()),
        }
    }
}

// =============================================================================
// ContactAdapter
// =============================================================================

/// The contact-info singleton.
#[derive(Clone)]
pub struct ContactAdapter {
    entities: EntityAdapter<ContactInfo>,
}

impl ContactAdapter {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<ContactInfo>>) -> Self {
        Self {
            entities: EntityAdapter::new(store),
        }
    }

    /// The uniform contract over the singleton's collection.
    #[must_use]
    pub const fn entities(&self) -> &EntityAdapter<ContactInfo> {
        &self.entities
    }

    /// The record, if it has ever been saved.
    ///
    /// # Errors
    ///
    /// Backing-store errors.
    pub async fn get(&self) -> StoreResult<Option<ContactInfo>> {
        Ok(self.entities.list().await?.into_iter().next())
    }

    /// Create the record on first write, replace it afterward.
    ///
    /// A first write goes to the fixed singleton id as an upsert, so
    /// concurrent first saves converge on one record (last write wins).
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for invalid payloads, otherwise backing-store errors.
    #[instrument(skip(self, draft))]
    pub async fn save(&self, draft: NewContactInfo) -> StoreResult<ContactInfo> {
        draft.validate()?;
        match self.get().await? {
            Some(existing) => self.entities.update(existing.replaced_with(draft)).await,
            None => {
                let id = ContactInfoId::new(CONTACT_INFO_ID);
                self.entities.upsert(ContactInfo::from_draft(id, draft)).await
            }
        }
    }
}
