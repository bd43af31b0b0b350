//! Entity collections stored as JSON arrays.

use std::marker::PhantomData;

use async_trait::async_trait;
use eclat_core::{Entity, EntityId, Product, sort_by_name};
use tracing::{debug, instrument};

use super::{LocalStorage, collection_key};
use crate::error::{StoreError, StoreResult};
use crate::store::{EntityStore, ProductQuery, ProductSearch};

/// One entity collection in local storage.
pub struct LocalTable<T> {
    storage: LocalStorage,
    key: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalTable<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            key: self.key.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> LocalTable<T> {
    /// Collection for `T` under its standard key.
    #[must_use]
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            key: collection_key::<T>(),
            _entity: PhantomData,
        }
    }

    async fn load(&self) -> StoreResult<Vec<T>> {
        Ok(self.storage.read_json(&self.key).await?.unwrap_or_default())
    }

    async fn save(&self, records: &[T]) -> StoreResult<()> {
        self.storage.write_json(&self.key, records).await
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for LocalTable<T> {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn list(&self) -> StoreResult<Vec<T>> {
        let mut records = self.load().await?;
        if T::ORDERED_BY_NAME {
            sort_by_name(&mut records);
        }
        Ok(records)
    }

    #[instrument(skip(self, id), fields(key = %self.key, id = %id))]
    async fn get_by_id(&self, id: &T::Id) -> StoreResult<Option<T>> {
        Ok(self.load().await?.into_iter().find(|r| r.id() == id))
    }

    #[instrument(skip(self, draft), fields(key = %self.key))]
    async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        let _guard = self.storage.lock().await;
        let mut records = self.load().await?;

        let mut id = T::Id::generate();
        while records.iter().any(|r| r.id() == &id) {
            debug!(id = %id, "generated id collided, retrying");
            id = T::Id::generate();
        }

        let record = T::from_draft(id, draft);
        records.push(record.clone());
        self.save(&records).await?;
        Ok(record)
    }

    #[instrument(skip(self, entity), fields(key = %self.key, id = %entity.id()))]
    async fn update(&self, entity: T) -> StoreResult<T> {
        let _guard = self.storage.lock().await;
        let mut records = self.load().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == entity.id())
            .ok_or(StoreError::NotFound)?;
        *slot = entity.clone();
        self.save(&records).await?;
        Ok(entity)
    }

    #[instrument(skip(self, entity), fields(key = %self.key, id = %entity.id()))]
    async fn upsert(&self, entity: T) -> StoreResult<T> {
        let _guard = self.storage.lock().await;
        let mut records = self.load().await?;
        match records.iter_mut().find(|r| r.id() == entity.id()) {
            Some(slot) => *slot = entity.clone(),
            None => records.push(entity.clone()),
        }
        self.save(&records).await?;
        Ok(entity)
    }

    #[instrument(skip(self, id), fields(key = %self.key, id = %id))]
    async fn delete(&self, id: &T::Id) -> StoreResult<()> {
        let _guard = self.storage.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(StoreError::NotFound);
        }
        self.save(&records).await
    }
}

#[async_trait]
impl ProductSearch for LocalTable<Product> {
    #[instrument(skip(self))]
    async fn query(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        query.validate()?;
        Ok(query.apply(self.load().await?))
    }
}
