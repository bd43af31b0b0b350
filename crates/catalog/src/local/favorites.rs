//! Favorites stored as one array of pairs under `eclat_favorites`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use eclat_core::{Favorite, ProductId, UserId};
use tracing::instrument;

use super::{KEY_PREFIX, LocalStorage};
use crate::error::StoreResult;
use crate::store::FavoriteStore;

/// Local favorites for every user.
#[derive(Clone)]
pub struct LocalFavorites {
    storage: LocalStorage,
    key: String,
}

impl LocalFavorites {
    #[must_use]
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            key: format!("{KEY_PREFIX}favorites"),
        }
    }

    async fn load(&self) -> StoreResult<BTreeSet<Favorite>> {
        Ok(self.storage.read_json(&self.key).await?.unwrap_or_default())
    }
}

#[async_trait]
impl FavoriteStore for LocalFavorites {
    #[instrument(skip(self))]
    async fn list(&self, user_id: &UserId) -> StoreResult<BTreeSet<ProductId>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|f| &f.user_id == user_id)
            .map(|f| f.product_id)
            .collect())
    }

    #[instrument(skip(self))]
    async fn contains(&self, favorite: &Favorite) -> StoreResult<bool> {
        Ok(self.load().await?.contains(favorite))
    }

    #[instrument(skip(self))]
    async fn add(&self, favorite: &Favorite) -> StoreResult<()> {
        let _guard = self.storage.lock().await;
        let mut favorites = self.load().await?;
        if favorites.insert(favorite.clone()) {
            self.storage.write_json(&self.key, &favorites).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, favorite: &Favorite) -> StoreResult<()> {
        let _guard = self.storage.lock().await;
        let mut favorites = self.load().await?;
        if favorites.remove(favorite) {
            self.storage.write_json(&self.key, &favorites).await?;
        }
        Ok(())
    }
}
