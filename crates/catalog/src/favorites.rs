//! Favorites sub-adapter.

use std::collections::BTreeSet;
use std::sync::Arc;

use eclat_core::{Favorite, ProductId, UserId};
use tracing::{debug, instrument};

use crate::error::StoreResult;
use crate::store::FavoriteStore;

/// Per-user favorite products.
#[derive(Clone)]
pub struct FavoritesAdapter {
    store: Arc<dyn FavoriteStore>,
}

impl FavoritesAdapter {
    #[must_use]
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    /// Product ids the user has favorited.
    ///
    /// # Errors
    ///
    /// Backing-store errors.
    pub async fn list(&self, user_id: &UserId) -> StoreResult<BTreeSet<ProductId>> {
        self.store.list(user_id).await
    }

    /// # Errors
    ///
    /// Backing-store errors.
    pub async fn add(&self, product_id: &ProductId, user_id: &UserId) -> StoreResult<()> {
        self.store
            .add(&Favorite::new(user_id.clone(), product_id.clone()))
            .await
    }

    /// # Errors
    ///
    /// Backing-store errors.
    pub async fn remove(&self, product_id: &ProductId, user_id: &UserId) -> StoreResult<()> {
        self.store
            .remove(&Favorite::new(user_id.clone(), product_id.clone()))
            .await
    }

    /// Flip membership and return the new state.
    ///
    /// Reads, then writes. Two concurrent toggles of the same pair can both
    /// observe the same state and leave it unchanged.
    ///
    /// # Errors
    ///
    /// Backing-store errors; membership is unchanged when the write fails.
    #[instrument(skip(self))]
    pub async fn toggle(&self, product_id: &ProductId, user_id: &UserId) -> StoreResult<bool> {
        let favorite = Favorite::new(user_id.clone(), product_id.clone());
        let favorited = if self.store.contains(&favorite).await? {
            self.store.remove(&favorite).await?;
            false
        } else {
            self.store.add(&favorite).await?;
            true
        };
        debug!(favorited, "favorite toggled");
        Ok(favorited)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::local::{LocalFavorites, LocalStorage};

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let dir = tempfile::tempdir().unwrap();
        let favorites = FavoritesAdapter::new(Arc::new(LocalFavorites::new(
            LocalStorage::open(dir.path()).await.unwrap(),
        )));
        let user = UserId::new("u1");
        let product = ProductId::new("p1");

        assert!(favorites.toggle(&product, &user).await.unwrap());
        assert!(favorites.list(&user).await.unwrap().contains(&product));
        assert!(!favorites.toggle(&product, &user).await.unwrap());
        assert!(favorites.list(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_remove() {
        let dir = tempfile::tempdir().unwrap();
        let favorites = FavoritesAdapter::new(Arc::new(LocalFavorites::new(
            LocalStorage::open(dir.path()).await.unwrap(),
        )));
        let user = UserId::new("u1");

        favorites.add(&ProductId::new("p1"), &user).await.unwrap();
        favorites.add(&ProductId::new("p2"), &user).await.unwrap();
        favorites.remove(&ProductId::new("p1"), &user).await.unwrap();
        favorites.remove(&ProductId::new("p9"), &user).await.unwrap();

        assert_eq!(
            favorites.list(&user).await.unwrap(),
            BTreeSet::from([ProductId::new("p2")])
        );
    }
}
