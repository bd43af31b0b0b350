//! The explicitly constructed catalog context.
//!
//! Built once at startup from [`CatalogConfig`]; the backing-store mode is
//! decided here and every adapter receives exactly one store implementation
//! for the life of the process.

use std::sync::Arc;

use eclat_core::{Brand, ContactInfo, Product, UtilityCategory};
use tracing::info;

use crate::adapter::{ContactAdapter, EntityAdapter, ProductAdapter};
use crate::auth::{AuthProvider, OfflineAuth, RemoteAuth};
use crate::cache::CollectionCache;
use crate::config::{BackendConfig, CatalogConfig};
use crate::error::StoreResult;
use crate::favorites::FavoritesAdapter;
use crate::local::{LocalFavorites, LocalImageStore, LocalStorage, LocalTable};
use crate::mode::BackendMode;
use crate::remote::RemoteClient;
use crate::search_history::SearchHistory;

/// One reactive cache per cached entity type.
#[derive(Clone)]
pub struct CatalogCaches {
    pub products: CollectionCache<Product>,
    pub brands: CollectionCache<Brand>,
    pub categories: CollectionCache<UtilityCategory>,
    pub contact: CollectionCache<ContactInfo>,
}

impl CatalogCaches {
    fn new(
        products: &ProductAdapter,
        brands: &EntityAdapter<Brand>,
        categories: &EntityAdapter<UtilityCategory>,
        contact: &ContactAdapter,
    ) -> Self {
        Self {
            products: CollectionCache::new(products.entities().clone()),
            brands: CollectionCache::new(brands.clone()),
            categories: CollectionCache::new(categories.clone()),
            contact: CollectionCache::new(contact.entities().clone()),
        }
    }

    /// Stop publishing on every cache.
    pub fn close(&self) {
        self.products.close();
        self.brands.close();
        self.categories.close();
        self.contact.close();
    }
}

/// Adapters, caches and collaborators for one backing-store mode.
#[derive(Clone)]
pub struct CatalogContext {
    mode: BackendMode,
    products: ProductAdapter,
    brands: EntityAdapter<Brand>,
    categories: EntityAdapter<UtilityCategory>,
    contact: ContactAdapter,
    favorites: FavoritesAdapter,
    caches: CatalogCaches,
    auth: Arc<dyn AuthProvider>,
    search_history: SearchHistory,
}

impl CatalogContext {
    /// Build the context for the configured mode.
    ///
    /// Local storage is opened in both modes: it always holds search history.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the local directory cannot be created, or
    /// `BackendUnavailable` if the HTTP client cannot be built.
    pub async fn from_config(config: &CatalogConfig) -> StoreResult<Self> {
        let storage = LocalStorage::open(&config.local_store_dir).await?;

        let context = match &config.backend {
            BackendConfig::Remote(remote) => {
                let client = RemoteClient::new(remote, config.http_timeout)?;
                let products = Arc::new(client.table::<Product>());
                Self::assemble(
                    BackendMode::Remote,
                    ProductAdapter::new(products.clone(), products, Arc::new(client.images())),
                    EntityAdapter::new(Arc::new(client.table::<Brand>())),
                    EntityAdapter::new(Arc::new(client.table::<UtilityCategory>())),
                    ContactAdapter::new(Arc::new(client.table::<ContactInfo>())),
                    FavoritesAdapter::new(Arc::new(client.favorites())),
                    Arc::new(RemoteAuth::new(client)),
                    SearchHistory::new(storage),
                )
            }
            BackendConfig::Local(offline) => {
                let products = Arc::new(LocalTable::<Product>::new(storage.clone()));
                Self::assemble(
                    BackendMode::Local,
                    ProductAdapter::new(
                        products.clone(),
                        products,
                        Arc::new(LocalImageStore::new(storage.clone())),
                    ),
                    EntityAdapter::new(Arc::new(LocalTable::<Brand>::new(storage.clone()))),
                    EntityAdapter::new(Arc::new(LocalTable::<UtilityCategory>::new(storage.clone()))),
                    ContactAdapter::new(Arc::new(LocalTable::<ContactInfo>::new(storage.clone()))),
                    FavoritesAdapter::new(Arc::new(LocalFavorites::new(storage.clone()))),
                    Arc::new(OfflineAuth::new(offline.admin_token.clone())),
                    SearchHistory::new(storage),
                )
            }
        };

        info!(mode = %context.mode, store_dir = %config.local_store_dir.display(), "catalog context ready");
        Ok(context)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        mode: BackendMode,
        products: ProductAdapter,
        brands: EntityAdapter<Brand>,
        categories: EntityAdapter<UtilityCategory>,
        contact: ContactAdapter,
        favorites: FavoritesAdapter,
        auth: Arc<dyn AuthProvider>,
        search_history: SearchHistory,
    ) -> Self {
        let caches = CatalogCaches::new(&products, &brands, &categories, &contact);
        Self {
            mode,
            products,
            brands,
            categories,
            contact,
            favorites,
            caches,
            auth,
            search_history,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> BackendMode {
        self.mode
    }

    /// Whether the catalog runs on local storage.
    #[must_use]
    pub const fn is_offline_mode(&self) -> bool {
        self.mode.is_offline()
    }

    #[must_use]
    pub const fn products(&self) -> &ProductAdapter {
        &self.products
    }

    #[must_use]
    pub const fn brands(&self) -> &EntityAdapter<Brand> {
        &self.brands
    }

    #[must_use]
    pub const fn categories(&self) -> &EntityAdapter<UtilityCategory> {
        &self.categories
    }

    #[must_use]
    pub const fn contact(&self) -> &ContactAdapter {
        &self.contact
    }

    #[must_use]
    pub const fn favorites(&self) -> &FavoritesAdapter {
        &self.favorites
    }

    #[must_use]
    pub const fn caches(&self) -> &CatalogCaches {
        &self.caches
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    #[must_use]
    pub const fn search_history(&self) -> &SearchHistory {
        &self.search_history
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use eclat_core::NewBrand;

    use super::*;

    async fn offline_context(dir: &tempfile::TempDir) -> CatalogContext {
        let vars: HashMap<String, String> = [
            ("ECLAT_OFFLINE_MODE", "true"),
            ("ECLAT_OFFLINE_ADMIN_TOKEN", "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"),
            ("ECLAT_LOCAL_STORE_DIR", dir.path().to_str().unwrap()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        CatalogContext::from_config(&CatalogConfig::from_vars(&vars).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_offline_context_uses_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let context = offline_context(&dir).await;
        assert!(context.is_offline_mode());

        context
            .brands()
            .create(NewBrand { name: "Extra Clean".to_string() })
            .await
            .unwrap();

        assert!(dir.path().join("eclat_brands.json").exists());
        let snapshot = context.caches().brands.refresh().await;
        assert_eq!(snapshot.items.len(), 1);
    }
}
