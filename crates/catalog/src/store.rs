//! Backing-store capability traits.
//!
//! Each trait has exactly two implementations: [`remote`](crate::remote)
//! (hosted table API + object storage) and [`local`](crate::local)
//! (directory-backed key-value storage). Adapters hold one of them behind an
//! `Arc<dyn ...>` chosen once when the [`CatalogContext`](crate::CatalogContext)
//! is built.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use async_trait::async_trait;
use eclat_core::{
    BrandId, CategoryId, CollationKey, Entity, Favorite, Product, ProductId, UserId,
};
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Uniform CRUD contract over one entity collection.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// All records. Empty collections are `Ok(vec![])`.
    async fn list(&self) -> StoreResult<Vec<T>>;

    /// Single record lookup. `Ok(None)` when the id does not exist.
    async fn get_by_id(&self, id: &T::Id) -> StoreResult<Option<T>>;

    /// Persist a new record and return it with its assigned id.
    async fn create(&self, draft: T::Draft) -> StoreResult<T>;

    /// Replace the record with the same id.
    async fn update(&self, entity: T) -> StoreResult<T>;

    /// Insert the record, or replace the one with the same id, in one write.
    async fn upsert(&self, entity: T) -> StoreResult<T>;

    /// Remove a record. `Err(NotFound)` for unknown ids.
    async fn delete(&self, id: &T::Id) -> StoreResult<()>;
}

/// Filtered product listing, executed by the backing store.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn query(&self, query: &ProductQuery) -> StoreResult<Vec<Product>>;
}

/// Persistence of (user, product) favorite pairs.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Product ids the user has favorited.
    async fn list(&self, user_id: &UserId) -> StoreResult<BTreeSet<ProductId>>;

    async fn contains(&self, favorite: &Favorite) -> StoreResult<bool>;

    /// Insert the pair. Adding an existing pair is not an error.
    async fn add(&self, favorite: &Favorite) -> StoreResult<()>;

    /// Remove the pair. Removing an absent pair is not an error.
    async fn remove(&self, favorite: &Favorite) -> StoreResult<()>;
}

/// Storage for product pictures.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image and return the reference to save on the product.
    async fn upload(&self, image: ImageUpload) -> StoreResult<String>;

    /// Delete a previously uploaded image by its reference.
    async fn delete(&self, image_url: &str) -> StoreResult<()>;

    /// Turn a stored reference into something a client can display.
    async fn resolve(&self, image_url: &str) -> StoreResult<String>;
}

// =============================================================================
// Product query
// =============================================================================

/// Explicit ordering for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Name ascending (the default collection order).
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
}

/// Filter, sort and pagination parameters for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    pub sort: ProductSort,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Longest accepted search term.
pub const MAX_SEARCH_LENGTH: usize = 100;

impl ProductQuery {
    /// The normalized search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Reject queries no backing store should run.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for overlong search terms.
    pub fn validate(&self) -> StoreResult<()> {
        if self
            .search_term()
            .is_some_and(|term| term.chars().count() > MAX_SEARCH_LENGTH)
        {
            return Err(StoreError::ValidationFailed(format!(
                "search must be at most {MAX_SEARCH_LENGTH} characters"
            )));
        }
        Ok(())
    }

    /// Whether a product passes the filters (ignores sort and pagination).
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = &self.category_id
            && product.category_id.as_ref() != Some(category_id)
        {
            return false;
        }
        if let Some(brand_id) = &self.brand_id
            && product.brand_id.as_ref() != Some(brand_id)
        {
            return false;
        }
        self.search_term().is_none_or(|term| {
            let term = term.to_lowercase();
            product.name.to_lowercase().contains(&term)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
        })
    }

    /// Filter, sort and paginate an in-memory collection.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        self.sort_and_page(products.into_iter().filter(|p| self.matches(p)).collect())
    }

    /// Sort already-filtered products and cut the requested page.
    ///
    /// Names compare in catalog order ([`CollationKey`]), also when breaking
    /// price ties.
    #[must_use]
    pub fn sort_and_page(&self, mut products: Vec<Product>) -> Vec<Product> {
        match self.sort {
            ProductSort::Name => eclat_core::sort_by_name(&mut products),
            ProductSort::PriceAsc => {
                products.sort_by_cached_key(|p| (p.price, CollationKey::new(&p.name)));
            }
            ProductSort::PriceDesc => {
                products.sort_by_cached_key(|p| (Reverse(p.price), CollationKey::new(&p.name)));
            }
        }
        products
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// The same filters and sort, without pagination.
    #[must_use]
    pub fn unpaged(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }
}

// =============================================================================
// Image upload
// =============================================================================

/// Largest accepted image upload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image about to be stored.
#[derive(Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl ImageUpload {
    /// Check the upload is a non-empty image within the size limit.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` describing the problem.
    pub fn validate(&self) -> StoreResult<()> {
        if self.bytes.is_empty() {
            return Err(StoreError::ValidationFailed("image is empty".to_string()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(StoreError::ValidationFailed(format!(
                "image exceeds {MAX_IMAGE_BYTES} bytes"
            )));
        }
        if !self.content_type.starts_with("image/") {
            return Err(StoreError::ValidationFailed(format!(
                "unsupported content type {}",
                self.content_type
            )));
        }
        Ok(())
    }

    /// File extension for the stored object, from the name or the content type.
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| match self.content_type.as_str() {
                "image/jpeg" => "jpg".to_string(),
                "image/webp" => "webp".to_string(),
                "image/svg+xml" => "svg".to_string(),
                "image/gif" => "gif".to_string(),
                _ => "png".to_string(),
            })
    }
}
