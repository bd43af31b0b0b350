//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness (backing store reachable)
//!
//! # Catalog (public)
//! GET  /api/products                    - Product listing (?category=&brand=&q=&sort=&limit=&offset=)
//! GET  /api/products/{id}               - Product detail
//! GET  /api/brands                      - Brand listing
//! GET  /api/categories                  - Category listing
//! GET  /api/contact                     - Contact information
//!
//! # Favorites (signed in)
//! GET    /api/favorites                 - Favorited product ids
//! PUT    /api/favorites/{product_id}    - Add a favorite
//! POST   /api/favorites/{product_id}    - Toggle a favorite
//! DELETE /api/favorites/{product_id}    - Remove a favorite
//!
//! # Search history (signed in)
//! GET    /api/search-history            - Recent searches
//! POST   /api/search-history            - Record a search
//! DELETE /api/search-history            - Clear history
//!
//! # Admin (admin or vendeur for products, admin for the rest)
//! POST   /api/admin/products            - Create product
//! PUT    /api/admin/products/{id}       - Replace product
//! DELETE /api/admin/products/{id}       - Delete product and its image
//! POST   /api/admin/products/{id}/image - Upload product image (multipart)
//! POST   /api/admin/brands              - Create brand
//! PUT    /api/admin/brands/{id}         - Rename brand
//! DELETE /api/admin/brands/{id}         - Delete brand
//! POST   /api/admin/categories          - Create category
//! PUT    /api/admin/categories/{id}     - Replace category
//! DELETE /api/admin/categories/{id}     - Delete category
//! PUT    /api/admin/contact             - Save contact information
//! ```

pub mod admin;
pub mod catalog;
pub mod favorites;
pub mod health;
pub mod products;
pub mod search_history;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use eclat_catalog::store::MAX_IMAGE_BYTES;
use eclat_catalog::{Snapshot, StoreError};

use crate::error::Result;
use crate::state::AppState;

/// Items of a settled snapshot, or `BackendUnavailable` if it never loaded.
pub(crate) fn loaded_items<T>(snapshot: Snapshot<T>) -> Result<Arc<Vec<T>>> {
    if snapshot.loaded {
        return Ok(snapshot.items);
    }
    Err(StoreError::BackendUnavailable(
        snapshot
            .last_error
            .unwrap_or_else(|| "collection not loaded".to_string()),
    )
    .into())
}

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/brands", get(catalog::brands))
        .route("/categories", get(catalog::categories))
        .route("/contact", get(catalog::contact))
}

/// Create the signed-in customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(favorites::index))
        .route(
            "/favorites/{product_id}",
            put(favorites::add)
                .post(favorites::toggle)
                .delete(favorites::remove),
        )
        .route(
            "/search-history",
            get(search_history::index)
                .post(search_history::record)
                .delete(search_history::clear),
        )
}

/// Create the back-office routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route(
            "/products/{id}/image",
            post(admin::upload_product_image)
                // Room for the multipart framing around a maximum-size image
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route("/brands", post(admin::create_brand))
        .route(
            "/brands/{id}",
            put(admin::update_brand).delete(admin::delete_brand),
        )
        .route("/categories", post(admin::create_category))
        .route(
            "/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/contact", put(admin::save_contact))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        // Public catalog
        .nest("/api", catalog_routes().merge(customer_routes()))
        // Back-office
        .nest("/api/admin", admin_routes())
}
