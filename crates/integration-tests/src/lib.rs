//! Integration tests for Éclat.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eclat-integration-tests
//! ```
//!
//! Nothing external is required: the remote backend is an in-process mock
//! ([`mock::MockBackend`]) and the local backend writes to a temp directory.
//!
//! # Test Categories
//!
//! - `catalog_backends` - adapter behavior, identical on both backends
//! - `remote_backend` - wire behavior against the mock (images, auth, errors)
//! - `storefront_api` - HTTP surface driven in-process with `tower::ServiceExt`

pub mod mock;

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use eclat_catalog::{CatalogConfig, CatalogContext};
use eclat_storefront::state::AppState;
use tempfile::TempDir;

use mock::{MOCK_API_KEY, MockBackend};

/// Offline admin token used across tests.
pub const ADMIN_TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Configuration for local storage in `dir`.
///
/// # Panics
///
/// Panics if the configuration is rejected.
#[must_use]
pub fn offline_config(dir: &TempDir) -> CatalogConfig {
    let store_dir = dir.path().to_string_lossy();
    CatalogConfig::from_vars(&vars(&[
        ("ECLAT_OFFLINE_MODE", "true"),
        ("ECLAT_OFFLINE_ADMIN_TOKEN", ADMIN_TOKEN),
        ("ECLAT_LOCAL_STORE_DIR", &store_dir),
    ]))
    .expect("Offline configuration rejected")
}

/// Configuration for the mock backend, with local data in `dir`.
///
/// # Panics
///
/// Panics if the configuration is rejected.
#[must_use]
pub fn remote_config(backend: &MockBackend, dir: &TempDir) -> CatalogConfig {
    let store_dir = dir.path().to_string_lossy();
    CatalogConfig::from_vars(&vars(&[
        ("ECLAT_BACKEND_URL", backend.base_url().as_str()),
        ("ECLAT_BACKEND_API_KEY", MOCK_API_KEY),
        ("ECLAT_LOCAL_STORE_DIR", &store_dir),
        ("ECLAT_HTTP_TIMEOUT_SECS", "5"),
    ]))
    .expect("Remote configuration rejected")
}

/// Catalog on local storage.
///
/// # Panics
///
/// Panics if the context cannot be built.
pub async fn offline_catalog(dir: &TempDir) -> CatalogContext {
    CatalogContext::from_config(&offline_config(dir))
        .await
        .expect("Failed to build offline catalog")
}

/// Catalog on the mock backend.
///
/// # Panics
///
/// Panics if the context cannot be built.
pub async fn remote_catalog(backend: &MockBackend, dir: &TempDir) -> CatalogContext {
    CatalogContext::from_config(&remote_config(backend, dir))
        .await
        .expect("Failed to build remote catalog")
}

/// Storefront router over `catalog`, without Sentry layers.
#[must_use]
pub fn storefront(catalog: CatalogContext) -> Router {
    eclat_storefront::app(AppState::new(catalog, Duration::from_secs(60)), &[])
}
