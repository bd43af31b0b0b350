//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use eclat_catalog::{CatalogContext, Session};
use moka::future::Cache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog context and the resolved-session cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CatalogContext,
    sessions: Cache<String, Session>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog context built for the configured mode
    /// * `session_ttl` - How long a resolved session is reused
    #[must_use]
    pub fn new(catalog: CatalogContext, session_ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(session_ttl)
            .build();

        Self {
            inner: Arc::new(AppStateInner { catalog, sessions }),
        }
    }

    /// Get a reference to the catalog context.
    #[must_use]
    pub fn catalog(&self) -> &CatalogContext {
        &self.inner.catalog
    }

    /// Get a reference to the resolved-session cache, keyed by bearer token.
    #[must_use]
    pub fn sessions(&self) -> &Cache<String, Session> {
        &self.inner.sessions
    }
}
