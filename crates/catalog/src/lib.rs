//! Éclat Catalog - dual-backend data access.
//!
//! Routes catalog reads and writes to either the hosted backend (table API,
//! object storage, auth) or local persistent storage, transparently to
//! callers. The choice is made once, when the [`CatalogContext`] is built.
//!
//! # Layers
//!
//! - [`store`] - capability traits with [`remote`] and [`local`] implementations
//! - [`adapter`] / [`favorites`] - validation, ordering and the product image rule
//! - [`cache`] - reactive per-collection snapshots with coalesced refetches
//! - [`auth`] - token to session resolution
//! - [`search_history`] - per-user recent searches

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapter;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod favorites;
pub mod local;
pub mod mode;
pub mod remote;
pub mod search_history;
pub mod store;

pub use adapter::{ContactAdapter, EntityAdapter, ProductAdapter};
pub use auth::{AuthError, AuthProvider, Session};
pub use cache::{CollectionCache, Snapshot};
pub use config::{CatalogConfig, ConfigError};
pub use context::{CatalogCaches, CatalogContext};
pub use error::{StoreError, StoreResult};
pub use favorites::FavoritesAdapter;
pub use mode::BackendMode;
pub use search_history::{SearchEntry, SearchHistory};
pub use store::{ImageUpload, ProductQuery, ProductSort};
