//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, one transaction per request)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (only when `STOREFRONT_ALLOWED_ORIGINS` is set)
//!
//! Authentication is per-route through the extractors in [`auth`].

pub mod auth;

pub use auth::{AuthRejection, RequireAdmin, RequireProductManager, RequireSession};
