//! CLI command implementations.
//!
//! # Environment Variables
//!
//! Commands read the same `ECLAT_*` variables as the storefront; see
//! [`eclat_catalog::config`].

pub mod list;
pub mod seed;

use eclat_catalog::{CatalogConfig, CatalogContext};
use tracing::info;

/// Build the catalog context for the configured mode.
///
/// # Errors
///
/// Returns an error if configuration is missing or the store cannot be opened.
pub async fn open_catalog() -> Result<CatalogContext, Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;
    let catalog = CatalogContext::from_config(&config).await?;
    info!(mode = %catalog.mode(), "Catalog opened");
    Ok(catalog)
}

/// Print the backing-store mode the environment selects.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid.
pub fn mode() -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;
    info!(
        "Backing store: {} (local data in {})",
        config.mode(),
        config.local_store_dir.display()
    );
    Ok(())
}
