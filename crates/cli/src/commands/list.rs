//! Collection listing commands.

use eclat_catalog::CatalogContext;
use eclat_core::{CurrencyCode, display_name};
use tracing::info;

/// List products with their resolved brand and category.
///
/// # Errors
///
/// Returns an error if the backing store cannot be read.
pub async fn products(catalog: &CatalogContext) -> Result<(), Box<dyn std::error::Error>> {
    let (products, brands, categories) = tokio::try_join!(
        catalog.products().list(),
        catalog.brands().list(),
        catalog.categories().list()
    )?;

    info!("{} products", products.len());
    for product in &products {
        info!(
            "  {} | {} | {} | {} | {}",
            product.id,
            product.name,
            product.price.format(CurrencyCode::default()),
            display_name(&brands, product.brand_id.as_ref()).unwrap_or("-"),
            display_name(&categories, product.category_id.as_ref()).unwrap_or("-"),
        );
    }
    Ok(())
}

/// List brands.
///
/// # Errors
///
/// Returns an error if the backing store cannot be read.
pub async fn brands(catalog: &CatalogContext) -> Result<(), Box<dyn std::error::Error>> {
    let brands = catalog.brands().list().await?;
    info!("{} brands", brands.len());
    for brand in &brands {
        info!("  {} | {}", brand.id, brand.name);
    }
    Ok(())
}

/// List utility categories.
///
/// # Errors
///
/// Returns an error if the backing store cannot be read.
pub async fn categories(catalog: &CatalogContext) -> Result<(), Box<dyn std::error::Error>> {
    let categories = catalog.categories().list().await?;
    info!("{} categories", categories.len());
    for category in &categories {
        info!("  {} | {} | {}", category.id, category.name, category.color);
    }
    Ok(())
}
