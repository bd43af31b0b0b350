//! Seed the catalog from a YAML file.
//!
//! Brands and categories are matched by name, so re-running a seed file does
//! not duplicate them. Products are skipped when a product with the same name
//! already exists.
//!
//! ```yaml
//! brands:
//!   - name: Extra Clean
//! categories:
//!   - name: Vitres
//!     color: "#3b82f6"
//! products:
//!   - name: Nettoyant Vitres
//!     price: 1350
//!     brand: Extra Clean
//!     category: Vitres
//! contact:
//!   phone: "+213 21 55 12 34"
//! ```

use std::collections::HashMap;
use std::path::Path;

use eclat_catalog::{CatalogContext, StoreError};
use eclat_core::{
    BrandId, CategoryId, NewBrand, NewContactInfo, NewProduct, NewUtilityCategory, Price,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::open_catalog;

/// Errors seeding the catalog.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Product {product:?} references unknown brand {brand:?}")]
    UnknownBrand { product: String, brand: String },
    #[error("Product {product:?} references unknown category {category:?}")]
    UnknownCategory { product: String, category: String },
}

/// Top-level seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub brands: Vec<NewBrand>,
    pub categories: Vec<NewUtilityCategory>,
    pub products: Vec<SeedProduct>,
    pub contact: Option<NewContactInfo>,
}

/// A product referencing its brand and category by name.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// What a seed run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub brands: usize,
    pub categories: usize,
    pub products: usize,
    pub skipped_products: usize,
    pub contact_saved: bool,
}

/// Seed the configured catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, configuration is
/// missing, or a write fails.
pub async fn from_file(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let catalog = open_catalog().await?;
    let report = seed_catalog(&catalog, seed).await?;

    info!("Seeding complete!");
    info!("  Brands created: {}", report.brands);
    info!("  Categories created: {}", report.categories);
    info!("  Products created: {}", report.products);
    info!("  Products skipped (already exist): {}", report.skipped_products);
    info!("  Contact info saved: {}", report.contact_saved);
    Ok(())
}

/// Write a parsed seed file through the catalog adapters.
///
/// # Errors
///
/// Returns `SeedError` on unknown references or store failures. Records
/// written before the failure are kept.
pub async fn seed_catalog(
    catalog: &CatalogContext,
    seed: SeedFile,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let mut brand_ids: HashMap<String, BrandId> = catalog
        .brands()
        .list()
        .await?
        .into_iter()
        .map(|brand| (brand.name, brand.id))
        .collect();
    for draft in seed.brands {
        if brand_ids.contains_key(&draft.name) {
            continue;
        }
        let brand = catalog.brands().create(draft).await?;
        brand_ids.insert(brand.name, brand.id);
        report.brands += 1;
    }

    let mut category_ids: HashMap<String, CategoryId> = catalog
        .categories()
        .list()
        .await?
        .into_iter()
        .map(|category| (category.name, category.id))
        .collect();
    for draft in seed.categories {
        if category_ids.contains_key(&draft.name) {
            continue;
        }
        let category = catalog.categories().create(draft).await?;
        category_ids.insert(category.name, category.id);
        report.categories += 1;
    }

    let existing: Vec<String> = catalog
        .products()
        .list()
        .await?
        .into_iter()
        .map(|product| product.name)
        .collect();
    for product in seed.products {
        if existing.contains(&product.name) {
            report.skipped_products += 1;
            continue;
        }

        let brand_id = match product.brand {
            Some(brand) => Some(brand_ids.get(&brand).cloned().ok_or_else(|| {
                SeedError::UnknownBrand {
                    product: product.name.clone(),
                    brand,
                }
            })?),
            None => None,
        };
        let category_id = match product.category {
            Some(category) => Some(category_ids.get(&category).cloned().ok_or_else(|| {
                SeedError::UnknownCategory {
                    product: product.name.clone(),
                    category,
                }
            })?),
            None => None,
        };

        catalog
            .products()
            .create(NewProduct {
                name: product.name,
                description: product.description,
                price: product.price,
                image_url: product.image_url,
                category_id,
                brand_id,
            })
            .await?;
        report.products += 1;
    }

    if let Some(contact) = seed.contact {
        catalog.contact().save(contact).await?;
        report.contact_saved = true;
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eclat_catalog::CatalogConfig;
    use eclat_core::UNKNOWN_LABEL;

    use super::*;

    const SEED: &str = r##"
brands:
  - name: Extra Clean
categories:
  - name: Vitres
    color: "#3b82f6"
products:
  - name: Nettoyant Vitres
    price: 1350
    brand: Extra Clean
    category: Vitres
  - name: Savon Noir
    price: 450
contact:
  phone: "+213 21 55 12 34"
"##;

    async fn offline_catalog(dir: &tempfile::TempDir) -> CatalogContext {
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
    async fn test_seed_resolves_references_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = offline_catalog(&dir).await;

        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        let report = seed_catalog(&catalog, seed).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                brands: 1,
                categories: 1,
                products: 2,
                skipped_products: 0,
                contact_saved: true,
            }
        );

        let brands = catalog.brands().list().await.unwrap();
        let products = catalog.products().list().await.unwrap();
        let vitres = products.iter().find(|p| p.name == "Nettoyant Vitres").unwrap();
        assert_eq!(vitres.brand_id.as_ref(), Some(&brands[0].id));
        assert_ne!(
            eclat_core::display_name(&brands, vitres.brand_id.as_ref()),
            Some(UNKNOWN_LABEL)
        );
    }

    #[tokio::test]
    async fn test_reseed_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = offline_catalog(&dir).await;

        seed_catalog(&catalog, serde_yaml::from_str(SEED).unwrap())
            .await
            .unwrap();
        let report = seed_catalog(&catalog, serde_yaml::from_str(SEED).unwrap())
            .await
            .unwrap();

        assert_eq!(report.brands, 0);
        assert_eq!(report.skipped_products, 2);
        assert_eq!(catalog.products().list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_brand_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = offline_catalog(&dir).await;

        let seed: SeedFile = serde_yaml::from_str(
            "products:\n  - name: Javel\n    price: 200\n    brand: Introuvable\n",
        )
        .unwrap();
        let err = seed_catalog(&catalog, seed).await.unwrap_err();
        assert!(matches!(err, SeedError::UnknownBrand { .. }));
    }
}
