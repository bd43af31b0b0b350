//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use eclat_core::{
    Brand, BrandId, CategoryId, CurrencyCode, Product, ProductId, UtilityCategory, display_name,
};
use eclat_catalog::{ProductQuery, ProductSort};
use serde::{Deserialize, Serialize};

use super::loaded_items;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Product as served to clients: the record plus resolved labels.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price_display: String,
    /// `None` without a brand reference, "Inconnu" when the brand is gone.
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
}

impl ProductView {
    /// Resolve a product's brand and category labels.
    #[must_use]
    pub fn new(product: Product, brands: &[Brand], categories: &[UtilityCategory]) -> Self {
        let brand_name = display_name(brands, product.brand_id.as_ref()).map(str::to_string);
        let category_name =
            display_name(categories, product.category_id.as_ref()).map(str::to_string);
        Self {
            price_display: product.price.format(CurrencyCode::default()),
            product,
            brand_name,
            category_name,
        }
    }
}

/// Product listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub q: Option<String>,
    pub sort: Option<ProductSort>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ProductListParams {
    /// Convert to a store query.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` when `limit` exceeds [`MAX_PAGE_SIZE`].
    pub fn into_query(self) -> Result<ProductQuery> {
        if self.limit.is_some_and(|limit| limit > MAX_PAGE_SIZE) {
            return Err(AppError::BadRequest(format!(
                "limit cannot exceed {MAX_PAGE_SIZE}"
            )));
        }
        Ok(ProductQuery {
            category_id: non_empty(self.category).map(CategoryId::new),
            brand_id: non_empty(self.brand).map(BrandId::new),
            search: non_empty(self.q),
            sort: self.sort.unwrap_or_default(),
            limit: self.limit,
            offset: self.offset,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reference data used to label products.
async fn labels(state: &AppState) -> (Vec<Brand>, Vec<UtilityCategory>) {
    let caches = state.catalog().caches();
    let (brands, categories) = tokio::join!(
        caches.brands.ensure_loaded(),
        caches.categories.ensure_loaded()
    );
    // Unloaded reference data degrades to "Inconnu" labels.
    (brands.items.to_vec(), categories.items.to_vec())
}

/// List products.
///
/// An unfiltered listing is served from the product cache; anything with a
/// filter, search term, explicit sort or page goes to the backing store.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<Vec<ProductView>>> {
    let query = params.into_query()?;

    let products = if query == ProductQuery::default() {
        let snapshot = state.catalog().caches().products.ensure_loaded().await;
        loaded_items(snapshot)?.to_vec()
    } else {
        state.catalog().products().query(&query).await?
    };

    let (brands, categories) = labels(&state).await;
    Ok(Json(
        products
            .into_iter()
            .map(|product| ProductView::new(product, &brands, &categories))
            .collect(),
    ))
}

/// Show one product, with its image resolved for display.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let products = state.catalog().products();
    let mut product = products
        .get_by_id(&ProductId::new(id.as_str()))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    product.image_url = Some(products.image_for_display(&product).await?);

    let (brands, categories) = labels(&state).await;
    Ok(Json(ProductView::new(product, &brands, &categories)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eclat_core::{Price, UNKNOWN_LABEL};

    use super::*;

    fn product(brand_id: Option<&str>) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Nettoyant Vitres".to_string(),
            description: None,
            price: Price::from_minor_units(1350).unwrap(),
            image_url: None,
            category_id: None,
            brand_id: brand_id.map(BrandId::new),
        }
    }

    #[test]
    fn test_view_resolves_labels() {
        let brands = vec![Brand {
            id: BrandId::new("b1"),
            name: "Extra Clean".to_string(),
        }];

        let view = ProductView::new(product(Some("b1")), &brands, &[]);
        assert_eq!(view.brand_name.as_deref(), Some("Extra Clean"));
        assert_eq!(view.category_name, None);

        let view = ProductView::new(product(Some("gone")), &brands, &[]);
        assert_eq!(view.brand_name.as_deref(), Some(UNKNOWN_LABEL));
    }

    #[test]
    fn test_view_serializes_flat() {
        let json = serde_json::to_value(ProductView::new(product(None), &[], &[])).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["price"], 1350);
        assert_eq!(json["brand_name"], serde_json::Value::Null);
    }

    #[test]
    fn test_params_into_query() {
        let params = ProductListParams {
            brand: Some("b1".to_string()),
            q: Some("  ".to_string()),
            sort: Some(ProductSort::PriceDesc),
            ..ProductListParams::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.brand_id, Some(BrandId::new("b1")));
        assert_eq!(query.search, None);
        assert_eq!(query.sort, ProductSort::PriceDesc);

        let params = ProductListParams {
            limit: Some(MAX_PAGE_SIZE + 1),
            ..ProductListParams::default()
        };
        assert!(matches!(params.into_query(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_no_params_is_default_query() {
        assert_eq!(
            ProductListParams::default().into_query().unwrap(),
            ProductQuery::default()
        );
    }
}
