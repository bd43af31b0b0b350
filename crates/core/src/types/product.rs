//! Catalog products.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::id::{BrandId, CategoryId, ProductId};
use super::price::Price;
use super::validation::{Validate, ValidationError, non_blank_ref, require_name};

/// Image reference shown when a product has no uploaded picture.
///
/// Never uploaded to, nor deleted from, an image store.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder.svg";

/// A product sold by the distributor.
///
/// `category_id` and `brand_id` are weak references: nothing guarantees the
/// referent still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
}

impl Product {
    /// Image reference that a delete should clean up, if any.
    ///
    /// Returns `None` for products without an image and for the placeholder.
    #[must_use]
    pub fn stored_image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .filter(|url| !url.is_empty() && *url != PLACEHOLDER_IMAGE_URL)
    }
}

/// Creation payload for a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)?;
        non_blank_ref("category_id", self.category_id.as_ref().map(CategoryId::as_str))?;
        non_blank_ref("brand_id", self.brand_id.as_ref().map(BrandId::as_str))?;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;
    type Draft = NewProduct;

    const COLLECTION: &'static str = "products";

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn from_draft(id: ProductId, draft: NewProduct) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image_url: draft.image_url,
            category_id: draft.category_id,
            brand_id: draft.brand_id,
        }
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        require_name("id", self.id.as_str())?;
        require_name("name", &self.name)?;
        non_blank_ref("category_id", self.category_id.as_ref().map(CategoryId::as_str))?;
        non_blank_ref("brand_id", self.brand_id.as_ref().map(BrandId::as_str))
    }
}
