//! Back-office handlers.
//!
//! Products may be managed by admins and vendeurs; brands, categories and
//! contact information by admins only. Every successful write invalidates
//! the matching cache before responding, so the next listing reflects it.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use eclat_catalog::{CollectionCache, EntityAdapter, ImageUpload, Session};
use eclat_core::{
    Brand, BrandId, CategoryId, ContactInfo, Entity, EntityId, NewBrand, NewContactInfo, NewProduct,
    NewUtilityCategory, Product, ProductId, UtilityCategory,
};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireProductManager};
use crate::state::AppState;

/// Multipart field carrying the product image.
pub const IMAGE_FIELD: &str = "image";

fn record_change(session: &Session, message: &str, collection: &str, id: &str) {
    add_breadcrumb(
        "admin",
        message,
        Some(&[
            ("collection", collection),
            ("id", id),
            ("user_id", session.user_id.as_str()),
        ]),
    );
}

// =============================================================================
// Shared entity handlers
// =============================================================================

async fn create_entity<T: Entity>(
    session: &Session,
    adapter: &EntityAdapter<T>,
    cache: &CollectionCache<T>,
    draft: T::Draft,
) -> Result<(StatusCode, Json<T>)> {
    let created = adapter.create(draft).await?;
    cache.invalidate();
    record_change(session, "Created record", T::COLLECTION, created.id().as_str());
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_entity<T: Entity>(
    session: &Session,
    adapter: &EntityAdapter<T>,
    cache: &CollectionCache<T>,
    id: T::Id,
    draft: T::Draft,
) -> Result<Json<T>> {
    let updated = adapter.update(T::from_draft(id, draft)).await?;
    cache.invalidate();
    record_change(session, "Updated record", T::COLLECTION, updated.id().as_str());
    Ok(Json(updated))
}

/// Deleting an unknown id succeeds without touching the cache.
async fn delete_entity<T: Entity>(
    session: &Session,
    adapter: &EntityAdapter<T>,
    cache: &CollectionCache<T>,
    id: T::Id,
) -> Result<StatusCode> {
    match adapter.delete(&id).await {
        Ok(()) => {
            cache.invalidate();
            record_change(session, "Deleted record", T::COLLECTION, id.as_str());
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) if e.is_not_found() => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Products
// =============================================================================

/// Create a product.
#[instrument(skip_all)]
pub async fn create_product(
    RequireProductManager(session): RequireProductManager,
    State(state): State<AppState>,
    Json(draft): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let catalog = state.catalog();
    create_entity(
        &session,
        catalog.products().entities(),
        &catalog.caches().products,
        draft,
    )
    .await
}

/// Replace a product, cleaning up a stored image it no longer uses.
#[instrument(skip_all, fields(id = %id))]
pub async fn update_product(
    RequireProductManager(session): RequireProductManager,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<NewProduct>,
) -> Result<Json<Product>> {
    let catalog = state.catalog();
    let updated = catalog
        .products()
        .update(Product::from_draft(ProductId::new(id.as_str()), draft))
        .await?;
    catalog.caches().products.invalidate();
    record_change(&session, "Updated record", Product::COLLECTION, &id);
    Ok(Json(updated))
}

/// Delete a product, then best-effort delete its stored image.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete_product(
    RequireProductManager(session): RequireProductManager,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let catalog = state.catalog();
    match catalog.products().delete(&ProductId::new(id.as_str())).await {
        Ok(()) => {
            catalog.caches().products.invalidate();
            record_change(&session, "Deleted product", Product::COLLECTION, &id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) if e.is_not_found() => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into()),
    }
}

/// Upload a product image from the `image` multipart field.
#[instrument(skip_all, fields(id = %id))]
pub async fn upload_product_image(
    RequireProductManager(session): RequireProductManager,
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("image").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some(ImageUpload {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        });
        break;
    }
    let upload =
        upload.ok_or_else(|| AppError::BadRequest(format!("missing `{IMAGE_FIELD}` field")))?;

    let catalog = state.catalog();
    let product = catalog
        .products()
        .set_image(&ProductId::new(id.as_str()), upload)
        .await?;
    catalog.caches().products.invalidate();
    record_change(&session, "Uploaded product image", Product::COLLECTION, &id);
    Ok(Json(product))
}

// =============================================================================
// Brands
// =============================================================================

/// Create a brand.
pub async fn create_brand(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Json(draft): Json<NewBrand>,
) -> Result<(StatusCode, Json<Brand>)> {
    let catalog = state.catalog();
    create_entity(&session, catalog.brands(), &catalog.caches().brands, draft).await
}

/// Rename a brand.
pub async fn update_brand(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<NewBrand>,
) -> Result<Json<Brand>> {
    let catalog = state.catalog();
    update_entity(
        &session,
        catalog.brands(),
        &catalog.caches().brands,
        BrandId::new(id),
        draft,
    )
    .await
}

/// Delete a brand. Products keep their now-dangling reference.
pub async fn delete_brand(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let catalog = state.catalog();
    delete_entity(
        &session,
        catalog.brands(),
        &catalog.caches().brands,
        BrandId::new(id),
    )
    .await
}

// =============================================================================
// Categories
// =============================================================================

/// Create a utility category.
pub async fn create_category(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Json(draft): Json<NewUtilityCategory>,
) -> Result<(StatusCode, Json<UtilityCategory>)> {
    let catalog = state.catalog();
    create_entity(
        &session,
        catalog.categories(),
        &catalog.caches().categories,
        draft,
    )
    .await
}

/// Replace a utility category.
pub async fn update_category(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<NewUtilityCategory>,
) -> Result<Json<UtilityCategory>> {
    let catalog = state.catalog();
    update_entity(
        &session,
        catalog.categories(),
        &catalog.caches().categories,
        CategoryId::new(id),
        draft,
    )
    .await
}

/// Delete a utility category.
pub async fn delete_category(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let catalog = state.catalog();
    delete_entity(
        &session,
        catalog.categories(),
        &catalog.caches().categories,
        CategoryId::new(id),
    )
    .await
}

// =============================================================================
// Contact
// =============================================================================

/// Create or replace the contact record.
pub async fn save_contact(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Json(draft): Json<NewContactInfo>,
) -> Result<Json<ContactInfo>> {
    let catalog = state.catalog();
    let saved = catalog.contact().save(draft).await?;
    catalog.caches().contact.invalidate();
    record_change(&session, "Saved contact info", ContactInfo::COLLECTION, saved.id.as_str());
    Ok(Json(saved))
}
