//! Reference data handlers: brands, categories and contact information.
//!
//! All three are served from the reactive caches.

use axum::{Json, extract::State};
use eclat_core::{Brand, ContactInfo, UtilityCategory};

use super::loaded_items;
use crate::error::Result;
use crate::state::AppState;

/// List brands, ordered by name.
pub async fn brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>> {
    let snapshot = state.catalog().caches().brands.ensure_loaded().await;
    Ok(Json(loaded_items(snapshot)?.to_vec()))
}

/// List utility categories, ordered by name.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<UtilityCategory>>> {
    let snapshot = state.catalog().caches().categories.ensure_loaded().await;
    Ok(Json(loaded_items(snapshot)?.to_vec()))
}

/// The contact record, or `null` before it has ever been saved.
pub async fn contact(State(state): State<AppState>) -> Result<Json<Option<ContactInfo>>> {
    let snapshot = state.catalog().caches().contact.ensure_loaded().await;
    Ok(Json(loaded_items(snapshot)?.first().cloned()))
}
