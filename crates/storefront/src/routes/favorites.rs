//! Favorite product handlers.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eclat_core::ProductId;
use serde::Serialize;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Membership state after a change.
#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub product_id: ProductId,
    pub favorited: bool,
}

/// Product ids the signed-in user has favorited.
pub async fn index(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<BTreeSet<ProductId>>> {
    let favorites = state.catalog().favorites().list(&session.user_id).await?;
    Ok(Json(favorites))
}

/// Add a favorite. Adding an existing favorite is a no-op.
pub async fn add(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(product_id): Path<String>,
) -> Result<Json<FavoriteStatus>> {
    let product_id = ProductId::new(product_id);
    state
        .catalog()
        .favorites()
        .add(&product_id, &session.user_id)
        .await?;
    Ok(Json(FavoriteStatus {
        product_id,
        favorited: true,
    }))
}

/// Flip a favorite and return the new state.
pub async fn toggle(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(product_id): Path<String>,
) -> Result<Json<FavoriteStatus>> {
    let product_id = ProductId::new(product_id);
    let favorited = state
        .catalog()
        .favorites()
        .toggle(&product_id, &session.user_id)
        .await?;
    Ok(Json(FavoriteStatus {
        product_id,
        favorited,
    }))
}

/// Remove a favorite. Removing a missing favorite is a no-op.
pub async fn remove(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(product_id): Path<String>,
) -> Result<StatusCode> {
    state
        .catalog()
        .favorites()
        .remove(&ProductId::new(product_id), &session.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
