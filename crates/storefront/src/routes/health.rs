//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Lists brands as a round-trip to the backing store. Returns 503 Service
/// Unavailable if the store cannot be read.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let catalog = state.catalog();
    let mode = catalog.mode().to_string();

    match catalog.brands().list().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok", "mode": mode }))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "mode": mode })),
            )
        }
    }
}
