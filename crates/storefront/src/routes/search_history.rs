//! Recent search handlers.

use axum::{Json, extract::State, http::StatusCode};
use eclat_catalog::SearchEntry;
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Body of a search to remember.
#[derive(Debug, Deserialize)]
pub struct RecordSearch {
    pub query: String,
}

/// The signed-in user's searches, most recent first.
pub async fn index(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<Vec<SearchEntry>>> {
    let entries = state
        .catalog()
        .search_history()
        .list(&session.user_id)
        .await?;
    Ok(Json(entries))
}

/// Remember a search and return the updated history.
pub async fn record(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Json(body): Json<RecordSearch>,
) -> Result<Json<Vec<SearchEntry>>> {
    let entries = state
        .catalog()
        .search_history()
        .record(&session.user_id, &body.query)
        .await?;
    Ok(Json(entries))
}

/// Forget the signed-in user's searches.
pub async fn clear(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<StatusCode> {
    state
        .catalog()
        .search_history()
        .clear(&session.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
