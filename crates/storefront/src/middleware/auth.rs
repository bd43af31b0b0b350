//! Authentication extractors.
//!
//! Requests authenticate with `Authorization: Bearer <token>`. Tokens are
//! resolved by the catalog's auth collaborator and the resulting session is
//! cached briefly so most requests skip the round-trip.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use eclat_catalog::{AuthError, Session};
use serde_json::json;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(session): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", session.user_id)
/// }
/// ```
pub struct RequireSession(pub Session);

/// Extractor that requires the `admin` or `vendeur` role.
pub struct RequireProductManager(pub Session);

/// Extractor that requires the `admin` role.
pub struct RequireAdmin(pub Session);

/// Error returned when a request lacks the required credentials.
#[derive(Debug)]
pub enum AuthRejection {
    /// No bearer token, or the token did not resolve to a user.
    Unauthorized,
    /// Signed in, but without the required role.
    Forbidden(&'static str),
    /// The auth service could not be reached.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable, please try again",
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the request's bearer token, using the session cache.
async fn resolve_session(parts: &Parts, state: &AppState) -> Result<Session, AuthRejection> {
    let token = bearer_token(parts).ok_or(AuthRejection::Unauthorized)?;

    if let Some(session) = state.sessions().get(token).await {
        return Ok(session);
    }

    let session = state
        .catalog()
        .auth()
        .resolve(token)
        .await
        .map_err(|e| match e {
            AuthError::InvalidToken => AuthRejection::Unauthorized,
            AuthError::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "session resolution failed");
                AuthRejection::Unavailable
            }
        })?;

    state
        .sessions()
        .insert(token.to_string(), session.clone())
        .await;
    set_sentry_user(&session.user_id, session.email.as_ref().map(|e| e.as_str()));
    Ok(session)
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireProductManager {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = resolve_session(parts, state).await?;
        if !session.can_manage_products() {
            return Err(AuthRejection::Forbidden(
                "Only admins and vendeurs can manage products",
            ));
        }
        Ok(Self(session))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = resolve_session(parts, state).await?;
        if !session.can_manage_catalog() {
            return Err(AuthRejection::Forbidden("Only admins can access this resource"));
        }
        Ok(Self(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/favorites");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[test]
    fn test_rejection_status() {
        assert_eq!(
            AuthRejection::Forbidden("no").into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
