//! Authentication collaborator.
//!
//! Resolves a bearer token into a [`Session`]. The catalog never implements
//! an authentication protocol itself: remotely the hosted auth service does,
//! offline a single configured admin token stands in for it.
//!
//! Adapters never consult sessions. Authorization is the HTTP layer's job.

use async_trait::async_trait;
use eclat_core::{Email, UserId, UserRole};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::StoreError;
use crate::remote::RemoteClient;

/// User id of the session granted by the offline admin token.
pub const OFFLINE_ADMIN_USER_ID: &str = "offline-admin";

/// Longest token accepted as an offline customer identity.
const MAX_OFFLINE_USER_ID_LENGTH: usize = 128;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<Email>,
    /// `None` for storefront customers.
    pub role: Option<UserRole>,
}

impl Session {
    #[must_use]
    pub fn can_manage_products(&self) -> bool {
        self.role.is_some_and(UserRole::can_manage_products)
    }

    #[must_use]
    pub fn can_manage_catalog(&self) -> bool {
        self.role.is_some_and(UserRole::can_manage_catalog)
    }
}

/// Errors resolving a token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Resolves bearer tokens into sessions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve(&self, access_token: &str) -> Result<Session, AuthError>;
}

// =============================================================================
// Remote
// =============================================================================

#[derive(Deserialize)]
struct AuthUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ProfileRow {
    #[serde(default)]
    role: Option<String>,
}

/// Hosted auth service plus the `profiles` table for roles.
#[derive(Clone)]
pub struct RemoteAuth {
    client: RemoteClient,
}

impl RemoteAuth {
    #[must_use]
    pub const fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    async fn role_for(&self, user_id: &UserId, access_token: &str) -> Result<Option<UserRole>, AuthError> {
        let mut url = self.client.url("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "role")
            .append_pair("id", &format!("eq.{user_id}"))
            .append_pair("limit", "1");
        let rows: Vec<ProfileRow> = self
            .client
            .send_json(self.client.request_as_user(Method::GET, url, access_token))
            .await?;

        let role = rows.into_iter().next().and_then(|row| row.role);
        Ok(role.and_then(|raw| {
            raw.parse::<UserRole>()
                .map_err(|e| warn!(user_id = %user_id, error = %e, "ignoring unknown profile role"))
                .ok()
        }))
    }
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    #[instrument(skip_all)]
    async fn resolve(&self, access_token: &str) -> Result<Session, AuthError> {
        let url = self.client.url("auth/v1/user")?;
        let (status, body) = self
            .client
            .send_raw(self.client.request_as_user(Method::GET, url, access_token))
            .await?;

        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AuthError::InvalidToken),
            s => return Err(AuthError::Unavailable(format!("HTTP {s}"))),
        }

        let user: AuthUser = serde_json::from_str(&body)
            .map_err(|e| AuthError::Unavailable(format!("unexpected user payload: {e}")))?;
        let role = self.role_for(&user.id, access_token).await?;
        debug!(user_id = %user.id, role = ?role, "session resolved");

        Ok(Session {
            email: user.email.as_deref().and_then(|e| Email::parse(e).ok()),
            user_id: user.id,
            role,
        })
    }
}

// =============================================================================
// Offline
// =============================================================================

/// Offline stand-in for the auth service.
///
/// The configured admin token yields an admin session. Any other token is a
/// customer whose user id is the token itself.
#[derive(Clone)]
pub struct OfflineAuth {
    admin_token: SecretString,
}

impl OfflineAuth {
    #[must_use]
    pub const fn new(admin_token: SecretString) -> Self {
        Self { admin_token }
    }
}

#[async_trait]
impl AuthProvider for OfflineAuth {
    async fn resolve(&self, access_token: &str) -> Result<Session, AuthError> {
        let token = access_token.trim();
        if constant_time_eq(token.as_bytes(), self.admin_token.expose_secret().as_bytes()) {
            return Ok(Session {
                user_id: UserId::new(OFFLINE_ADMIN_USER_ID),
                email: None,
                role: Some(UserRole::Admin),
            });
        }

        let valid_identity = !token.is_empty()
            && token.len() <= MAX_OFFLINE_USER_ID_LENGTH
            && token != OFFLINE_ADMIN_USER_ID
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !valid_identity {
            return Err(AuthError::InvalidToken);
        }

        Ok(Session {
            user_id: UserId::new(token),
            email: None,
            role: None,
        })
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
