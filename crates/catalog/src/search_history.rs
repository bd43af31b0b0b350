//! Per-user recent product searches.
//!
//! Always kept in local storage, whatever the backing-store mode: history is
//! a convenience for the person searching, not catalog data.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use eclat_core::UserId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{StoreError, StoreResult};
use crate::local::{KEY_PREFIX, LocalStorage};

/// Number of queries remembered per user.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// Longest query kept in history.
pub const MAX_QUERY_LENGTH: usize = 100;

/// One remembered search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub query: String,
    pub searched_at: DateTime<Utc>,
}

/// Recent searches, most recent first.
#[derive(Clone)]
pub struct SearchHistory {
    storage: LocalStorage,
}

impl SearchHistory {
    #[must_use]
    pub const fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    fn key(user_id: &UserId) -> String {
        format!(
            "{KEY_PREFIX}search_history_{}",
            URL_SAFE_NO_PAD.encode(user_id.as_str())
        )
    }

    /// The user's searches, most recent first.
    ///
    /// # Errors
    ///
    /// `CorruptLocalState` when the stored history does not parse.
    pub async fn list(&self, user_id: &UserId) -> StoreResult<Vec<SearchEntry>> {
        Ok(self
            .storage
            .read_json(&Self::key(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Remember a search.
    ///
    /// A query already present (ignoring case) moves to the front with the
    /// new spelling. Blank queries are ignored. Returns the updated history.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for overlong queries, otherwise storage errors.
    #[instrument(skip(self))]
    pub async fn record(&self, user_id: &UserId, query: &str) -> StoreResult<Vec<SearchEntry>> {
        let query = query.trim();
        if query.chars().count() > MAX_QUERY_LENGTH {
            return Err(StoreError::ValidationFailed(format!(
                "query must be at most {MAX_QUERY_LENGTH} characters"
            )));
        }

        let _guard = self.storage.lock().await;
        let mut entries = self.list(user_id).await?;
        if query.is_empty() {
            return Ok(entries);
        }

        let folded = query.to_lowercase();
        entries.retain(|e| e.query.to_lowercase() != folded);
        entries.insert(
            0,
            SearchEntry {
                query: query.to_string(),
                searched_at: Utc::now(),
            },
        );
        entries.truncate(MAX_HISTORY_ENTRIES);

        self.storage.write_json(&Self::key(user_id), &entries).await?;
        Ok(entries)
    }

    /// Forget every search for the user.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn clear(&self, user_id: &UserId) -> StoreResult<()> {
        self.storage.remove(&Self::key(user_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn history(dir: &tempfile::TempDir) -> SearchHistory {
        SearchHistory::new(LocalStorage::open(dir.path()).await.unwrap())
    }

    fn queries(entries: &[SearchEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.query.as_str()).collect()
    }

    #[tokio::test]
    async fn test_most_recent_first_with_case_insensitive_dedupe() {
        let dir = tempfile::tempdir().unwrap();
        let history = history(&dir).await;
        let user = UserId::new("u1");

        history.record(&user, "javel").await.unwrap();
        history.record(&user, "savon").await.unwrap();
        let entries = history.record(&user, " JAVEL ").await.unwrap();

        assert_eq!(queries(&entries), ["JAVEL", "savon"]);
        assert_eq!(history.list(&user).await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_capped_at_ten_entries() {
        let dir = tempfile::tempdir().unwrap();
        let history = history(&dir).await;
        let user = UserId::new("u1");

        for i in 0..15 {
            history.record(&user, &format!("q{i}")).await.unwrap();
        }
        let entries = history.list(&user).await.unwrap();

        assert_eq!(entries.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(entries[0].query, "q14");
        assert_eq!(entries[9].query, "q5");
    }

    #[tokio::test]
    async fn test_users_are_isolated_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let history = history(&dir).await;
        let alice = UserId::new("alice@example.com");
        let bob = UserId::new("bob");

        history.record(&alice, "vitres").await.unwrap();
        history.record(&bob, "sols").await.unwrap();
        history.record(&alice, "   ").await.unwrap();
        history.clear(&alice).await.unwrap();

        assert!(history.list(&alice).await.unwrap().is_empty());
        assert_eq!(queries(&history.list(&bob).await.unwrap()), ["sols"]);
    }

    #[tokio::test]
    async fn test_overlong_query_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let history = history(&dir).await;
        let err = history
            .record(&UserId::new("u1"), &"x".repeat(MAX_QUERY_LENGTH + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ValidationFailed(_)));
    }
}
