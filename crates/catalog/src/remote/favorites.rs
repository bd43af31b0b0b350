//! `favorites` table access.

use std::collections::BTreeSet;

use async_trait::async_trait;
use eclat_core::{Favorite, ProductId, UserId};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::RemoteClient;
use crate::error::StoreResult;
use crate::store::FavoriteStore;

const FAVORITES_TABLE: &str = "rest/v1/favorites";

#[derive(Deserialize)]
struct FavoriteRow {
    product_id: ProductId,
}

/// Remote favorites, one row per (user, product) pair.
#[derive(Clone)]
pub struct RemoteFavorites {
    client: RemoteClient,
}

impl RemoteFavorites {
    pub(crate) const fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    fn pair_url(&self, favorite: &Favorite) -> StoreResult<Url> {
        let mut url = self.client.url(FAVORITES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", favorite.user_id))
            .append_pair("product_id", &format!("eq.{}", favorite.product_id));
        Ok(url)
    }
}

#[async_trait]
impl FavoriteStore for RemoteFavorites {
    #[instrument(skip(self))]
    async fn list(&self, user_id: &UserId) -> StoreResult<BTreeSet<ProductId>> {
        let mut url = self.client.url(FAVORITES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "product_id")
            .append_pair("user_id", &format!("eq.{user_id}"));
        let rows: Vec<FavoriteRow> = self
            .client
            .send_json(self.client.request(Method::GET, url))
            .await?;
        Ok(rows.into_iter().map(|row| row.product_id).collect())
    }

    #[instrument(skip(self))]
    async fn contains(&self, favorite: &Favorite) -> StoreResult<bool> {
        let mut url = self.pair_url(favorite)?;
        url.query_pairs_mut()
            .append_pair("select", "product_id")
            .append_pair("limit", "1");
        let rows: Vec<FavoriteRow> = self
            .client
            .send_json(self.client.request(Method::GET, url))
            .await?;
        Ok(!rows.is_empty())
    }

    #[instrument(skip(self))]
    async fn add(&self, favorite: &Favorite) -> StoreResult<()> {
        let request = self
            .client
            .request(Method::POST, self.client.url(FAVORITES_TABLE)?)
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(favorite);
        self.client.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, favorite: &Favorite) -> StoreResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.pair_url(favorite)?)
            .header("Prefer", "return=minimal");
        self.client.send(request).await?;
        Ok(())
    }
}
