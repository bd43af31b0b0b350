//! Table API (`/rest/v1/{table}`) implementation of the entity store.

use std::marker::PhantomData;

use async_trait::async_trait;
use eclat_core::{Entity, EntityId, Product};
use reqwest::Method;
use tracing::instrument;
use url::Url;

use super::RemoteClient;
use crate::error::{StoreError, StoreResult};
use crate::store::{EntityStore, ProductQuery, ProductSearch, ProductSort};

const RETURN_REPRESENTATION: &str = "return=representation";
const UPSERT: &str = "resolution=merge-duplicates,return=representation";

/// One remote table, typed by the entity it holds.
pub struct RemoteTable<T> {
    client: RemoteClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for RemoteTable<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> RemoteTable<T> {
    pub(crate) const fn new(client: RemoteClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn table_url(&self) -> StoreResult<Url> {
        self.client.url(&format!("rest/v1/{}", T::COLLECTION))
    }

    /// Table URL filtered to a single id.
    fn row_url(&self, id: &T::Id) -> StoreResult<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id.as_str()));
        Ok(url)
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for RemoteTable<T> {
    #[instrument(skip(self), fields(table = T::COLLECTION))]
    async fn list(&self) -> StoreResult<Vec<T>> {
        let mut url = self.table_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            if T::ORDERED_BY_NAME {
                pairs.append_pair("order", "name.asc");
            }
        }
        self.client
            .send_json(self.client.request(Method::GET, url))
            .await
    }

    #[instrument(skip(self, id), fields(table = T::COLLECTION, id = %id))]
    async fn get_by_id(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let mut url = self.row_url(id)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("limit", "1");
        let rows: Vec<T> = self
            .client
            .send_json(self.client.request(Method::GET, url))
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, draft), fields(table = T::COLLECTION))]
    async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        let request = self
            .client
            .request(Method::POST, self.table_url()?)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&draft);
        let rows: Vec<T> = self.client.send_json(request).await?;
        rows.into_iter().next().ok_or_else(|| {
            StoreError::BackendUnavailable("insert returned no representation".to_string())
        })
    }

    #[instrument(skip(self, entity), fields(table = T::COLLECTION, id = %entity.id()))]
    async fn update(&self, entity: T) -> StoreResult<T> {
        let request = self
            .client
            .request(Method::PATCH, self.row_url(entity.id())?)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&entity);
        let rows: Vec<T> = self.client.send_json(request).await?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self, entity), fields(table = T::COLLECTION, id = %entity.id()))]
    async fn upsert(&self, entity: T) -> StoreResult<T> {
        let request = self
            .client
            .request(Method::POST, self.table_url()?)
            .header("Prefer", UPSERT)
            .json(&entity);
        let rows: Vec<T> = self.client.send_json(request).await?;
        rows.into_iter().next().ok_or_else(|| {
            StoreError::BackendUnavailable("upsert returned no representation".to_string())
        })
    }

    #[instrument(skip(self, id), fields(table = T::COLLECTION, id = %id))]
    async fn delete(&self, id: &T::Id) -> StoreResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.row_url(id)?)
            .header("Prefer", RETURN_REPRESENTATION);
        let rows: Vec<serde_json::Value> = self.client.send_json(request).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductSearch for RemoteTable<Product> {
    #[instrument(skip(self))]
    async fn query(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        query.validate()?;
        let mut url = self.table_url()?;
        append_product_query(&mut url, query);
        self.client
            .send_json(self.client.request(Method::GET, url))
            .await
    }
}

/// Encode a product query as table API parameters.
fn append_product_query(url: &mut Url, query: &ProductQuery) {
    let mut pairs = url.query_pairs_mut();
    pairs.append_pair("select", "*");

    if let Some(category_id) = &query.category_id {
        pairs.append_pair("category_id", &format!("eq.{category_id}"));
    }
    if let Some(brand_id) = &query.brand_id {
        pairs.append_pair("brand_id", &format!("eq.{brand_id}"));
    }
    if let Some(term) = query.search_term().map(sanitize_search_term)
        && !term.is_empty()
    {
        pairs.append_pair(
            "or",
            &format!("(name.ilike.*{term}*,description.ilike.*{term}*)"),
        );
    }

    let order = match query.sort {
        ProductSort::Name => "name.asc",
        ProductSort::PriceAsc => "price.asc,name.asc",
        ProductSort::PriceDesc => "price.desc,name.asc",
    };
    pairs.append_pair("order", order);

    if let Some(limit) = query.limit {
        pairs.append_pair("limit", &limit.to_string());
    }
    if let Some(offset) = query.offset {
        pairs.append_pair("offset", &offset.to_string());
    }
}

/// Strip characters with meaning in filter expressions.
fn sanitize_search_term(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '.' | ':' | '(' | ')' | '*' | '%' | '\\' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eclat_core::BrandId;

    #[test]
    fn test_sanitize_search_term() {
        assert_eq!(sanitize_search_term("vitres,(name.eq.x)*"), "vitresnameeqx");
        assert_eq!(sanitize_search_term(" savon noir "), "savon noir");
    }

    #[test]
    fn test_product_query_parameters() {
        let mut url = Url::parse("https://backend.example/rest/v1/products").unwrap();
        let query = ProductQuery {
            brand_id: Some(BrandId::new("b1")),
            search: Some("Javel".to_string()),
            sort: ProductSort::PriceAsc,
            limit: Some(20),
            ..ProductQuery::default()
        };
        append_product_query(&mut url, &query);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("brand_id".to_string(), "eq.b1".to_string())));
        assert!(pairs.contains(&(
            "or".to_string(),
            "(name.ilike.*Javel*,description.ilike.*Javel*)".to_string()
        )));
        assert!(pairs.contains(&("order".to_string(), "price.asc,name.asc".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "20".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "offset"));
    }
}
