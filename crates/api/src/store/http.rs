//! HTTP client for the managed document database.
//!
//! Speaks the store's REST surface:
//!
//! ```text
//! GET    {base}/v1/{collection}/{id}      - fetch one document
//! POST   {base}/v1/{collection}           - insert, returns {"id": ...}
//! PUT    {base}/v1/{collection}/{id}      - replace (upsert)
//! PATCH  {base}/v1/{collection}/{id}      - partial merge
//! DELETE {base}/v1/{collection}/{id}      - delete
//! POST   {base}/v1/{collection}:query     - filtered query
//! POST   {base}/v1/{collection}:count     - count matching documents
//! GET    {base}/v1/ping                   - availability probe
//! ```
//!
//! All requests carry a bearer token. The store enforces its own timeouts;
//! no additional client-side deadline is applied, matching the rest of the
//! system's "the store's client is the timeout authority" stance.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use crate::config::RecordStoreConfig;

use super::{Document, Query, StoreError};

/// Record store HTTP client.
#[derive(Clone)]
pub struct HttpStore {
    inner: Arc<HttpStoreInner>,
}

struct HttpStoreInner {
    client: reqwest::Client,
    base_url: String,
}

/// Insert response from the store.
#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: String,
}

/// Count response from the store.
#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

/// Error body returned by the store on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: String,
}

impl HttpStore {
    /// Create a new record store client.
    ///
    /// # Panics
    ///
    /// Panics if the configured token contains characters that are invalid
    /// in an HTTP header. Configuration validation rejects such tokens
    /// before this point.
    #[must_use]
    pub fn new(config: &RecordStoreConfig) -> Self {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.token.expose_secret()
        ))
        .expect("validated token is a valid header value");
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            inner: Arc::new(HttpStoreInner {
                client,
                base_url: config.url.trim_end_matches('/').to_owned(),
            }),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/v1/{collection}/{id}", self.inner.base_url)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/v1/{collection}", self.inner.base_url)
    }

    #[instrument(skip(self), fields(store = "http"))]
    pub(super) async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.document_url(collection, id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;

        let mut fields: Document = response.json().await?;
        fields.insert("id".to_owned(), serde_json::Value::String(id.to_owned()));
        Ok(Some(fields))
    }

    #[instrument(skip(self, fields), fields(store = "http"))]
    pub(super) async fn insert(
        &self,
        collection: &str,
        fields: Document,
    ) -> Result<String, StoreError> {
        let response = self
            .inner
            .client
            .post(self.collection_url(collection))
            .json(&fields)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: InsertResponse = response.json().await?;
        Ok(body.id)
    }

    #[instrument(skip(self, fields), fields(store = "http"))]
    pub(super) async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .put(self.document_url(collection, id))
            .json(&fields)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self, fields), fields(store = "http"))]
    pub(super) async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .patch(self.document_url(collection, id))
            .json(&fields)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(store = "http"))]
    pub(super) async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .delete(self.document_url(collection, id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(store = "http", collection = query.collection_name()))]
    pub(super) async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let url = format!(
            "{}/v1/{}:query",
            self.inner.base_url,
            query.collection_name()
        );
        let response = self.inner.client.post(url).json(query).send().await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, query), fields(store = "http", collection = query.collection_name()))]
    pub(super) async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        let url = format!(
            "{}/v1/{}:count",
            self.inner.base_url,
            query.collection_name()
        );
        let response = self.inner.client.post(url).json(query).send().await?;

        let response = check_status(response).await?;
        let body: CountResponse = response.json().await?;
        Ok(body.count)
    }

    pub(super) async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/v1/ping", self.inner.base_url);
        let response = self.inner.client.get(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Map non-2xx responses into [`StoreError::Api`] with the store's message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map_or_else(|_| status.to_string(), |body| body.error);

    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}
