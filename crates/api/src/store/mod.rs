//! Record store clients.
//!
//! The record store is the managed document database holding the `clients`,
//! `deliverers`, `deliveries`, and `users` collections. It exposes per-
//! document CRUD plus equality/prefix filtered queries with ordering and
//! offset/limit pagination - nothing more, and the rest of the codebase is
//! written against exactly that surface.
//!
//! Two backends exist behind the [`Store`] enum:
//!
//! - [`MemoryStore`] - in-process, used by tests, local development, and the
//!   CLI demo mode (`STORE_BACKEND=memory`)
//! - [`HttpStore`] - reqwest client for the managed store's REST surface

pub mod http;
pub mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// A document's fields, keyed by wire name. The document ID is injected
/// under `"id"` on reads and must not be present on writes.
pub type Document = serde_json::Map<String, Value>;

/// Collection names used by the API.
pub mod collections {
    pub const CLIENTS: &str = "clients";
    pub const DELIVERERS: &str = "deliverers";
    pub const DELIVERIES: &str = "deliveries";
    pub const USERS: &str = "users";
}

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// HTTP transport error talking to the managed store.
    #[error("store transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The managed store rejected the request.
    #[error("store API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A stored document does not match the expected shape.
    #[error("data corruption: {0}")]
    Corrupt(String),
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// A query against one collection.
///
/// Supports the store's native capabilities only: equality filters on
/// top-level fields, one prefix (range) filter on a string field, ordering
/// on one field, and offset/limit pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    collection: String,
    filters: Vec<(String, Value)>,
    prefix: Option<(String, String)>,
    order: Option<(String, Direction)>,
    offset: usize,
    limit: Option<usize>,
}

impl Query {
    /// Start a query against the given collection.
    #[must_use]
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_owned(),
            filters: Vec::new(),
            prefix: None,
            order: None,
            offset: 0,
            limit: None,
        }
    }

    /// Add an equality filter on a top-level field.
    #[must_use]
    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_owned(), value.into()));
        self
    }

    /// Add a prefix filter on a string field.
    ///
    /// Equivalent to the store's `field >= prefix AND field <= prefix + '\u{f8ff}'`
    /// range pair, which is how name search is expressed against the
    /// managed store.
    #[must_use]
    pub fn prefix(mut self, field: &str, prefix: &str) -> Self {
        self.prefix = Some((field.to_owned(), prefix.to_owned()));
        self
    }

    /// Order results by a field.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some((field.to_owned(), direction));
        self
    }

    /// Skip the first `offset` results.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return at most `limit` results.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The collection this query targets.
    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub(crate) fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub(crate) fn prefix_filter(&self) -> Option<(&str, &str)> {
        self.prefix.as_ref().map(|(f, p)| (f.as_str(), p.as_str()))
    }

    pub(crate) fn order(&self) -> Option<(&str, Direction)> {
        self.order.as_ref().map(|(f, d)| (f.as_str(), *d))
    }

    pub(crate) const fn window(&self) -> (usize, Option<usize>) {
        (self.offset, self.limit)
    }
}

/// Record store client over one of the supported backends.
///
/// Enum dispatch keeps handler code monomorphic; every backend implements
/// the same small surface.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Http(HttpStore),
}

impl Store {
    /// Fetch a single document by ID, with the ID injected under `"id"`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure. A missing document
    /// is `Ok(None)`, not an error.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Memory(store) => store.get(collection, id).await,
            Self::Http(store) => store.get(collection, id).await,
        }
    }

    /// Insert a document, returning the server-generated ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn insert(&self, collection: &str, fields: Document) -> Result<String, StoreError> {
        match self {
            Self::Memory(store) => store.insert(collection, fields).await,
            Self::Http(store) => store.insert(collection, fields).await,
        }
    }

    /// Write a document under a caller-supplied ID, replacing any existing
    /// document. Used for `users`, whose document IDs are identity uids.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn put(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.put(collection, id, fields).await,
            Self::Http(store) => store.put(collection, id, fields).await,
        }
    }

    /// Partially merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.update(collection, id, fields).await,
            Self::Http(store) => store.update(collection, id, fields).await,
        }
    }

    /// Delete a document by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(collection, id).await,
            Self::Http(store) => store.delete(collection, id).await,
        }
    }

    /// Run a query, returning matching documents with IDs injected.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Memory(store) => store.query(query).await,
            Self::Http(store) => store.query(query).await,
        }
    }

    /// Count the documents matching a query, ignoring its offset/limit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        match self {
            Self::Memory(store) => store.count(query).await,
            Self::Http(store) => store.count(query).await,
        }
    }

    /// Readiness probe: verify the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(_) => Ok(()),
            Self::Http(store) => store.ping().await,
        }
    }
}

/// Serialize a model into document fields, stripping any `"id"` key.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if the value does not serialize to a JSON
/// object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(StoreError::Corrupt(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::Corrupt(e.to_string())),
    }
}

/// Deserialize document fields (including the injected `"id"`) into a model.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if the document does not match the model.
pub fn from_document<T: DeserializeOwned>(fields: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| StoreError::Corrupt(format!("invalid document: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::collection(collections::DELIVERIES)
            .filter("clientId", "c1")
            .order_by("createdAt", Direction::Desc)
            .offset(10)
            .limit(5);

        assert_eq!(query.collection_name(), "deliveries");
        assert_eq!(query.filters(), &[("clientId".to_owned(), json!("c1"))]);
        assert_eq!(query.order(), Some(("createdAt", Direction::Desc)));
        assert_eq!(query.window(), (10, Some(5)));
    }

    #[test]
    fn test_to_document_strips_id() {
        #[derive(Serialize)]
        struct Doc {
            id: String,
            name: String,
        }

        let fields = to_document(&Doc {
            id: "abc".to_owned(),
            name: "Ada".to_owned(),
        })
        .expect("object");

        assert!(!fields.contains_key("id"));
        assert_eq!(fields.get("name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_to_document_rejects_non_object() {
        let err = to_document(&42_i32).expect_err("not an object");
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
