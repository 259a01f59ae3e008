//! In-memory record store backend.
//!
//! Mirrors the managed store's observable behavior - generated 20-character
//! IDs, partial-merge updates, equality/prefix queries with ordering and
//! offset/limit - so tests and local development exercise the exact code
//! paths that run in production.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Direction, Document, Query, StoreError};

/// Length of generated document IDs, matching the managed store.
const DOCUMENT_ID_LEN: usize = 20;

/// In-memory record store.
///
/// Cheaply cloneable; all clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Document>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| with_id(fields.clone(), id)))
    }

    pub(super) async fn insert(
        &self,
        collection: &str,
        fields: Document,
    ) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_owned()).or_default();

        let mut id = generate_id();
        while docs.contains_key(&id) {
            id = generate_id();
        }

        docs.insert(id.clone(), fields);
        Ok(id)
    }

    pub(super) async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
        Ok(())
    }

    pub(super) async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)?;

        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(())
    }

    pub(super) async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .ok_or(StoreError::NotFound)?;
        Ok(())
    }

    pub(super) async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut matches = self.matching(query).await;

        if let Some((field, direction)) = query.order() {
            matches.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        let (offset, limit) = query.window();
        let iter = matches.into_iter().skip(offset);
        Ok(match limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        })
    }

    pub(super) async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        Ok(self.matching(query).await.len())
    }

    /// Collect all documents matching the query's filters, IDs injected,
    /// in insertion-key order.
    async fn matching(&self, query: &Query) -> Vec<Document> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(query.collection_name()) else {
            return Vec::new();
        };

        docs.iter()
            .filter(|(_, fields)| matches_filters(fields, query))
            .map(|(id, fields)| with_id(fields.clone(), id))
            .collect()
    }
}

fn matches_filters(fields: &Document, query: &Query) -> bool {
    for (field, expected) in query.filters() {
        if fields.get(field) != Some(expected) {
            return false;
        }
    }

    if let Some((field, prefix)) = query.prefix_filter() {
        let Some(Value::String(value)) = fields.get(field) else {
            return false;
        };
        if !value.starts_with(prefix) {
            return false;
        }
    }

    true
}

fn with_id(mut fields: Document, id: &str) -> Document {
    fields.insert("id".to_owned(), Value::String(id.to_owned()));
    fields
}

/// Order two field values: nulls first, then numbers, then strings.
///
/// Timestamps are RFC 3339 strings, so lexicographic order is chronological.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Number(_)), Some(Value::String(_))) => Ordering::Less,
        (Some(Value::String(_)), Some(Value::Number(_))) => Ordering::Greater,
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}
