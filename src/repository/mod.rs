//! Repository layer over a schema-less document store
//!
//! Records are kept as JSON documents grouped by [`EntityKind`]. The store
//! knows nothing about references between kinds; integrity is enforced by
//! `services::guard` before any write reaches it.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Entity, EntityKind, RecordId},
};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// A stored document: identity plus its JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    pub body: Value,
}

impl Document {
    /// String value of a top-level body field, empty if absent
    pub fn text(&self, field: &str) -> String {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Document selection predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Top-level field equals the value
    Eq(&'static str, Value),
    /// Top-level array field contains the value
    Contains(&'static str, Value),
}

impl Filter {
    pub fn matches(&self, body: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => body.get(*field) == Some(value),
            Filter::Contains(field, value) => body
                .get(*field)
                .and_then(Value::as_array)
                .map_or(false, |items| items.contains(value)),
        }
    }

    /// The filter as a JSON containment pattern (`body @> pattern`)
    pub fn containment(&self) -> Value {
        match self {
            Filter::All => json!({}),
            Filter::Eq(field, value) => json!({ *field: value }),
            Filter::Contains(field, value) => json!({ *field: [value] }),
        }
    }
}

/// Persistence backend for catalog documents.
///
/// Implementations give per-document atomicity only. Lists sort ascending
/// on one string body field with ties kept in insertion order; without a
/// sort key they return insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document and return its freshly assigned id
    async fn insert(&self, kind: EntityKind, body: Value) -> AppResult<RecordId>;

    async fn get(&self, kind: EntityKind, id: RecordId) -> AppResult<Option<Document>>;

    async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>>;

    /// Replace the body of an existing document; false if there is none
    async fn replace(&self, kind: EntityKind, id: RecordId, body: Value) -> AppResult<bool>;

    /// Remove a document; false if there is none
    async fn delete(&self, kind: EntityKind, id: RecordId) -> AppResult<bool>;

    async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64>;

    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()>;

    /// Release the backend's resources at shutdown
    async fn close(&self);
}

/// Typed access to the document store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    /// Create a new repository over the given store handle
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn create<E: Entity>(&self, data: E::Data) -> AppResult<E> {
        let body = serde_json::to_value(&data)?;
        let id = self.store.insert(E::KIND, body).await?;
        tracing::debug!("Created {} {}", E::KIND, id);
        Ok(E::from_data(id, data))
    }

    pub async fn find<E: Entity>(&self, id: RecordId) -> AppResult<Option<E>> {
        self.store
            .get(E::KIND, id)
            .await?
            .map(decode::<E>)
            .transpose()
    }

    pub async fn get<E: Entity>(&self, id: RecordId) -> AppResult<E> {
        self.find::<E>(id)
            .await?
            .ok_or_else(|| not_found(E::KIND, id))
    }

    pub async fn exists(&self, kind: EntityKind, id: RecordId) -> AppResult<bool> {
        Ok(self.store.get(kind, id).await?.is_some())
    }

    pub async fn list<E: Entity>(
        &self,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<E>> {
        self.store
            .list(E::KIND, filter, sort)
            .await?
            .into_iter()
            .map(decode::<E>)
            .collect()
    }

    /// Raw documents, for callers that only need a field or two of any kind
    pub async fn documents(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>> {
        self.store.list(kind, filter, sort).await
    }

    /// Replace every field of an existing record, keeping its id
    pub async fn replace<E: Entity>(&self, id: RecordId, data: E::Data) -> AppResult<E> {
        let body = serde_json::to_value(&data)?;
        if !self.store.replace(E::KIND, id, body).await? {
            return Err(not_found(E::KIND, id));
        }
        tracing::debug!("Replaced {} {}", E::KIND, id);
        Ok(E::from_data(id, data))
    }

    pub async fn delete(&self, kind: EntityKind, id: RecordId) -> AppResult<()> {
        if !self.store.delete(kind, id).await? {
            return Err(not_found(kind, id));
        }
        tracing::debug!("Deleted {} {}", kind, id);
        Ok(())
    }

    pub async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64> {
        self.store.count(kind, filter).await
    }
}

fn decode<E: Entity>(doc: Document) -> AppResult<E> {
    let data = serde_json::from_value(doc.body)?;
    Ok(E::from_data(doc.id, data))
}

pub(crate) fn not_found(kind: EntityKind, id: RecordId) -> AppError {
    AppError::NotFound(format!("{} {} not found", kind, id))
}
