//! In-process document store.
//!
//! One insertion-ordered map per entity kind, each behind its own lock, so
//! writes to one kind never wait on reads of another. Locks are never held
//! across an await point.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use super::{Document, DocumentStore, Filter};
use crate::{
    error::{AppError, AppResult},
    models::{EntityKind, RecordId},
};

type Collection = IndexMap<RecordId, Value>;

pub struct MemoryStore {
    collections: HashMap<EntityKind, RwLock<Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: EntityKind::ALL
                .iter()
                .map(|kind| (*kind, RwLock::new(Collection::new())))
                .collect(),
        }
    }

    fn collection(&self, kind: EntityKind) -> AppResult<&RwLock<Collection>> {
        self.collections
            .get(&kind)
            .ok_or_else(|| AppError::Internal(format!("No collection for {}", kind)))
    }

    fn read(&self, kind: EntityKind) -> AppResult<RwLockReadGuard<'_, Collection>> {
        self.collection(kind)?
            .read()
            .map_err(|_| AppError::Store(format!("{} collection lock poisoned", kind)))
    }

    fn write(&self, kind: EntityKind) -> AppResult<RwLockWriteGuard<'_, Collection>> {
        self.collection(kind)?
            .write()
            .map_err(|_| AppError::Store(format!("{} collection lock poisoned", kind)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_key<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or_default()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, kind: EntityKind, body: Value) -> AppResult<RecordId> {
        let id = RecordId::new();
        self.write(kind)?.insert(id, body);
        Ok(id)
    }

    async fn get(&self, kind: EntityKind, id: RecordId) -> AppResult<Option<Document>> {
        Ok(self.read(kind)?.get(&id).map(|body| Document {
            id,
            body: body.clone(),
        }))
    }

    async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .read(kind)?
            .iter()
            .filter(|(_, body)| filter.matches(body))
            .map(|(id, body)| Document {
                id: *id,
                body: body.clone(),
            })
            .collect();

        if let Some(field) = sort {
            // stable: equal keys keep insertion order
            docs.sort_by(|a, b| sort_key(&a.body, field).cmp(sort_key(&b.body, field)));
        }
        Ok(docs)
    }

    async fn replace(&self, kind: EntityKind, id: RecordId, body: Value) -> AppResult<bool> {
        let mut collection = self.write(kind)?;
        match collection.get_mut(&id) {
            Some(existing) => {
                *existing = body;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, kind: EntityKind, id: RecordId) -> AppResult<bool> {
        Ok(self.write(kind)?.shift_remove(&id).is_some())
    }

    async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64> {
        let count = self
            .read(kind)?
            .values()
            .filter(|body| filter.matches(body))
            .count();
        Ok(count as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Memory store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_keeps_insertion_order_on_ties() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let first = store
                .insert(EntityKind::Author, json!({ "family_name": "Bronte", "first_name": "Emily" }))
                .await
                .unwrap();
            store
                .insert(EntityKind::Author, json!({ "family_name": "Austen", "first_name": "Jane" }))
                .await
                .unwrap();
            let third = store
                .insert(EntityKind::Author, json!({ "family_name": "Bronte", "first_name": "Anne" }))
                .await
                .unwrap();

            let docs = store
                .list(EntityKind::Author, &Filter::All, Some("family_name"))
                .await
                .unwrap();
            let names: Vec<String> = docs.iter().map(|d| d.text("first_name")).collect();
            assert_eq!(names, vec!["Jane", "Emily", "Anne"]);
            assert_eq!(docs[1].id, first);
            assert_eq!(docs[2].id, third);
        });
    }

    #[test]
    fn test_replace_keeps_position() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let a = store.insert(EntityKind::Genre, json!({ "name": "Poetry" })).await.unwrap();
            let b = store.insert(EntityKind::Genre, json!({ "name": "Drama" })).await.unwrap();

            assert!(store
                .replace(EntityKind::Genre, a, json!({ "name": "Verse" }))
                .await
                .unwrap());
            let docs = store.list(EntityKind::Genre, &Filter::All, None).await.unwrap();
            assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![a, b]);
            assert_eq!(docs[0].text("name"), "Verse");

            assert!(!store
                .replace(EntityKind::Genre, RecordId::new(), json!({ "name": "Ghost" }))
                .await
                .unwrap());
        });
    }

    #[test]
    fn test_kinds_are_isolated() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let id = store.insert(EntityKind::Genre, json!({ "name": "Poetry" })).await.unwrap();

            assert!(store.get(EntityKind::Book, id).await.unwrap().is_none());
            assert!(!store.delete(EntityKind::Book, id).await.unwrap());
            assert_eq!(store.count(EntityKind::Genre, &Filter::All).await.unwrap(), 1);

            assert!(store.delete(EntityKind::Genre, id).await.unwrap());
            assert!(store.get(EntityKind::Genre, id).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_count_with_filter() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            for status in ["Available", "Loaned", "Available"] {
                store
                    .insert(EntityKind::BookInstance, json!({ "status": status }))
                    .await
                    .unwrap();
            }
            let available = Filter::Eq("status", json!("Available"));
            assert_eq!(store.count(EntityKind::BookInstance, &available).await.unwrap(), 2);
        });
    }
}
