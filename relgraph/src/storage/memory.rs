//! In-memory document store
//!
//! Every collection lives behind one `tokio::sync::RwLock`. Writers take the
//! lock for the whole read-modify-commit cycle, which makes each
//! [`DocumentStore::atomic_update`] call a single all-or-nothing step.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::storage::errors::StorageError;
use crate::storage::filters::DocumentFilter;
use crate::storage::models::{Document, EntityKind};
use crate::storage::mutation::Mutation;
use crate::storage::traits::{BaseStore, DocumentStore};

/// Documents of one kind, kept in insertion order
#[derive(Debug, Default)]
struct Collection {
    next_seq: u64,
    by_id: HashMap<String, u64>,
    docs: BTreeMap<u64, Document>,
}

impl Collection {
    fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).and_then(|seq| self.docs.get(seq))
    }

    fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<EntityKind, Collection>>,
    unique_fields: HashMap<EntityKind, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field whose values must be unique within a collection
    pub fn with_unique_index(mut self, kind: EntityKind, field: impl Into<String>) -> Self {
        self.unique_fields.entry(kind).or_default().push(field.into());
        self
    }

    /// Fail if `candidate` would share a unique field value with another document
    fn check_unique(
        &self,
        collection: &Collection,
        candidate: &Document,
    ) -> Result<(), StorageError> {
        let Some(fields) = self.unique_fields.get(&candidate.kind) else {
            return Ok(());
        };
        for field in fields {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            let taken = collection
                .iter()
                .any(|other| other.id != candidate.id && other.get(field) == Some(value));
            if taken {
                return Err(StorageError::AlreadyExists(format!(
                    "{} with {} {} already exists",
                    candidate.kind, field, value
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BaseStore for MemoryStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.collections.write().await.clear();
        Ok(())
    }

    async fn get_metadata(&self) -> Result<Value, StorageError> {
        let collections = self.collections.read().await;
        let counts: serde_json::Map<String, Value> = collections
            .iter()
            .map(|(kind, c)| (kind.collection().to_string(), Value::from(c.docs.len())))
            .collect();
        Ok(serde_json::json!({
            "type": "memory_document_store",
            "collections": counts,
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, document: Document) -> Result<Document, StorageError> {
        if document.id.is_empty() {
            return Err(StorageError::Validation(
                "Document id cannot be empty".to_string(),
            ));
        }

        let mut collections = self.collections.write().await;
        let collection = collections.entry(document.kind).or_default();
        if collection.by_id.contains_key(&document.id) {
            return Err(StorageError::AlreadyExists(format!(
                "{} {} already exists",
                document.kind, document.id
            )));
        }
        self.check_unique(collection, &document)?;

        let seq = collection.next_seq;
        collection.next_seq += 1;
        collection.by_id.insert(document.id.clone(), seq);
        collection.docs.insert(seq, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Document>, StorageError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&kind).and_then(|c| c.get(id)).cloned())
    }

    async fn find_many_by_id(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(&kind) else {
            return Ok(Vec::new());
        };
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| collection.get(id).cloned())
            .collect())
    }

    async fn find_one_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>, StorageError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&kind).and_then(|c| {
            c.iter()
                .find(|doc| doc.get(field) == Some(value))
                .cloned()
        }))
    }

    async fn atomic_update(
        &self,
        kind: EntityKind,
        id: &str,
        mutation: &Mutation,
    ) -> Result<Option<Document>, StorageError> {
        mutation.validate()?;

        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(&kind) else {
            return Ok(None);
        };
        let Some(seq) = collection.by_id.get(id).copied() else {
            return Ok(None);
        };
        let Some(current) = collection.docs.get(&seq) else {
            return Err(StorageError::Internal(format!(
                "Index entry for {} {} has no document",
                kind, id
            )));
        };

        let mut scratch = current.clone();
        mutation.apply_to(&mut scratch.fields)?;
        self.check_unique(collection, &scratch)?;

        collection.docs.insert(seq, scratch.clone());
        Ok(Some(scratch))
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<Option<Document>, StorageError> {
        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(&kind) else {
            return Ok(None);
        };
        Ok(collection
            .by_id
            .remove(id)
            .and_then(|seq| collection.docs.remove(&seq)))
    }

    async fn search(
        &self,
        kind: EntityKind,
        filter: &DocumentFilter,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(collection
            .iter()
            .filter(|doc| filter.accepts(doc))
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, kind: EntityKind, filter: &DocumentFilter) -> Result<usize, StorageError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&kind)
            .map(|c| c.iter().filter(|doc| filter.accepts(doc)).count())
            .unwrap_or(0))
    }
}
