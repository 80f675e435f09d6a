//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use relgraph::config::ConfigBuilder;
use relgraph::models::User;
use relgraph::service::SocialGraph;
use relgraph::storage::filters::DocumentFilter;
use relgraph::storage::{
    BaseStore, Document, DocumentStore, EntityKind, Mutation, StorageError, create_store,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper that counts calls before delegating
#[derive(Debug)]
pub struct CountingStore {
    inner: Arc<dyn DocumentStore>,
    calls: AtomicUsize,
    updates: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    /// Store calls of any kind since the last reset
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `atomic_update` calls since the last reset
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.updates.store(0, Ordering::SeqCst);
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaseStore for CountingStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        self.inner.health_check().await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }

    async fn get_metadata(&self) -> Result<Value, StorageError> {
        self.inner.get_metadata().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.inner.close().await
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn insert(&self, document: Document) -> Result<Document, StorageError> {
        self.hit();
        self.inner.insert(document).await
    }

    async fn find_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Document>, StorageError> {
        self.hit();
        self.inner.find_by_id(kind, id).await
    }

    async fn find_many_by_id(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> Result<Vec<Document>, StorageError> {
        self.hit();
        self.inner.find_many_by_id(kind, ids).await
    }

    async fn find_one_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>, StorageError> {
        self.hit();
        self.inner.find_one_by_field(kind, field, value).await
    }

    async fn atomic_update(
        &self,
        kind: EntityKind,
        id: &str,
        mutation: &Mutation,
    ) -> Result<Option<Document>, StorageError> {
        self.hit();
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.atomic_update(kind, id, mutation).await
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<Option<Document>, StorageError> {
        self.hit();
        self.inner.delete(kind, id).await
    }

    async fn search(
        &self,
        kind: EntityKind,
        filter: &DocumentFilter,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Document>, StorageError> {
        self.hit();
        self.inner.search(kind, filter, limit, offset).await
    }

    async fn count(&self, kind: EntityKind, filter: &DocumentFilter) -> Result<usize, StorageError> {
        self.hit();
        self.inner.count(kind, filter).await
    }
}

/// A graph over a counting in-memory store
pub fn counted_graph() -> (SocialGraph, Arc<CountingStore>) {
    let config = ConfigBuilder::testing().build().unwrap();
    let counting = Arc::new(CountingStore::new(create_store(&config.storage)));
    let graph = SocialGraph::new(config, counting.clone()).unwrap();
    (graph, counting)
}

/// Insert a user with a fixed id and extra scalar fields
pub async fn seed_user(graph: &SocialGraph, id: &str, fields: Value) -> User {
    let mut user = User::new(id, id.to_lowercase(), format!("{}@example.com", id.to_lowercase()));
    if let Value::Object(extra) = fields {
        user.extra = extra;
    }
    graph.store().insert(user.to_document().unwrap()).await.unwrap();
    user
}

/// Insert a blog or tag with extra fields
pub async fn seed_entity(graph: &SocialGraph, kind: EntityKind, id: &str, fields: Value) {
    let mut document = Document::new(kind, id);
    if let Value::Object(extra) = fields {
        document.fields = extra;
    }
    graph.store().insert(document).await.unwrap();
}

pub fn patch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("patch must be an object, got {other}"),
    }
}

pub fn ids(documents: &[Document]) -> Vec<&str> {
    documents.iter().map(|d| d.id.as_str()).collect()
}
