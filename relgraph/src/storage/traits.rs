//! Trait definitions for storage components in relgraph

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::storage::errors::StorageError;
use crate::storage::filters::DocumentFilter;
use crate::storage::models::{Document, EntityKind};
use crate::storage::mutation::Mutation;

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> std::result::Result<bool, StorageError>;

    /// Clear all data in the store
    async fn clear(&self) -> std::result::Result<(), StorageError>;

    /// Get metadata about the store
    async fn get_metadata(&self) -> std::result::Result<Value, StorageError>;

    /// Close connections and release resources
    async fn close(&self) -> std::result::Result<(), StorageError>;
}

/// Trait for document operations.
///
/// Every method acts on a single collection, selected by [`EntityKind`].
#[async_trait]
pub trait DocumentStore: BaseStore {
    /// Insert a new document. Fails with `AlreadyExists` if the id or a
    /// unique field value is taken.
    async fn insert(&self, document: Document) -> std::result::Result<Document, StorageError>;

    /// Get a document by its ID
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> std::result::Result<Option<Document>, StorageError>;

    /// Batch lookup. Missing ids are skipped and the result order is unspecified.
    async fn find_many_by_id(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> std::result::Result<Vec<Document>, StorageError>;

    /// Find the first document whose `field` equals `value`
    async fn find_one_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
    ) -> std::result::Result<Option<Document>, StorageError>;

    /// Apply a mutation atomically: either every part of it is applied or
    /// none is. Returns the updated document, or `None` if `id` is unknown.
    async fn atomic_update(
        &self,
        kind: EntityKind,
        id: &str,
        mutation: &Mutation,
    ) -> std::result::Result<Option<Document>, StorageError>;

    /// Delete a document, returning it if it existed
    async fn delete(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> std::result::Result<Option<Document>, StorageError>;

    /// List documents matching a filter, in insertion order
    async fn search(
        &self,
        kind: EntityKind,
        filter: &DocumentFilter,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> std::result::Result<Vec<Document>, StorageError>;

    /// Count documents matching a filter
    async fn count(
        &self,
        kind: EntityKind,
        filter: &DocumentFilter,
    ) -> std::result::Result<usize, StorageError>;
}
