//! Storage abstractions and implementations
//!
//! Relation data lives in a document store reached through the
//! [`DocumentStore`](traits::DocumentStore) trait. The trait exposes lookups
//! plus one write primitive, [`atomic_update`](traits::DocumentStore::atomic_update),
//! which applies field assignments and per-attribute set deltas as one unit.
//!
//! ## Storage Implementations
//!
//! - **Memory**: in-process store with unique indexes, used for tests and
//!   embedded deployments

pub mod errors;
pub mod filters;
pub mod memory;
pub mod models;
pub mod mutation;
pub mod traits;

use std::sync::Arc;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use models::{Document, EntityKind};
pub use mutation::Mutation;
pub use traits::{BaseStore, DocumentStore};

use crate::config::{StorageConfig, StorageEngine};

/// Create a document store from configuration.
///
/// User handles and emails are unique in every engine.
pub fn create_store(config: &StorageConfig) -> Arc<dyn DocumentStore> {
    match config.engine {
        StorageEngine::Memory => {
            tracing::info!("Creating in-memory document store");
            Arc::new(
                MemoryStore::new()
                    .with_unique_index(EntityKind::User, "user_name")
                    .with_unique_index(EntityKind::User, "email"),
            )
        }
    }
}
