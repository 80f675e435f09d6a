//! # Relgraph
//!
//! Social-graph relations for users of a document store: friends, following,
//! followers, interests, liked items, bookmarks and authored blogs.
//!
//! ## Quick Start
//!
//! ```rust
//! use relgraph::prelude::*;
//! use serde_json::json;
//!
//! async fn example() -> Result<()> {
//!     let graph = SocialGraph::for_testing();
//!
//!     let ada = graph.directory().create_user(NewUser::new("ada", "ada@example.com")).await?;
//!     let bob = graph.directory().create_user(NewUser::new("bob", "bob@example.com")).await?;
//!
//!     // Relations change only through add_/remove_ keys
//!     let patch = json!({ "add_friends": [bob.id, ada.id.clone()] });
//!     let ada = graph.update_relations(&ada.id, patch.as_object().unwrap()).await?;
//!     assert_eq!(ada.friends.len(), 1);
//!
//!     let friends = graph.get_relation(&ada.id, "friends", Some("user_name_asc")).await?;
//!     assert_eq!(friends[0].get_str("user_name"), Some("bob"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Relations**: registry, patch validation, the update engine and the
//!   population service with sorting
//! - **Directory**: user creation, lookup and paginated search
//! - **Auth**: bearer-token gate resolving a credential to an owner id
//! - **Storage**: the [`DocumentStore`](storage::DocumentStore) trait and an
//!   in-memory implementation with atomic set mutations

pub mod auth;
pub mod config;
pub mod directory;
pub mod logging;
pub mod models;
pub mod relations;
pub mod service;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::service::SocialGraph;
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{ConfigBuilder, LogLevel, RelgraphConfig, StorageConfig};

    pub use crate::auth::{AuthContext, AuthGate, JwtAuthGate};
    pub use crate::directory::{NewUser, SearchPage, UserDirectory, UserSummary};
    pub use crate::models::User;
    pub use crate::relations::{
        Relation, RelationPopulationService, RelationRegistry, RelationUpdateEngine,
        SortDirection, SortSpec,
    };

    pub use crate::storage::{Document, DocumentStore, EntityKind, MemoryStore, StorageError};

    pub use crate::{RelgraphError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for relgraph operations
#[derive(Debug, thiserror::Error)]
pub enum RelgraphError {
    /// Malformed input: patch keys, relation names, sort tokens, paging
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Contradictory request, or a unique value already taken
    #[error("Conflict on '{field}': {message}")]
    Conflict { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential missing, malformed, expired or not matching a user
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Store failure surfaced to callers as a generic failed operation
    #[error("Operation failed: {0}")]
    Storage(storage::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),
}

impl RelgraphError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RelgraphError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        RelgraphError::Conflict {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable snake_case tag for routing layers
    pub fn kind(&self) -> &'static str {
        match self {
            RelgraphError::Validation { .. } => "validation_error",
            RelgraphError::Conflict { .. } => "conflict",
            RelgraphError::NotFound(_) => "not_found",
            RelgraphError::Authentication(_) => "authentication_error",
            RelgraphError::Storage(_) => "operation_failed",
            RelgraphError::Configuration(_) => "configuration_error",
            RelgraphError::Logging(_) => "logging_error",
        }
    }

    /// Whether the same request may succeed if retried
    pub fn is_transient(&self) -> bool {
        matches!(self, RelgraphError::Storage(e) if e.is_transient())
    }
}

impl From<storage::StorageError> for RelgraphError {
    fn from(err: storage::StorageError) -> Self {
        match err {
            storage::StorageError::NotFound(what) => RelgraphError::NotFound(what),
            storage::StorageError::AlreadyExists(what) => RelgraphError::conflict("document", what),
            other => RelgraphError::Storage(other),
        }
    }
}

impl From<crate::config::ConfigError> for RelgraphError {
    fn from(err: crate::config::ConfigError) -> Self {
        RelgraphError::Configuration(err.to_string())
    }
}

impl From<relations::RegistryError> for RelgraphError {
    fn from(err: relations::RegistryError) -> Self {
        match err {
            relations::RegistryError::UnknownRelation(name) => RelgraphError::validation(
                name.clone(),
                format!("field {} does not exist or is not populatable", name),
            ),
        }
    }
}

/// Result type for relgraph operations
pub type Result<T> = std::result::Result<T, RelgraphError>;

/// Initialize relgraph with default configuration
pub async fn init_with_defaults() -> Result<service::SocialGraph> {
    let config = config::ConfigBuilder::defaults().build()?;
    init(config).await
}

/// Initialize relgraph with the provided configuration.
///
/// Installs the global subscriber (a second call leaves the first one in
/// place), creates the configured store and wires the services around it.
/// Logging to a file keeps its writer alive only as long as the returned
/// graph.
pub async fn init(config: config::RelgraphConfig) -> Result<service::SocialGraph> {
    use storage::BaseStore;

    let guard = logging::init(&config.logging)?;
    let store = storage::create_store(&config.storage);
    if !store.health_check().await? {
        return Err(storage::StorageError::Connection("store failed its health check".into()).into());
    }

    let graph = service::SocialGraph::new(config, store)?;
    Ok(graph.with_log_guard(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_domain_errors() {
        let err: RelgraphError = storage::StorageError::NotFound("user u1".into()).into();
        assert_eq!(err.kind(), "not_found");

        let err: RelgraphError = storage::StorageError::AlreadyExists("email".into()).into();
        assert_eq!(err.kind(), "conflict");

        let err: RelgraphError = storage::StorageError::Timeout("slow".into()).into();
        assert_eq!(err.kind(), "operation_failed");
        assert!(err.is_transient());
        assert!(err.to_string().starts_with("Operation failed"));
    }

    #[test]
    fn test_validation_is_not_transient() {
        let err = RelgraphError::validation("sort", "bad");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Validation error on 'sort': bad");
    }

    #[test]
    fn test_unknown_relation_maps_to_validation() {
        let err: RelgraphError = "enemies".parse::<relations::Relation>().unwrap_err().into();
        assert!(matches!(err, RelgraphError::Validation { ref field, .. } if field == "enemies"));
    }
}
