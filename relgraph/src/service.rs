//! Social graph facade
//!
//! One entry point owning the configuration, the shared store handle and the
//! services built on it.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::auth::{AuthContext, AuthGate, JwtAuthGate};
use crate::config::{LogLevel, LoggingConfig, RelgraphConfig};
use crate::directory::UserDirectory;
use crate::models::User;
use crate::relations::{RelationPopulationService, RelationUpdateEngine};
use crate::storage::{Document, DocumentStore, create_store};
use crate::{RelgraphError, Result};

/// Social graph over a document store
///
/// # Examples
///
/// ```rust
/// use relgraph::prelude::*;
///
/// async fn example() -> Result<()> {
///     let graph = SocialGraph::for_testing();
///     let ada = graph.directory().create_user(NewUser::new("ada", "ada@example.com")).await?;
///     let liked = graph.get_relation(&ada.id, "liked", Some("name_asc")).await?;
///     assert!(liked.is_empty());
///     Ok(())
/// }
/// ```
pub struct SocialGraph {
    config: RelgraphConfig,
    store: Arc<dyn DocumentStore>,
    engine: RelationUpdateEngine,
    population: RelationPopulationService,
    directory: UserDirectory,
    auth: Option<Arc<dyn AuthGate>>,
    _log_guard: Option<WorkerGuard>,
}

impl SocialGraph {
    /// Wire the services around `store`.
    ///
    /// Fails when auth is enabled without a usable secret.
    pub fn new(config: RelgraphConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let auth: Option<Arc<dyn AuthGate>> = if config.auth.enabled {
            Some(Arc::new(JwtAuthGate::new(&config.auth, store.clone())?))
        } else {
            None
        };
        Ok(Self::assemble(config, store, auth))
    }

    /// Isolated instance over a fresh in-memory store, without token checks
    /// or logging setup.
    pub fn for_testing() -> Self {
        let config = RelgraphConfig {
            logging: LoggingConfig {
                level: LogLevel::Warn,
                stdout: false,
                ..LoggingConfig::default()
            },
            ..RelgraphConfig::default()
        };
        let store = create_store(&config.storage);
        Self::assemble(config, store, None)
    }

    fn assemble(
        config: RelgraphConfig,
        store: Arc<dyn DocumentStore>,
        auth: Option<Arc<dyn AuthGate>>,
    ) -> Self {
        Self {
            engine: RelationUpdateEngine::new(store.clone()),
            population: RelationPopulationService::new(store.clone()),
            directory: UserDirectory::new(store.clone(), config.search.clone()),
            auth,
            store,
            config,
            _log_guard: None,
        }
    }

    /// Keep a log file writer alive for the lifetime of the graph
    pub(crate) fn with_log_guard(mut self, guard: Option<WorkerGuard>) -> Self {
        self._log_guard = guard;
        self
    }

    /// Apply an `add_<relation>` / `remove_<relation>` patch for `owner_id`.
    pub async fn update_relations(&self, owner_id: &str, patch: &Map<String, Value>) -> Result<User> {
        Ok(self.engine.apply(owner_id, patch).await?.redacted())
    }

    /// Resolve one relation of `owner_id`, optionally sorted by a
    /// `<field>_<asc|desc>` token.
    pub async fn get_relation(
        &self,
        owner_id: &str,
        relation: &str,
        sort: Option<&str>,
    ) -> Result<Vec<Document>> {
        self.population.resolve(owner_id, relation, sort).await
    }

    /// Resolve a credential to its owner.
    pub async fn authenticate(&self, credential: &str) -> Result<AuthContext> {
        match &self.auth {
            Some(gate) => gate.authenticate(credential).await,
            None => Err(RelgraphError::Authentication(
                "token verification is not enabled".to_string(),
            )),
        }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn engine(&self) -> &RelationUpdateEngine {
        &self.engine
    }

    pub fn population(&self) -> &RelationPopulationService {
        &self.population
    }

    /// The auth gate, present when token checks are enabled
    pub fn auth_gate(&self) -> Option<&Arc<dyn AuthGate>> {
        self.auth.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn config(&self) -> &RelgraphConfig {
        &self.config
    }
}

impl fmt::Debug for SocialGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocialGraph")
            .field("store", &self.store)
            .field("auth", &self.auth)
            .field("logging_to_file", &self._log_guard.is_some())
            .finish_non_exhaustive()
    }
}
