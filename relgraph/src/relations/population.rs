//! Relation population
//!
//! Resolves the identifiers stored in one relation of a user to the
//! referenced entities, optionally sorted.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::registry::{RelationDef, RelationRegistry};
use super::sort::{self, SortSpec};
use crate::models::{User, redact};
use crate::storage::{Document, DocumentStore, EntityKind};
use crate::{RelgraphError, Result};

/// Read side of the relation subsystem
#[derive(Debug, Clone)]
pub struct RelationPopulationService {
    store: Arc<dyn DocumentStore>,
}

impl RelationPopulationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Resolve `relation_name` of `owner_id` to entities.
    ///
    /// The relation name and sort token are validated before the store is
    /// queried. Without a sort token the stored relation order is kept.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        owner_id: &str,
        relation_name: &str,
        sort: Option<&str>,
    ) -> Result<Vec<Document>> {
        let def = RelationRegistry::lookup(relation_name).ok_or_else(|| {
            RelgraphError::validation(
                relation_name,
                format!(
                    "field {} does not exist or is not populatable",
                    relation_name
                ),
            )
        })?;
        let sort_spec = sort.map(str::parse::<SortSpec>).transpose()?;

        let owner = self
            .store
            .find_by_id(EntityKind::User, owner_id)
            .await?
            .ok_or_else(|| RelgraphError::NotFound(format!("user {}", owner_id)))?;
        let owner = User::try_from(owner)?;

        let entities = self.populate(&owner, def).await?;
        Ok(match sort_spec {
            Some(spec) => {
                debug!("Sorting {} {} by {}", entities.len(), def.name(), spec);
                sort::sort(entities, &spec)
            }
            None => entities,
        })
    }

    /// Fetch the entities referenced by one relation of an already loaded
    /// owner, in stored order.
    ///
    /// Identifiers whose entity no longer exists are skipped.
    pub async fn populate(&self, owner: &User, def: &RelationDef) -> Result<Vec<Document>> {
        let ids = owner.relation(def.relation);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.store.find_many_by_id(def.entity_kind, ids).await?;
        let mut by_id: HashMap<String, Document> = found
            .into_iter()
            .map(|document| (document.id.clone(), document))
            .collect();

        let resolved: Vec<Document> = ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(redact)
            .collect();

        if resolved.len() < ids.len() {
            warn!(
                owner = %owner.id,
                relation = def.name(),
                missing = ids.len() - resolved.len(),
                "Relation references entities that no longer exist"
            );
        }
        Ok(resolved)
    }
}
