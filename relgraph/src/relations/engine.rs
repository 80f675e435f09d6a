//! Relation update engine
//!
//! Turns a validated patch into one [`Mutation`] and hands it to the store.
//! Membership union and difference happen inside the store's atomic set
//! primitives; the engine only filters out ids that must never be added
//! (already present, duplicated in the request, or the owner itself).

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::patch::{Delta, RelationPatch};
use crate::models::User;
use crate::storage::{DocumentStore, EntityKind, Mutation};
use crate::{RelgraphError, Result};

/// Applies add/remove deltas to a user's relations
#[derive(Debug, Clone)]
pub struct RelationUpdateEngine {
    store: Arc<dyn DocumentStore>,
}

impl RelationUpdateEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate and apply a patch to `owner_id`, returning the updated user.
    ///
    /// Validation finishes before the store is touched. All relation deltas
    /// and scalar fields go out in a single atomic update.
    #[instrument(skip(self, patch), fields(keys = patch.len()))]
    pub async fn apply(&self, owner_id: &str, patch: &Map<String, Value>) -> Result<User> {
        let patch = RelationPatch::parse(patch)?;

        let owner = self.load_owner(owner_id).await?;
        let mutation = plan(&owner, &patch);
        if mutation.is_empty() {
            debug!("Patch for {} is a no-op", owner_id);
            return Ok(owner);
        }

        let updated = self
            .store
            .atomic_update(EntityKind::User, owner_id, &mutation)
            .await?
            .ok_or_else(|| RelgraphError::NotFound(format!("user {}", owner_id)))?;

        info!(
            owner = owner_id,
            relations = mutation.add_to_set.len() + mutation.remove_from_set.len(),
            fields = mutation.set_fields.len(),
            "Relations updated"
        );
        Ok(User::try_from(updated)?)
    }

    async fn load_owner(&self, owner_id: &str) -> Result<User> {
        let document = self
            .store
            .find_by_id(EntityKind::User, owner_id)
            .await?
            .ok_or_else(|| RelgraphError::NotFound(format!("user {}", owner_id)))?;
        Ok(User::try_from(document)?)
    }
}

/// Build the store mutation for a patch against the owner's current state.
///
/// Additions drop ids that are already members, repeat within the request,
/// or (for self-excluded relations) equal the owner id. Removals pass through
/// as requested. Empty deltas are left out.
pub fn plan(owner: &User, patch: &RelationPatch) -> Mutation {
    let mut mutation = Mutation::new();
    mutation.set_fields = patch.set_fields.clone();

    for (relation, delta) in &patch.deltas {
        let def = relation.def();
        match delta {
            Delta::Add(requested) => {
                let additions = compute_additions(
                    requested,
                    owner.relation(*relation),
                    &owner.id,
                    def.self_excluded,
                );
                if !additions.is_empty() {
                    mutation = mutation.add_to_set(def.name(), additions);
                }
            }
            Delta::Remove(requested) => {
                if !requested.is_empty() {
                    mutation = mutation.remove_from_set(def.name(), requested.clone());
                }
            }
        }
    }

    mutation
}

/// `requested − current`, without the owner when self-excluded, deduplicated
/// in first-appearance order
pub fn compute_additions(
    requested: &[String],
    current: &[String],
    owner_id: &str,
    self_excluded: bool,
) -> Vec<String> {
    let mut seen: HashSet<&str> = current.iter().map(String::as_str).collect();
    if self_excluded {
        seen.insert(owner_id);
    }
    requested
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
