//! Parsing and validation of relation update patches.
//!
//! A patch is a JSON object. Keys of the form `add_<relation>` and
//! `remove_<relation>` carry identifier lists; every other key is a scalar
//! field assignment passed through unchanged.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::registry::{Relation, RelationRegistry};
use crate::models::CREDENTIAL_FIELD;
use crate::{RelgraphError, Result};

const ADD_PREFIX: &str = "add_";
const REMOVE_PREFIX: &str = "remove_";

/// Requested change to one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    Add(Vec<String>),
    Remove(Vec<String>),
}

impl Delta {
    fn key(&self, relation: Relation) -> String {
        match self {
            Delta::Add(_) => format!("{}{}", ADD_PREFIX, relation),
            Delta::Remove(_) => format!("{}{}", REMOVE_PREFIX, relation),
        }
    }
}

/// A validated patch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationPatch {
    /// Scalar fields to assign
    pub set_fields: Map<String, Value>,

    /// At most one delta per relation
    pub deltas: BTreeMap<Relation, Delta>,
}

impl RelationPatch {
    /// Validate a raw patch.
    ///
    /// Fails with a validation error for malformed or unknown relation keys
    /// and with a conflict when one relation is both added to and removed
    /// from. No partial result is ever produced.
    pub fn parse(raw: &Map<String, Value>) -> Result<Self> {
        let mut patch = RelationPatch::default();

        for (key, value) in raw {
            let parsed = if let Some(name) = key.strip_prefix(ADD_PREFIX) {
                Some((name, true))
            } else {
                key.strip_prefix(REMOVE_PREFIX).map(|name| (name, false))
            };

            let Some((name, is_add)) = parsed else {
                check_scalar(key, value)?;
                patch.set_fields.insert(key.clone(), value.clone());
                continue;
            };

            let def = RelationRegistry::lookup(name).ok_or_else(|| {
                RelgraphError::validation(
                    key,
                    format!(
                        "unknown relation '{}', expected one of: {}",
                        name,
                        RelationRegistry::names().collect::<Vec<_>>().join(", ")
                    ),
                )
            })?;
            let ids = id_list(key, value)?;
            let delta = if is_add { Delta::Add(ids) } else { Delta::Remove(ids) };

            if let Some(existing) = patch.deltas.get(&def.relation) {
                return Err(RelgraphError::conflict(
                    def.name(),
                    format!(
                        "'{}' and '{}' cannot be combined in one update",
                        existing.key(def.relation),
                        key
                    ),
                ));
            }
            patch.deltas.insert(def.relation, delta);
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.set_fields.is_empty() && self.deltas.is_empty()
    }
}

/// Relations are only reachable through add/remove keys and the id is fixed
fn check_scalar(key: &str, value: &Value) -> Result<()> {
    if matches!(key, "id" | "_id" | "kind" | "created_at") {
        return Err(RelgraphError::validation(key, "field is immutable"));
    }
    match key {
        "user_name" | "email" if !value.as_str().is_some_and(|s| !s.trim().is_empty()) => {
            return Err(RelgraphError::validation(key, "should be a non-empty string"));
        }
        CREDENTIAL_FIELD if !value.is_string() && !value.is_null() => {
            return Err(RelgraphError::validation(key, "should be a string"));
        }
        _ => {}
    }
    if let Some(def) = RelationRegistry::lookup(key) {
        return Err(RelgraphError::validation(
            key,
            format!(
                "relation cannot be assigned directly, use '{}{}' or '{}{}'",
                ADD_PREFIX,
                def.name(),
                REMOVE_PREFIX,
                def.name()
            ),
        ));
    }
    Ok(())
}

fn id_list(key: &str, value: &Value) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(RelgraphError::validation(key, "should be an array of ids"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(id) if !id.is_empty() => Ok(id.clone()),
            _ => Err(RelgraphError::validation(
                key,
                format!("should be an array of ids, found element {}", item),
            )),
        })
        .collect()
}
