//! Update descriptors applied atomically by a [`DocumentStore`].
//!
//! A [`Mutation`] bundles plain field assignments with set-valued attribute
//! deltas. Deltas are keyed by attribute name, so any number of attributes can
//! be grown and shrunk in a single call without one delta replacing another.
//!
//! [`DocumentStore`]: crate::storage::traits::DocumentStore

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::storage::errors::{StorageError, StorageResult};

/// One atomic update against a single document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Fields replaced wholesale
    pub set_fields: Map<String, Value>,

    /// Per attribute: identifiers appended when not already present
    pub add_to_set: BTreeMap<String, Vec<String>>,

    /// Per attribute: identifiers removed wherever present
    pub remove_from_set: BTreeMap<String, Vec<String>>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a field value
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_fields.insert(field.into(), value.into());
        self
    }

    /// Add distinct identifiers to a set-valued attribute
    pub fn add_to_set(mut self, attribute: impl Into<String>, ids: Vec<String>) -> Self {
        self.add_to_set.entry(attribute.into()).or_default().extend(ids);
        self
    }

    /// Remove identifiers from a set-valued attribute
    pub fn remove_from_set(mut self, attribute: impl Into<String>, ids: Vec<String>) -> Self {
        self.remove_from_set
            .entry(attribute.into())
            .or_default()
            .extend(ids);
        self
    }

    /// True when applying the mutation cannot change anything
    pub fn is_empty(&self) -> bool {
        self.set_fields.is_empty()
            && self.add_to_set.values().all(Vec::is_empty)
            && self.remove_from_set.values().all(Vec::is_empty)
    }

    /// Reject descriptors that touch one attribute in two ways
    pub fn validate(&self) -> StorageResult<()> {
        for field in self.set_fields.keys() {
            if field == "id" || field == "kind" {
                return Err(StorageError::Validation(format!(
                    "Field '{}' is immutable",
                    field
                )));
            }
            if self.add_to_set.contains_key(field) || self.remove_from_set.contains_key(field) {
                return Err(StorageError::Validation(format!(
                    "Field '{}' is both set and modified as a set",
                    field
                )));
            }
        }
        for attribute in self.add_to_set.keys() {
            if self.remove_from_set.contains_key(attribute) {
                return Err(StorageError::Validation(format!(
                    "Attribute '{}' has both additions and removals",
                    attribute
                )));
            }
        }
        Ok(())
    }

    /// Apply the mutation to a field map in place.
    ///
    /// On error `fields` may be partially modified; stores apply to a scratch
    /// copy and only commit on success.
    pub fn apply_to(&self, fields: &mut Map<String, Value>) -> StorageResult<()> {
        self.validate()?;

        for (name, value) in &self.set_fields {
            fields.insert(name.clone(), value.clone());
        }

        for (attribute, ids) in &self.add_to_set {
            let members = set_attribute(fields, attribute)?;
            let mut present: HashSet<String> = members
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            for id in ids {
                if present.insert(id.clone()) {
                    members.push(Value::String(id.clone()));
                }
            }
        }

        for (attribute, ids) in &self.remove_from_set {
            let members = set_attribute(fields, attribute)?;
            let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
            members.retain(|v| !v.as_str().is_some_and(|id| doomed.contains(id)));
        }

        Ok(())
    }
}

/// Borrow a set-valued attribute, creating it empty when missing
fn set_attribute<'a>(
    fields: &'a mut Map<String, Value>,
    attribute: &str,
) -> StorageResult<&'a mut Vec<Value>> {
    let slot = fields
        .entry(attribute.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => Ok(items),
        other => Err(StorageError::TypeMismatch(format!(
            "Attribute '{}' is not a set (found {})",
            attribute,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
