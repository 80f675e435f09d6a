//! Data structures stored by the document store

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::storage::errors::StorageError;

/// Kind of entity a document represents. Each kind is its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A user account
    User,
    /// An interest tag
    Tag,
    /// A blog post or other content item
    Blog,
}

impl EntityKind {
    /// Name of the collection holding documents of this kind
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Tag => "tags",
            EntityKind::Blog => "blogs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Tag => write!(f, "tag"),
            EntityKind::Blog => write!(f, "blog"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(EntityKind::User),
            "tag" => Ok(EntityKind::Tag),
            "blog" => Ok(EntityKind::Blog),
            _ => Err(StorageError::Validation(format!("Unknown entity kind: {}", s))),
        }
    }
}

/// A schemaless document: an identifier, its kind, and an open set of fields.
///
/// Serializes flat, so a document reads as `{"id": .., "kind": .., ...fields}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier within the document's collection
    pub id: String,

    /// Kind of entity
    pub kind: EntityKind,

    /// All remaining fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value; `null` is reported as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Get a string field
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Read a set-valued attribute as a list of identifiers.
    ///
    /// A missing attribute is an empty set. Non-string members are skipped.
    pub fn id_set(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Remove a field, returning the document
    pub fn without_field(mut self, name: &str) -> Self {
        self.fields.remove(name);
        self
    }
}
