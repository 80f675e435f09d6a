//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::relations::Relation;
use crate::storage::{Document, EntityKind, StorageError};

/// Field holding the credential hash. Never exposed through population.
pub const CREDENTIAL_FIELD: &str = "password_hash";

/// A user account and its seven relation attributes.
///
/// Relation attributes are ordered identifier lists with set semantics.
/// Fields not modelled here are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub email: String,

    /// Opaque credential hash, produced and checked outside this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub friends: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub liked: Vec<String>,
    #[serde(default)]
    pub bookmarks: Vec<String>,
    #[serde(default)]
    pub blogs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Free-form scalar attributes (`name`, `age`, `bio`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// New user with empty relations
    pub fn new(
        id: impl Into<String>,
        user_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_name: user_name.into(),
            email: email.into(),
            password_hash: None,
            friends: Vec::new(),
            following: Vec::new(),
            followers: Vec::new(),
            interests: Vec::new(),
            liked: Vec::new(),
            bookmarks: Vec::new(),
            blogs: Vec::new(),
            created_at: Some(Utc::now()),
            extra: Map::new(),
        }
    }

    /// Members of a relation, in stored order
    pub fn relation(&self, relation: Relation) -> &[String] {
        match relation {
            Relation::Friends => &self.friends,
            Relation::Following => &self.following,
            Relation::Followers => &self.followers,
            Relation::Interests => &self.interests,
            Relation::Liked => &self.liked,
            Relation::Bookmarks => &self.bookmarks,
            Relation::Blogs => &self.blogs,
        }
    }

    /// Public view: the credential hash dropped
    pub fn redacted(mut self) -> Self {
        self.password_hash = None;
        self
    }

    /// Convert to a storable document
    pub fn to_document(&self) -> Result<Document, StorageError> {
        let mut fields = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            other => {
                return Err(StorageError::Serialization(format!(
                    "User serialized to non-object value: {}",
                    other
                )));
            }
        };
        fields.remove("id");
        fields.remove("kind");
        Ok(Document {
            id: self.id.clone(),
            kind: EntityKind::User,
            fields,
        })
    }
}

impl TryFrom<Document> for User {
    type Error = StorageError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        if document.kind != EntityKind::User {
            return Err(StorageError::TypeMismatch(format!(
                "Expected a user document, found {} {}",
                document.kind, document.id
            )));
        }
        let mut fields = document.fields;
        fields.remove("kind");
        fields.insert("id".to_string(), Value::String(document.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Public view of a user document: the credential hash removed
pub fn redact(document: Document) -> Document {
    if document.kind == EntityKind::User {
        document.without_field(CREDENTIAL_FIELD)
    } else {
        document
    }
}
