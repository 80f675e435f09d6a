//! User directory
//!
//! Account-level operations around the relation core: creating and deleting
//! users, lookups by handle or email, whole-profile population and a paged,
//! case-insensitive handle search. Users returned from here never carry the
//! credential hash.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, instrument};

use crate::config::SearchConfig;
use crate::models::{User, redact};
use crate::relations::{Relation, RelationPopulationService, RelationRegistry};
use crate::storage::filters::DocumentFilter;
use crate::storage::{Document, DocumentStore, EntityKind, StorageError};
use crate::{RelgraphError, Result};

/// Positive integer without leading zeros
static PAGE_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[1-9]\d*$").ok());

/// Upper bound on the compiled size of a user-supplied search pattern
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Input for [`UserDirectory::create_user`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,

    /// Opaque credential hash, stored as given
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Further scalar attributes (`name`, `age`, ...)
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl NewUser {
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub user_name: String,
    pub followers_count: usize,
    pub blogs_count: usize,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Matches across all pages
    pub total_count: usize,
    pub matched: Vec<UserSummary>,
}

/// Account operations over the user collection
#[derive(Debug, Clone)]
pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
    population: RelationPopulationService,
    search: SearchConfig,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, search: SearchConfig) -> Self {
        Self {
            population: RelationPopulationService::new(store.clone()),
            store,
            search,
        }
    }

    /// Create a user with empty relations and a fresh id.
    ///
    /// A taken handle or email is a conflict.
    #[instrument(skip(self, new_user), fields(user_name = %new_user.user_name))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        if new_user.user_name.trim().is_empty() {
            return Err(RelgraphError::validation("user_name", "is required"));
        }
        if new_user.email.trim().is_empty() {
            return Err(RelgraphError::validation("email", "is required"));
        }
        if let Some(key) = new_user.extra.keys().find(|key| is_reserved(key)) {
            return Err(RelgraphError::validation(
                key.as_str(),
                "cannot be set on a new user",
            ));
        }

        let mut user = User::new(
            uuid::Uuid::new_v4().to_string(),
            new_user.user_name,
            new_user.email,
        );
        user.password_hash = new_user.password_hash;
        user.extra = new_user.extra;

        let document = user.to_document()?;
        let stored = self.store.insert(document).await.map_err(|e| match e {
            StorageError::AlreadyExists(message) => RelgraphError::conflict("user", message),
            other => other.into(),
        })?;

        info!(id = %stored.id, "User created");
        Ok(User::try_from(stored)?.redacted())
    }

    /// Delete a user. Relations of other users that reference it are left
    /// as they are.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, owner_id: &str) -> Result<User> {
        let removed = self
            .store
            .delete(EntityKind::User, owner_id)
            .await?
            .ok_or_else(|| RelgraphError::NotFound(format!("user {}", owner_id)))?;
        info!(id = owner_id, "User deleted");
        Ok(User::try_from(removed)?.redacted())
    }

    #[instrument(skip(self))]
    pub async fn find_by_user_name(&self, user_name: &str) -> Result<User> {
        self.find_by_field("user_name", user_name).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<User> {
        self.find_by_field("email", email).await
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<User> {
        let document = self
            .store
            .find_one_by_field(EntityKind::User, field, &Value::String(value.to_string()))
            .await?
            .ok_or_else(|| RelgraphError::NotFound(format!("user with {} {}", field, value)))?;
        Ok(User::try_from(document)?.redacted())
    }

    /// Load a user profile with the given relations replaced by their
    /// entities. Relations not listed stay as identifier lists.
    #[instrument(skip(self))]
    pub async fn get_user(&self, owner_id: &str, populate: &[Relation]) -> Result<Document> {
        let document = self
            .store
            .find_by_id(EntityKind::User, owner_id)
            .await?
            .ok_or_else(|| RelgraphError::NotFound(format!("user {}", owner_id)))?;

        if populate.is_empty() {
            return Ok(redact(document));
        }

        let owner = User::try_from(document.clone())?;
        let mut profile = redact(document);
        for relation in populate {
            let entities = self.population.populate(&owner, relation.def()).await?;
            let value = serde_json::to_value(entities).map_err(StorageError::from)?;
            profile.fields.insert(relation.as_str().to_string(), value);
        }
        Ok(profile)
    }

    /// Search users whose handle matches `username`, case-insensitively.
    ///
    /// `page` and `per_page` are raw request values: anything other than a
    /// positive integer falls back to page 1 and the configured default
    /// size. Page sizes above the configured maximum are clamped. A missing
    /// pattern matches every user.
    #[instrument(skip(self))]
    pub async fn search_users(
        &self,
        username: Option<&str>,
        page: Option<&str>,
        per_page: Option<&str>,
    ) -> Result<SearchPage> {
        let page = parse_positive(page).unwrap_or(1);
        let per_page = parse_positive(per_page)
            .unwrap_or(self.search.default_per_page)
            .min(self.search.max_per_page);
        let skip = (page - 1).saturating_mul(per_page);

        let mut filter = DocumentFilter::new();
        if let Some(pattern) = username {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .size_limit(PATTERN_SIZE_LIMIT)
                .build()
                .map_err(|e| RelgraphError::validation("username", format!("invalid pattern: {}", e)))?;
            filter = filter.field_matches("user_name", regex);
        }

        let total_count = self.store.count(EntityKind::User, &filter).await?;
        let matched = self
            .store
            .search(EntityKind::User, &filter, Some(per_page), Some(skip))
            .await?
            .into_iter()
            .map(|doc| UserSummary {
                user_name: doc.get_str("user_name").unwrap_or_default().to_string(),
                followers_count: doc.id_set(Relation::Followers.as_str()).len(),
                blogs_count: doc.id_set(Relation::Blogs.as_str()).len(),
                id: doc.id,
            })
            .collect::<Vec<_>>();

        debug!(total_count, page, per_page, returned = matched.len(), "User search");
        Ok(SearchPage {
            total_count,
            matched,
        })
    }
}

/// Keys owned by the user model itself. Relations start empty.
fn is_reserved(key: &str) -> bool {
    matches!(
        key,
        "id" | "_id" | "kind" | "user_name" | "email" | "password_hash" | "created_at"
    ) || RelationRegistry::lookup(key).is_some()
}

/// A positive integer written without sign or leading zeros
fn parse_positive(raw: Option<&str>) -> Option<usize> {
    let raw = raw?;
    let valid = PAGE_NUMBER.as_ref().is_some_and(|re| re.is_match(raw));
    if valid { raw.parse().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(Some("3")), Some(3));
        assert_eq!(parse_positive(Some("120")), Some(120));
        for raw in ["0", "-1", "01", "1.5", "abc", "", " 2"] {
            assert_eq!(parse_positive(Some(raw)), None, "{raw:?}");
        }
        assert_eq!(parse_positive(None), None);
        assert_eq!(parse_positive(Some("99999999999999999999999999")), None);
    }

    #[test]
    fn test_lookups_are_redacted() {
        let store = crate::storage::create_store(&Default::default());
        let directory = UserDirectory::new(store, SearchConfig::default());

        let created = tokio_test::block_on(
            directory.create_user(NewUser::new("ada", "ada@example.com").with_password_hash("$h")),
        );
        let created = tokio_test::assert_ok!(created);
        assert!(created.password_hash.is_none());

        let found = tokio_test::assert_ok!(tokio_test::block_on(directory.find_by_email("ada@example.com")));
        assert_eq!(found.id, created.id);
        assert!(found.password_hash.is_none());

        tokio_test::assert_err!(tokio_test::block_on(directory.find_by_user_name("bob")));
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved("id"));
        assert!(is_reserved("followers"));
        assert!(is_reserved("password_hash"));
        assert!(!is_reserved("age"));
    }

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("ada", "ada@example.com")
            .with_password_hash("$h")
            .with_field("age", 36);
        assert_eq!(user.password_hash.as_deref(), Some("$h"));
        assert_eq!(user.extra["age"], 36);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let page = SearchPage {
            total_count: 1,
            matched: vec![UserSummary {
                id: "u1".into(),
                user_name: "ada".into(),
                followers_count: 2,
                blogs_count: 0,
            }],
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["matched"][0]["userName"], "ada");
        assert_eq!(json["matched"][0]["followersCount"], 2);
        assert_eq!(json["matched"][0]["blogsCount"], 0);
    }
}
