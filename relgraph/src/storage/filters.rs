//! Filter types for storage queries

use regex::Regex;

use crate::storage::models::Document;

/// A regular expression that a string field must match
#[derive(Debug, Clone)]
pub struct FieldMatch {
    /// Field name
    pub field: String,

    /// Compiled pattern
    pub pattern: Regex,
}

/// Filter for document queries. An empty filter accepts every document.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Filter by field patterns (all must match)
    pub matches: Vec<FieldMatch>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to be a string matching `pattern`
    pub fn field_matches(mut self, field: impl Into<String>, pattern: Regex) -> Self {
        self.matches.push(FieldMatch {
            field: field.into(),
            pattern,
        });
        self
    }

    /// Whether a document passes the filter
    pub fn accepts(&self, document: &Document) -> bool {
        self.matches.iter().all(|m| {
            let value = if m.field == "id" {
                Some(document.id.as_str())
            } else {
                document.get_str(&m.field)
            };
            value.is_some_and(|v| m.pattern.is_match(v))
        })
    }
}
