//! Ordering of resolved entities by an arbitrary field

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::storage::Document;
use crate::{RelgraphError, Result};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = RelgraphError;

    /// Only the exact tokens `asc` and `desc` are accepted
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(RelgraphError::validation(
                "sort",
                format!(
                    "invalid order '{}', use fieldName_asc for ascending and fieldName_desc for descending",
                    s
                ),
            )),
        }
    }
}

/// A parsed `<field>_<asc|desc>` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.direction)
    }
}

impl FromStr for SortSpec {
    type Err = RelgraphError;

    /// Splits on the last underscore, so field names may contain underscores
    /// (`user_name_desc`).
    fn from_str(s: &str) -> Result<Self> {
        let Some((field, direction)) = s.rsplit_once('_') else {
            return Err(RelgraphError::validation(
                "sort",
                format!(
                    "invalid sort '{}', expected fieldName_asc or fieldName_desc",
                    s
                ),
            ));
        };
        if field.is_empty() {
            return Err(RelgraphError::validation(
                "sort",
                format!("invalid sort '{}', field name is empty", s),
            ));
        }
        Ok(SortSpec::new(field, direction.parse()?))
    }
}

/// Comparable view of a field value.
///
/// Values of different JSON types order by type rank first. Within a type,
/// integers compare exactly, other numbers as `f64`, strings
/// lexicographically; arrays and
/// objects compare equal to their own kind.
#[derive(Debug)]
enum SortKey<'a> {
    Number(&'a Number),
    Text(&'a str),
    Object,
    Array,
    Bool(bool),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Object => 2,
            SortKey::Array => 3,
            SortKey::Bool(_) => 4,
        }
    }

    fn compare(&self, other: &SortKey<'_>) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => compare_numbers(a, b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn sort_key<'a>(document: &'a Document, field: &str) -> Option<SortKey<'a>> {
    if field == "id" {
        return Some(SortKey::Text(&document.id));
    }
    match document.get(field)? {
        Value::Null => None,
        Value::Bool(b) => Some(SortKey::Bool(*b)),
        Value::Number(n) => Some(SortKey::Number(n)),
        Value::String(s) => Some(SortKey::Text(s)),
        Value::Array(_) => Some(SortKey::Array),
        Value::Object(_) => Some(SortKey::Object),
    }
}

/// Sort documents in place by `field`.
///
/// The sort is stable. Documents without the field go last in both
/// directions, and a field no document has leaves the order untouched.
pub fn sort_documents(documents: &mut [Document], field: &str, direction: SortDirection) {
    documents.sort_by(|a, b| match (sort_key(a, field), sort_key(b, field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match direction {
            SortDirection::Asc => x.compare(&y),
            SortDirection::Desc => y.compare(&x),
        },
    });
}

/// Owned-vector form of [`sort_documents`]
pub fn sort(mut documents: Vec<Document>, spec: &SortSpec) -> Vec<Document> {
    sort_documents(&mut documents, &spec.field, spec.direction);
    documents
}
