//! Relation registry
//!
//! The fixed table of relation attributes a user carries. Both the update
//! engine and the population service look relations up here instead of
//! branching on names, so adding a relation is a one-line change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::storage::EntityKind;

/// Error types for registry lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),
}

/// A named relation attribute of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Friends,
    Following,
    Followers,
    Interests,
    Liked,
    Bookmarks,
    Blogs,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Friends => "friends",
            Relation::Following => "following",
            Relation::Followers => "followers",
            Relation::Interests => "interests",
            Relation::Liked => "liked",
            Relation::Bookmarks => "bookmarks",
            Relation::Blogs => "blogs",
        }
    }

    /// Registry entry for this relation
    pub fn def(&self) -> &'static RelationDef {
        RelationRegistry::get(*self)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationRegistry::lookup(s)
            .map(|def| def.relation)
            .ok_or_else(|| RegistryError::UnknownRelation(s.to_string()))
    }
}

/// How a relation pairs with relations on the other side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    /// Mutual by intent: `a friends b` implies `b friends a`
    Symmetric,
    /// Mirrors another relation: `a following b` pairs with `b followers a`
    InverseOf(Relation),
    /// One-directional reference to a non-user entity
    None,
}

/// Definition of a relation attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    pub relation: Relation,

    /// Kind of entity the stored identifiers point at
    pub entity_kind: EntityKind,

    pub symmetry: Symmetry,

    /// When set, the owner's own id can never be a member
    pub self_excluded: bool,
}

impl RelationDef {
    pub fn name(&self) -> &'static str {
        self.relation.as_str()
    }
}

const fn user_relation(relation: Relation, symmetry: Symmetry) -> RelationDef {
    RelationDef {
        relation,
        entity_kind: EntityKind::User,
        symmetry,
        self_excluded: true,
    }
}

const fn reference(relation: Relation, entity_kind: EntityKind) -> RelationDef {
    RelationDef {
        relation,
        entity_kind,
        symmetry: Symmetry::None,
        self_excluded: false,
    }
}

static RELATIONS: [RelationDef; 7] = [
    user_relation(Relation::Friends, Symmetry::Symmetric),
    user_relation(Relation::Following, Symmetry::InverseOf(Relation::Followers)),
    user_relation(Relation::Followers, Symmetry::InverseOf(Relation::Following)),
    reference(Relation::Interests, EntityKind::Tag),
    reference(Relation::Liked, EntityKind::Blog),
    reference(Relation::Bookmarks, EntityKind::Blog),
    reference(Relation::Blogs, EntityKind::Blog),
];

/// Read-only lookup into the relation table
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationRegistry;

impl RelationRegistry {
    /// Find a relation by name. Names are case-sensitive.
    pub fn lookup(name: &str) -> Option<&'static RelationDef> {
        RELATIONS.iter().find(|def| def.name() == name)
    }

    pub fn get(relation: Relation) -> &'static RelationDef {
        // The table holds exactly one entry per variant, in declaration order.
        &RELATIONS[relation as usize]
    }

    pub fn all() -> &'static [RelationDef] {
        &RELATIONS
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        RELATIONS.iter().map(RelationDef::name)
    }
}
