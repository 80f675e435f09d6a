//! User relations: registry, updates and population
//!
//! - [`registry`]: the fixed table of relation attributes
//! - [`patch`]: parsing of `add_<relation>` / `remove_<relation>` patches
//! - [`engine`]: applies a patch as one atomic store mutation
//! - [`population`]: resolves a relation to its entities
//! - [`sort`]: field-based ordering of resolved entities

pub mod engine;
pub mod patch;
pub mod population;
pub mod registry;
pub mod sort;

pub use engine::RelationUpdateEngine;
pub use patch::{Delta, RelationPatch};
pub use population::RelationPopulationService;
pub use registry::{Relation, RelationDef, RelationRegistry, RegistryError, Symmetry};
pub use sort::{SortDirection, SortSpec};
