pub mod arena;
pub mod errors;
pub mod pattern;
pub mod relation;
pub mod replica_config;
pub mod sample_method;


// Re-export commonly used types
pub use arena::{Catalog, RelationId};
pub use errors::CatalogError;
pub use pattern::{matches_any, matches_exactly_one, CompiledPattern, Pattern};
pub use relation::{Attribute, DataType, Materialization, Relation, RelationKey};
pub use replica_config::{Configuration, RelationshipSpec, Relationships, SpecifiedRelation};
pub use sample_method::{SampleMethod, SampleUnits};
