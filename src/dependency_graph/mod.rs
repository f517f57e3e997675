//! Relation dependency graph: construction from replica configuration,
//! acyclicity validation and partitioning into independent sub-graphs.

pub mod builder;
pub mod errors;
pub mod graph;
pub mod partition;

pub use builder::SampleGraph;
pub use errors::GraphError;
pub use graph::{DependencyEdge, DependencyGraph, Direction};
pub use partition::partition;
