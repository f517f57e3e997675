//! Sampling SQL generation.
//!
//! The compiler walks a relation's edges inside its sub-graph and assembles
//! the sampling statement from fragments supplied by a [`SourceDialect`].

mod compiler;
mod dialect;
mod errors;
mod pool;
mod snowflake;

pub use compiler::{
    compile_graph, compile_queries_for_relation, compose_relation_queries, CompiledQuery,
};
pub use dialect::SourceDialect;
pub use errors::QueryGeneratorError;
pub use pool::compile_partitions;
pub use snowflake::SnowflakeDialect;
