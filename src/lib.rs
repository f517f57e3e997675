//! Samplegraph - sampling plans for relational database replicas
//!
//! This crate turns a replica configuration and a source catalog into the
//! statements that draw a referentially consistent sample:
//! - Relation filtering by database/schema/relation patterns
//! - Dependency graph construction from declared relationships
//! - Partitioning into independent sub-graphs
//! - Dialect-driven SQL generation, compiled in parallel

pub mod catalog;
pub mod config;
pub mod dependency_graph;
pub mod query_generator;
pub mod sample_plan;
