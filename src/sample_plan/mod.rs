//! End-to-end planning: from a replica configuration and a catalog snapshot
//! to the compiled statements of every included relation.

pub mod errors;
pub mod plan;
pub mod planner;

pub use errors::PlanError;
pub use plan::{EdgePlan, PartitionPlan, RelationPlan, SamplePlan};
pub use planner::Planner;
