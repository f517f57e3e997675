use thiserror::Error;

use crate::catalog::errors::CatalogError;
use crate::dependency_graph::errors::GraphError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryGeneratorError {
    #[error("Relation `{relation}` is not part of the graph it is being compiled against")]
    RelationNotInGraph { relation: String },
    #[error("Relation `{relation}` has no sample method assigned (build the graph before compiling)")]
    MissingSampleMethod { relation: String },
    #[error("Compilation worker failed: {message}")]
    WorkerFailed { message: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, QueryGeneratorError>;
