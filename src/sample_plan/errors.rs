use thiserror::Error;

use crate::catalog::errors::CatalogError;
use crate::dependency_graph::errors::GraphError;
use crate::query_generator::QueryGeneratorError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("Query generation error: {0}")]
    QueryGenerator(#[from] QueryGeneratorError),
    #[error("Relation `{relation}` is in the graph but was not compiled")]
    NotCompiled { relation: String },
    #[error("Failed to render plan: {message}")]
    Render { message: String },
}

impl PlanError {
    /// Errors caused by the replica configuration rather than the run
    pub fn is_configuration_error(&self) -> bool {
        match self {
            PlanError::Graph(e) => e.is_configuration_error(),
            PlanError::Catalog(e) => e.is_lookup_failure(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
