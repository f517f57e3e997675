use thiserror::Error;

use crate::catalog::errors::CatalogError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Relation `{dependency}` is specified as a dependency of `{dependent}` but cannot be resolved: {source}")]
    UnresolvedDependency {
        dependency: String,
        dependent: String,
        source: CatalogError,
    },
    #[error("The graph created by the specified relationships is not acyclic (circular reference among: {relations}).")]
    CycleDetected { relations: String },
    #[error("Graph must be built before sub-graphs can be taken from it.")]
    GraphNotBuilt,
    #[error("Relation {id} is not a node of this graph")]
    UnknownNode { id: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, GraphError>;

impl GraphError {
    /// Every graph error is a configuration problem the caller must fix
    /// before re-running; this groups them for reporting.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, GraphError::UnknownNode { .. })
    }
}
