//! # Catalog Error Types
//!
//! Errors raised while assembling the relation catalog, loading replica
//! configuration and resolving relation patterns.
//!
//! ## Error Categories
//!
//! - **Lookup Errors**: a pattern that must name exactly one relation named zero or several
//! - **Catalog Errors**: duplicate relation identities, unknown relation ids
//! - **Configuration Errors**: file I/O, YAML parsing and structural validation
//!
//! ## Usage Patterns
//!
//! ```ignore
//! // Provides what and where
//! CatalogError::config_error_with_context(
//!     "replica.yml",
//!     "While validating specified_relations[2]"
//! )
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("No relation in the catalog matches `{pattern}`.")]
    NoMatchingRelation { pattern: String },
    #[error("Pattern `{pattern}` is ambiguous: it matches {count} relations ({matches}).")]
    AmbiguousPattern {
        pattern: String,
        count: usize,
        matches: String,
    },
    #[error("Invalid pattern `{pattern}`: {error}")]
    InvalidPattern { pattern: String, error: String },
    #[error("Relation `{relation}` appears more than once in the catalog")]
    DuplicateRelation { relation: String },
    #[error("Relation id {id} is not present in the catalog")]
    UnknownRelationId { id: usize },
    #[error("Failed to read configuration file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse configuration: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Helper methods for creating errors with context information
impl CatalogError {
    /// Create a configuration error with context information
    ///
    /// # Example
    /// ```ignore
    /// CatalogError::config_error_with_context(
    ///     "replica.yml",
    ///     "specified relation has an empty relation pattern"
    /// )
    /// ```
    pub fn config_error_with_context(
        config_path: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let path = config_path.into();
        let ctx = context.into();
        CatalogError::InvalidConfig {
            message: format!("Configuration error in '{}'\n  Context: {}", path, ctx),
        }
    }

    /// True for the two failures of an exact pattern lookup.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            CatalogError::NoMatchingRelation { .. } | CatalogError::AmbiguousPattern { .. }
        )
    }
}
