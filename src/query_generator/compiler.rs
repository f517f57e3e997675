//! Composes the sampling statement of each relation from its edges in a
//! dependency sub-graph.

use log::debug;

use super::dialect::SourceDialect;
use super::errors::{QueryGeneratorError, Result};
use crate::catalog::{Catalog, Relation, RelationId};
use crate::dependency_graph::DependencyGraph;

/// Statements produced for one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Sampling statement before analyze wrapping
    pub core_query: String,
    /// Statement handed to the execution layer
    pub compiled_query: String,
}

/// Builds the statements for `id` without touching the catalog.
///
/// Outbound edges constrain the relation by its children when bidirectional;
/// inbound edges always constrain it by its parents, and a bidirectional
/// inbound edge stops the relation from being sampled again on top of that
/// constraint.
pub fn compose_relation_queries(
    id: RelationId,
    graph: &DependencyGraph,
    catalog: &Catalog,
    dialect: &dyn SourceDialect,
    analyze: bool,
) -> Result<CompiledQuery> {
    let relation = catalog.relation(id)?;
    if !graph.contains(id) {
        return Err(QueryGeneratorError::RelationNotInGraph {
            relation: relation.dot_notation(),
        });
    }

    if relation.is_view() {
        let ddl = dialect.view_creation_statement(relation);
        return Ok(CompiledQuery {
            core_query: ddl.clone(),
            compiled_query: ddl,
        });
    }

    let query = if relation.unsampled {
        dialect.unsampled_statement(relation)
    } else {
        sampled_statement(id, relation, graph, catalog, dialect, analyze)?
    };

    let compiled_query = if analyze {
        dialect.analyze_wrap_statement(&query, relation)
    } else {
        query.clone()
    };
    Ok(CompiledQuery {
        core_query: query,
        compiled_query,
    })
}

fn sampled_statement(
    id: RelationId,
    relation: &Relation,
    graph: &DependencyGraph,
    catalog: &Catalog,
    dialect: &dyn SourceDialect,
    analyze: bool,
) -> Result<String> {
    let sample_method =
        relation
            .sample_method
            .as_ref()
            .ok_or_else(|| QueryGeneratorError::MissingSampleMethod {
                relation: relation.dot_notation(),
            })?;

    let mut do_not_sample = false;
    let mut predicates: Vec<String> = Vec::new();
    let mut unions: Vec<String> = Vec::new();

    // parallel edges are not supported; one edge per ordered pair
    for (child_id, edge) in graph.successors(id) {
        let child = catalog.relation(child_id)?;
        if edge.is_bidirectional() {
            predicates.push(dialect.upstream_constraint_statement(
                child,
                &edge.remote_attribute,
                &edge.local_attribute,
            ));
        }
        if relation.include_outliers {
            unions.push(dialect.union_constraint_statement(
                relation,
                child,
                &edge.remote_attribute,
                &edge.local_attribute,
                relation.max_number_of_outliers,
            ));
        }
    }

    for (parent_id, edge) in graph.predecessors(id) {
        let parent = catalog.relation(parent_id)?;
        do_not_sample = do_not_sample || edge.is_bidirectional();
        predicates.push(dialect.predicate_constraint_statement(
            parent,
            analyze,
            &edge.local_attribute,
            &edge.remote_attribute,
        ));
        if relation.include_outliers {
            unions.push(dialect.union_constraint_statement(
                relation,
                parent,
                &edge.local_attribute,
                &edge.remote_attribute,
                relation.max_number_of_outliers,
            ));
        }
    }

    let mut query = dialect.sample_statement_from_relation(
        relation,
        if predicates.is_empty() {
            Some(sample_method)
        } else {
            None
        },
    );
    if !predicates.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&predicates.join(" AND "));
        query = dialect.directionally_wrap_statement(
            &query,
            relation,
            if do_not_sample {
                None
            } else {
                Some(sample_method)
            },
        );
    }
    for union in &unions {
        query.push_str(" UNION ");
        query.push_str(union);
    }

    debug!(
        "Compiled {} with {} predicates, {} outlier unions{}",
        relation,
        predicates.len(),
        unions.len(),
        if do_not_sample {
            " (constrained by upstream, not resampled)"
        } else {
            ""
        }
    );
    Ok(query)
}

/// Compiles `id` and stores both statements on the relation.
pub fn compile_queries_for_relation<'c>(
    id: RelationId,
    graph: &DependencyGraph,
    catalog: &'c mut Catalog,
    dialect: &dyn SourceDialect,
    analyze: bool,
) -> Result<&'c Relation> {
    let compiled = compose_relation_queries(id, graph, catalog, dialect, analyze)?;
    let relation = catalog.relation_mut(id)?;
    relation.core_query = Some(compiled.core_query);
    relation.compiled_query = Some(compiled.compiled_query);
    Ok(relation)
}

/// Compiles every relation of a sub-graph, parents before children, so
/// dialects that embed an upstream relation's statement find it compiled.
///
/// Returns the number of relations compiled.
pub fn compile_graph(
    graph: &DependencyGraph,
    catalog: &mut Catalog,
    dialect: &dyn SourceDialect,
    analyze: bool,
) -> Result<usize> {
    let order = graph.topological_order()?;
    for id in &order {
        compile_queries_for_relation(*id, graph, catalog, dialect, analyze)?;
    }
    Ok(order.len())
}
