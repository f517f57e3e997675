//! Builds the dependency graph of a replica from its configuration and the
//! full source catalog.

use log::{debug, info, warn};
use std::collections::BTreeSet;

use super::errors::{GraphError, Result};
use super::graph::{DependencyEdge, DependencyGraph, Direction};
use crate::catalog::{
    matches_any, matches_exactly_one, Catalog, CompiledPattern, Configuration, Pattern,
    RelationId, RelationshipSpec,
};

/// Holder of the graph built for one configuration.
///
/// The graph is only present after a successful [`SampleGraph::build`]; a
/// failed build leaves no graph behind.
#[derive(Debug, Default)]
pub struct SampleGraph {
    graph: Option<DependencyGraph>,
}

/// A relationship spec resolved against the catalog
#[derive(Debug)]
struct ResolvedRelationship<'a> {
    upstream: RelationId,
    /// `None` when the declaring pattern matches nothing in the catalog
    downstream: Option<RelationId>,
    declared: Direction,
    spec: &'a RelationshipSpec,
    /// Declared by an unsampled specified relation: adds a node, never an edge
    unsampled: bool,
}

impl SampleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref()
    }

    pub fn is_built(&self) -> bool {
        self.graph.is_some()
    }

    /// Builds the directed graph described by `config` over `catalog`.
    ///
    /// Marks unsampled relations and assigns the default sampling settings
    /// to every included relation through the catalog.
    pub fn build(&mut self, config: &Configuration, catalog: &mut Catalog) -> Result<()> {
        self.graph = None;
        debug!("Building graphs from config...");

        let patterns = compile_patterns(&config.sum_patterns())?;
        let mut included: BTreeSet<RelationId> = catalog
            .iter()
            .filter(|(_, rel)| matches_any(rel, &patterns))
            .map(|(id, _)| id)
            .collect();

        let relationships = resolve_relationships(config, catalog)?;
        let before = included.len();
        for resolved in &relationships {
            included.insert(resolved.upstream);
        }
        if included.len() > before {
            debug!(
                "Added {} relations that are only included as dependencies",
                included.len() - before
            );
        }
        info!(
            "Identified a total of {} relations to sample based on the specified configurations.",
            included.len()
        );

        let mut graph = DependencyGraph::new();
        for id in &included {
            graph.add_node(*id);
        }

        apply_unsampled(config, catalog, &included)?;
        add_edges(catalog, &mut graph, &relationships)?;

        graph.topological_order().map_err(|e| {
            warn!("Rejecting dependency graph: {}", e);
            e
        })?;

        for id in graph.nodes() {
            let relation = catalog.relation_mut(id)?;
            relation.sample_method = Some(config.default_sample_method().clone());
            relation.include_outliers = config.include_outliers;
            relation.max_number_of_outliers = config.max_number_of_outliers;
        }

        debug!(
            "built graph with {} total nodes and {} edges.",
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = Some(graph);
        Ok(())
    }
}

fn compile_patterns(patterns: &[Pattern]) -> Result<Vec<CompiledPattern>> {
    patterns
        .iter()
        .map(|p| p.compile().map_err(GraphError::from))
        .collect()
}

/// Resolves every relationship spec of every specified relation.
///
/// Each downstream relation matching a specified pattern gets its own
/// upstream lookup, with empty database/schema parts inherited from it.
/// When the declaring pattern matches nothing in the catalog, each spec is
/// still looked up as written (empty parts unconstrained); its target joins
/// the sample without an edge.
fn resolve_relationships<'a>(
    config: &'a Configuration,
    catalog: &Catalog,
) -> Result<Vec<ResolvedRelationship<'a>>> {
    let mut resolved = Vec::new();
    for specified in &config.specified_relations {
        if specified.relationships.is_empty() {
            continue;
        }
        let declaring = specified.pattern().compile()?;
        let downstreams: Vec<RelationId> = catalog
            .iter()
            .filter(|(_, rel)| declaring.matches(rel))
            .map(|(id, _)| id)
            .collect();
        if downstreams.is_empty() {
            warn!(
                "Specified relation `{}` matches no relation in the catalog; its dependencies are included without edges",
                specified.pattern()
            );
            for (declared, spec) in specified.relationships.iter() {
                let lookup = spec.pattern().compile()?;
                let upstream = matches_exactly_one(&lookup, catalog.iter()).map_err(|source| {
                    GraphError::UnresolvedDependency {
                        dependency: lookup.pattern().to_string(),
                        dependent: specified.pattern().to_string(),
                        source,
                    }
                })?;
                resolved.push(ResolvedRelationship {
                    upstream,
                    downstream: None,
                    declared,
                    spec,
                    unsampled: specified.unsampled,
                });
            }
            continue;
        }

        for (declared, spec) in specified.relationships.iter() {
            for &downstream in &downstreams {
                let downstream_rel = catalog.relation(downstream)?;
                let lookup = spec.pattern().inherit_scope(downstream_rel).compile()?;
                let upstream = matches_exactly_one(&lookup, catalog.iter()).map_err(|source| {
                    GraphError::UnresolvedDependency {
                        dependency: lookup.pattern().to_string(),
                        dependent: downstream_rel.dot_notation(),
                        source,
                    }
                })?;
                resolved.push(ResolvedRelationship {
                    upstream,
                    downstream: Some(downstream),
                    declared,
                    spec,
                    unsampled: specified.unsampled,
                });
            }
        }
    }
    Ok(resolved)
}

fn apply_unsampled(
    config: &Configuration,
    catalog: &mut Catalog,
    included: &BTreeSet<RelationId>,
) -> Result<()> {
    for specified in config.specified_relations.iter().filter(|s| s.unsampled) {
        let pattern = specified.pattern().compile()?;
        let mut marked = 0;
        for &id in included {
            let relation = catalog.relation_mut(id)?;
            if pattern.matches(relation) {
                relation.unsampled = true;
                marked += 1;
            }
        }
        debug!("Marked {} relations matching `{}` as unsampled", marked, pattern.pattern());
    }
    Ok(())
}

fn add_edges(
    catalog: &Catalog,
    graph: &mut DependencyGraph,
    relationships: &[ResolvedRelationship<'_>],
) -> Result<()> {
    for resolved in relationships.iter().filter(|r| !r.unsampled) {
        let Some(downstream_id) = resolved.downstream else {
            continue;
        };
        let downstream = catalog.relation(downstream_id)?;
        if resolved.upstream == downstream_id {
            debug!("Skipping self-referencing relationship on {}", downstream);
            continue;
        }
        let upstream = catalog.relation(resolved.upstream)?;

        // Both declared directions become bidirectional edges.
        let edge = DependencyEdge::new(
            Direction::Bidirectional,
            resolved.spec.remote_attribute.clone(),
            resolved.spec.local_attribute.clone(),
        );
        debug!(
            "Adding {} edge {} -> {} ({} = {})",
            resolved.declared,
            upstream,
            downstream,
            resolved.spec.local_attribute,
            resolved.spec.remote_attribute
        );
        if let Some(previous) = graph.add_edge(resolved.upstream, downstream_id, edge) {
            warn!(
                "Parallel edge {} -> {} replaces earlier edge on ({} = {})",
                upstream, downstream, previous.local_attribute, previous.remote_attribute
            );
        }
    }
    Ok(())
}
