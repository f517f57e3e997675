//! Splits a dependency graph into independent sub-graphs.
//!
//! Isolated relations come first, one single-node graph each. The remaining
//! nodes are grouped by connectivity with edge direction ignored; each group
//! becomes the induced directed sub-graph of the full graph, so directions and
//! edge attributes survive for query compilation.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use super::builder::SampleGraph;
use super::errors::{GraphError, Result};
use super::graph::DependencyGraph;
use crate::catalog::RelationId;

/// Disjoint-set forest with path halving and union by size
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Partitions `graph` into isolates followed by connected components.
///
/// Components are ordered by their smallest relation id, and nodes inside a
/// component keep id order, so the result is deterministic.
pub fn partition(graph: &DependencyGraph) -> Result<Vec<DependencyGraph>> {
    let isolates = graph.isolates();
    debug!("created {} isolate dags.", isolates.len());

    let connected: Vec<RelationId> = graph.nodes().filter(|id| graph.degree(*id) > 0).collect();
    let position: HashMap<RelationId, usize> =
        connected.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut sets = UnionFind::new(connected.len());
    for &parent in &connected {
        for (child, _) in graph.successors(parent) {
            sets.union(position[&parent], position[&child]);
        }
    }

    let mut components: BTreeMap<usize, Vec<RelationId>> = BTreeMap::new();
    for (i, id) in connected.iter().enumerate() {
        components.entry(sets.find(i)).or_default().push(*id);
    }
    let mut components: Vec<Vec<RelationId>> = components.into_values().collect();
    components.sort_by_key(|members| members[0]);
    debug!("created {} connected dags.", components.len());

    let mut graphs = Vec::with_capacity(isolates.len() + components.len());
    for id in isolates {
        let mut single = DependencyGraph::new();
        single.add_node(id);
        graphs.push(single);
    }
    for members in &components {
        graphs.push(graph.induced_subgraph(members)?);
    }
    Ok(graphs)
}

impl SampleGraph {
    /// Independent sub-graphs of the built graph
    pub fn get_graphs(&self) -> Result<Vec<DependencyGraph>> {
        let graph = self.graph().ok_or(GraphError::GraphNotBuilt)?;
        partition(graph)
    }
}
