//! Directed dependency graph over catalog relations.
//!
//! Nodes are [`RelationId`]s; an edge `parent -> child` means the child's
//! sample is constrained by the rows sampled from the parent. Adjacency is kept
//! in ordered maps in both directions so iteration order (and therefore the
//! generated SQL) is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use super::errors::{GraphError, Result};
use crate::catalog::RelationId;

/// Declared semantics of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Join constraint applied to both sides
    Bidirectional,
    /// One-way dependency: only the child is constrained
    Directional,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bidirectional => f.write_str("bidirectional"),
            Direction::Directional => f.write_str("directional"),
        }
    }
}

/// Attributes carried by an edge `parent -> child`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub direction: Direction,
    /// Column on the parent (upstream) relation
    pub remote_attribute: String,
    /// Column on the child (downstream) relation
    pub local_attribute: String,
}

impl DependencyEdge {
    pub fn new(
        direction: Direction,
        remote_attribute: impl Into<String>,
        local_attribute: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            remote_attribute: remote_attribute.into(),
            local_attribute: local_attribute.into(),
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        self.direction == Direction::Bidirectional
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    successors: BTreeMap<RelationId, BTreeMap<RelationId, DependencyEdge>>,
    predecessors: BTreeMap<RelationId, BTreeSet<RelationId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; adding an existing node is a no-op
    pub fn add_node(&mut self, id: RelationId) {
        self.successors.entry(id).or_default();
        self.predecessors.entry(id).or_default();
    }

    /// Adds `parent -> child`, creating missing nodes.
    ///
    /// Parallel edges are not kept: a second edge between the same ordered
    /// pair replaces the first, and the replaced edge is returned.
    pub fn add_edge(
        &mut self,
        parent: RelationId,
        child: RelationId,
        edge: DependencyEdge,
    ) -> Option<DependencyEdge> {
        self.add_node(parent);
        self.add_node(child);
        self.predecessors.entry(child).or_default().insert(parent);
        self.successors.entry(parent).or_default().insert(child, edge)
    }

    pub fn contains(&self, id: RelationId) -> bool {
        self.successors.contains_key(&id)
    }

    pub fn edge(&self, parent: RelationId, child: RelationId) -> Option<&DependencyEdge> {
        self.successors.get(&parent).and_then(|c| c.get(&child))
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = RelationId> + '_ {
        self.successors.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Outbound edges `id -> child`
    pub fn successors(
        &self,
        id: RelationId,
    ) -> impl Iterator<Item = (RelationId, &DependencyEdge)> + '_ {
        self.successors
            .get(&id)
            .into_iter()
            .flat_map(|children| children.iter().map(|(c, e)| (*c, e)))
    }

    /// Inbound edges `parent -> id`
    pub fn predecessors(
        &self,
        id: RelationId,
    ) -> impl Iterator<Item = (RelationId, &DependencyEdge)> + '_ {
        self.predecessors
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(move |p| self.edge(*p, id).map(|e| (*p, e)))
    }

    pub fn degree(&self, id: RelationId) -> usize {
        self.successors.get(&id).map_or(0, BTreeMap::len)
            + self.predecessors.get(&id).map_or(0, BTreeSet::len)
    }

    /// Nodes without any edge
    pub fn isolates(&self) -> Vec<RelationId> {
        self.nodes().filter(|id| self.degree(*id) == 0).collect()
    }

    /// Kahn's algorithm. Parents come before their children; among nodes
    /// that are ready at the same time the lower id goes first.
    ///
    /// On a cycle, the error lists the nodes that could not be ordered.
    pub fn topological_order(&self) -> Result<Vec<RelationId>> {
        let mut in_degree: BTreeMap<RelationId, usize> = self
            .predecessors
            .iter()
            .map(|(id, parents)| (*id, parents.len()))
            .collect();
        let mut ready: VecDeque<RelationId> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.node_count());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            for (child, _) in self.successors(id) {
                if let Some(d) = in_degree.get_mut(&child) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        if order.len() < self.node_count() {
            let stuck: Vec<String> = in_degree
                .iter()
                .filter(|(_, d)| **d > 0)
                .map(|(id, _)| id.to_string())
                .collect();
            return Err(GraphError::CycleDetected {
                relations: stuck.join(", "),
            });
        }
        Ok(order)
    }

    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_ok()
    }

    /// Sub-graph on `nodes` keeping every edge whose endpoints are both included
    pub fn induced_subgraph(&self, nodes: &[RelationId]) -> Result<DependencyGraph> {
        let keep: BTreeSet<RelationId> = nodes.iter().copied().collect();
        let mut sub = DependencyGraph::new();
        for &id in &keep {
            if !self.contains(id) {
                return Err(GraphError::UnknownNode { id: id.to_string() });
            }
            sub.add_node(id);
        }
        for &parent in &keep {
            for (child, edge) in self.successors(parent) {
                if keep.contains(&child) {
                    sub.add_edge(parent, child, edge.clone());
                }
            }
        }
        Ok(sub)
    }
}
