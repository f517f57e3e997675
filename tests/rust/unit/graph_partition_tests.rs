//! Dependency graph ordering and partitioning

#[cfg(test)]
mod graph_partition_tests {
    use std::collections::BTreeSet;

    use samplegraph::catalog::{Catalog, Materialization, Relation, RelationId};
    use samplegraph::dependency_graph::{
        partition, DependencyEdge, DependencyGraph, Direction, GraphError,
    };
    use test_case::test_case;

    fn ids(count: usize) -> Vec<RelationId> {
        let mut catalog = Catalog::new();
        (0..count)
            .map(|i| {
                catalog
                    .insert(Relation::new(
                        "DB",
                        "S",
                        format!("R{}", i),
                        Materialization::Table,
                        Vec::new(),
                    ))
                    .unwrap()
            })
            .collect()
    }

    fn edge() -> DependencyEdge {
        DependencyEdge::new(Direction::Bidirectional, "ID", "PARENT_ID")
    }

    /// Graph over `count` nodes with the given (parent, child) index pairs
    fn graph(count: usize, edges: &[(usize, usize)]) -> (Vec<RelationId>, DependencyGraph) {
        let ids = ids(count);
        let mut graph = DependencyGraph::new();
        for id in &ids {
            graph.add_node(*id);
        }
        for &(parent, child) in edges {
            graph.add_edge(ids[parent], ids[child], edge());
        }
        (ids, graph)
    }

    #[test_case(4, &[] ; "only isolates")]
    #[test_case(5, &[(0, 1), (1, 2), (3, 4)] ; "two chains")]
    #[test_case(6, &[(0, 2), (1, 2), (2, 3)] ; "diamond with isolates")]
    #[test_case(7, &[(6, 0), (5, 1), (0, 1), (2, 3)] ; "mixed")]
    fn test_partition_covers_graph(count: usize, edges: &[(usize, usize)]) {
        let (_, graph) = graph(count, edges);
        let parts = partition(&graph).unwrap();

        let mut seen = BTreeSet::new();
        let mut edge_total = 0;
        for part in &parts {
            for node in part.nodes() {
                assert!(seen.insert(node), "{} appears in two partitions", node);
            }
            edge_total += part.edge_count();
        }
        let all: BTreeSet<_> = graph.nodes().collect();
        assert_eq!(seen, all);
        assert_eq!(edge_total, graph.edge_count());
    }

    #[test]
    fn test_isolates_come_first() {
        let (ids, graph) = graph(5, &[(1, 2), (3, 4)]);
        let parts = partition(&graph).unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].nodes().collect::<Vec<_>>(), vec![ids[0]]);
        assert_eq!(parts[1].nodes().collect::<Vec<_>>(), vec![ids[1], ids[2]]);
        assert_eq!(parts[2].nodes().collect::<Vec<_>>(), vec![ids[3], ids[4]]);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let (_, graph) = graph(7, &[(6, 0), (5, 1), (0, 1), (2, 3)]);
        assert_eq!(partition(&graph).unwrap(), partition(&graph).unwrap());
    }

    #[test]
    fn test_topological_order_puts_parents_first() {
        let (ids, graph) = graph(5, &[(4, 0), (0, 2), (3, 2), (2, 1)]);
        let order = graph.topological_order().unwrap();
        let position = |id: RelationId| order.iter().position(|o| *o == id).unwrap();

        assert_eq!(order.len(), 5);
        for (parent, child) in [(4, 0), (0, 2), (3, 2), (2, 1)] {
            assert!(position(ids[parent]) < position(ids[child]));
        }
    }

    #[test]
    fn test_cycle_is_rejected() {
        let (_, graph) = graph(4, &[(0, 1), (1, 2), (2, 0)]);
        assert!(!graph.is_acyclic());
        match graph.topological_order() {
            Err(GraphError::CycleDetected { relations }) => {
                assert_eq!(relations, "#0, #1, #2");
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_edge_replaces_previous() {
        let (ids, mut graph) = graph(2, &[(0, 1)]);
        let replaced = graph.add_edge(
            ids[0],
            ids[1],
            DependencyEdge::new(Direction::Bidirectional, "KEY", "OTHER_KEY"),
        );

        assert_eq!(replaced, Some(edge()));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge(ids[0], ids[1]).unwrap().remote_attribute, "KEY");
    }
}
