//! Runs the whole pipeline for one replica configuration: case
//! normalization, graph build, partitioning and parallel compilation.

use log::info;
use std::sync::Arc;

use super::errors::{PlanError, Result};
use super::plan::{EdgePlan, PartitionPlan, RelationPlan, SamplePlan};
use crate::catalog::{Catalog, Configuration};
use crate::config::{RunConfig, DEFAULT_WORKER_COUNT};
use crate::dependency_graph::{DependencyGraph, SampleGraph};
use crate::query_generator::{compile_partitions, SourceDialect};

pub struct Planner {
    dialect: Arc<dyn SourceDialect>,
    workers: usize,
    analyze: bool,
}

impl Planner {
    pub fn new(dialect: Arc<dyn SourceDialect>) -> Self {
        Self {
            dialect,
            workers: DEFAULT_WORKER_COUNT,
            analyze: false,
        }
    }

    pub fn from_run_config(dialect: Arc<dyn SourceDialect>, config: &RunConfig) -> Self {
        Self::new(dialect)
            .with_workers(config.workers)
            .with_analyze(config.analyze)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_analyze(mut self, analyze: bool) -> Self {
        self.analyze = analyze;
        self
    }

    /// Builds and compiles the sample plan for `config` over `catalog`.
    ///
    /// Relation identities are normalized to the dialect's case first.
    /// Relations outside the graph are left out of the plan.
    pub async fn plan(&self, config: &Configuration, mut catalog: Catalog) -> Result<SamplePlan> {
        let dialect = Arc::clone(&self.dialect);
        catalog.normalize_case(|identifier| dialect.correct_case(identifier))?;

        let mut sample_graph = SampleGraph::new();
        sample_graph.build(config, &mut catalog)?;
        let graphs = sample_graph.get_graphs()?;
        info!(
            "Built {} sub-graphs from {} catalog relations",
            graphs.len(),
            catalog.len()
        );

        compile_partitions(
            &mut catalog,
            graphs.clone(),
            Arc::clone(&self.dialect),
            self.analyze,
            self.workers,
        )
        .await?;

        let partitions = graphs
            .iter()
            .enumerate()
            .map(|(index, graph)| partition_plan(index, graph, &catalog))
            .collect::<Result<Vec<_>>>()?;

        Ok(SamplePlan {
            dialect: self.dialect.name().to_string(),
            analyze: self.analyze,
            partitions,
        })
    }
}

fn partition_plan(index: usize, graph: &DependencyGraph, catalog: &Catalog) -> Result<PartitionPlan> {
    let mut relations = Vec::with_capacity(graph.node_count());
    let mut edges = Vec::with_capacity(graph.edge_count());

    for id in graph.topological_order()? {
        let relation = catalog.relation(id)?;
        let (Some(core_query), Some(compiled_query)) =
            (&relation.core_query, &relation.compiled_query)
        else {
            return Err(PlanError::NotCompiled {
                relation: relation.dot_notation(),
            });
        };
        relations.push(RelationPlan {
            relation: relation.dot_notation(),
            materialization: relation.materialization,
            unsampled: relation.unsampled,
            sample_method: relation.sample_method.clone(),
            core_query: core_query.clone(),
            compiled_query: compiled_query.clone(),
        });

        for (child, edge) in graph.successors(id) {
            edges.push(EdgePlan {
                parent: relation.dot_notation(),
                child: catalog.relation(child)?.dot_notation(),
                direction: edge.direction,
                remote_attribute: edge.remote_attribute.clone(),
                local_attribute: edge.local_attribute.clone(),
            });
        }
    }

    Ok(PartitionPlan {
        index,
        relations,
        edges,
    })
}
