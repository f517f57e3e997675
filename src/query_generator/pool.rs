//! Parallel compilation of independent sub-graphs.
//!
//! Sub-graphs share no edges, so each one is compiled on the blocking pool
//! against its own detached slice of the catalog. At most `workers`
//! sub-graphs compile at the same time.

use log::{debug, info};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::compiler::compile_graph;
use super::dialect::SourceDialect;
use super::errors::{QueryGeneratorError, Result};
use crate::catalog::{Catalog, RelationId};
use crate::dependency_graph::DependencyGraph;

/// Compiles every relation of every sub-graph in `graphs`.
///
/// Relations are moved out of `catalog` while their sub-graph compiles and
/// moved back afterwards, including when compilation fails. Returns the
/// number of relations compiled.
pub async fn compile_partitions(
    catalog: &mut Catalog,
    graphs: Vec<DependencyGraph>,
    dialect: Arc<dyn SourceDialect>,
    analyze: bool,
    workers: usize,
) -> Result<usize> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let partitions = graphs.len();
    let mut tasks = JoinSet::new();
    let mut compiled = 0;
    let mut first_error: Option<QueryGeneratorError> = None;

    for (index, graph) in graphs.into_iter().enumerate() {
        // Finished partitions go back into the catalog before the next one leaves
        while let Some(joined) = tasks.try_join_next() {
            reattach(catalog, joined, &mut compiled, &mut first_error);
        }
        let members: Vec<RelationId> = graph.nodes().collect();
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                first_error = Some(QueryGeneratorError::WorkerFailed {
                    message: e.to_string(),
                });
                break;
            }
        };
        let mut detached = match catalog.detach(&members) {
            Ok(detached) => detached,
            Err(e) => {
                first_error = Some(e.into());
                break;
            }
        };
        let dialect = Arc::clone(&dialect);

        tasks.spawn_blocking(move || {
            let _permit = permit;
            debug!(
                "Compiling partition {} ({} relations) with {} dialect",
                index,
                graph.node_count(),
                dialect.name()
            );
            let result = compile_graph(&graph, &mut detached, dialect.as_ref(), analyze);
            (detached, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        reattach(catalog, joined, &mut compiled, &mut first_error);
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    info!(
        "Compiled {} relations across {} partitions",
        compiled, partitions
    );
    Ok(compiled)
}

type PartitionOutcome = (Catalog, Result<usize>);

fn reattach(
    catalog: &mut Catalog,
    joined: std::result::Result<PartitionOutcome, tokio::task::JoinError>,
    compiled: &mut usize,
    first_error: &mut Option<QueryGeneratorError>,
) {
    match joined {
        Ok((detached, result)) => {
            if let Err(e) = catalog.attach(detached) {
                first_error.get_or_insert(e.into());
            }
            match result {
                Ok(count) => *compiled += count,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(e) => {
            first_error.get_or_insert(QueryGeneratorError::WorkerFailed {
                message: e.to_string(),
            });
        }
    }
}
