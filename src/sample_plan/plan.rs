//! Serializable result of a compile run.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::errors::{PlanError, Result};
use crate::catalog::{Materialization, SampleMethod};
use crate::config::OutputFormat;
use crate::dependency_graph::Direction;

/// Compiled statements of every included relation, grouped by sub-graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePlan {
    pub dialect: String,
    pub analyze: bool,
    pub partitions: Vec<PartitionPlan>,
}

/// One independent sub-graph. Relations are listed parents first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionPlan {
    pub index: usize,
    pub relations: Vec<RelationPlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgePlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationPlan {
    /// `database.schema.name`
    pub relation: String,
    pub materialization: Materialization,
    pub unsampled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_method: Option<SampleMethod>,
    pub core_query: String,
    pub compiled_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePlan {
    pub parent: String,
    pub child: String,
    pub direction: Direction,
    pub remote_attribute: String,
    pub local_attribute: String,
}

impl SamplePlan {
    pub fn relation_count(&self) -> usize {
        self.partitions.iter().map(|p| p.relations.len()).sum()
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationPlan> {
        self.partitions.iter().flat_map(|p| p.relations.iter())
    }

    /// Looks a relation up by its dot notation, ignoring case
    pub fn relation(&self, dot_notation: &str) -> Option<&RelationPlan> {
        self.relations()
            .find(|r| r.relation.eq_ignore_ascii_case(dot_notation))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlanError::Render {
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| PlanError::Render {
            message: e.to_string(),
        })
    }

    /// SQL script with one commented block per relation
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "-- {} relations in {} partitions ({} dialect{})",
            self.relation_count(),
            self.partitions.len(),
            self.dialect,
            if self.analyze { ", analyze" } else { "" }
        );
        for partition in &self.partitions {
            let _ = writeln!(out, "\n-- partition {}", partition.index);
            for edge in &partition.edges {
                let _ = writeln!(
                    out,
                    "--   {}.{} -> {}.{} ({})",
                    edge.parent, edge.remote_attribute, edge.child, edge.local_attribute, edge.direction
                );
            }
            for relation in &partition.relations {
                let how = match (&relation.materialization, relation.unsampled, &relation.sample_method) {
                    (Materialization::View, _, _) => "view".to_string(),
                    (_, true, _) => "unsampled".to_string(),
                    (_, false, Some(method)) => method.to_string(),
                    (_, false, None) => "sampled".to_string(),
                };
                let _ = writeln!(out, "-- {} [{}]", relation.relation, how);
                let _ = writeln!(out, "{};", relation.compiled_query.trim());
            }
        }
        out
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => self.to_json(),
        }
    }
}
