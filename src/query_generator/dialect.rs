//! SQL dialect seam.
//!
//! The compiler only assembles strings; every dialect-specific fragment comes
//! from a [`SourceDialect`]. Implementations must be pure: the same inputs
//! always produce the same text, and nothing is executed.

use crate::catalog::{Relation, SampleMethod};

pub trait SourceDialect: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Case convention applied to unquoted identifiers
    fn correct_case(&self, identifier: &str) -> String {
        identifier.to_lowercase()
    }

    /// Statement that recreates a view in the target
    fn view_creation_statement(&self, relation: &Relation) -> String;

    /// Statement that selects every row of `relation`
    fn unsampled_statement(&self, relation: &Relation) -> String;

    /// `SELECT` over `relation`, sampled with `sample_method` when one is given
    fn sample_statement_from_relation(
        &self,
        relation: &Relation,
        sample_method: Option<&SampleMethod>,
    ) -> String;

    /// Predicate keeping rows whose `local_key` is among the values of
    /// `remote_key` in the sample of `relation` (the upstream side).
    fn predicate_constraint_statement(
        &self,
        relation: &Relation,
        analyze: bool,
        local_key: &str,
        remote_key: &str,
    ) -> String;

    /// Predicate keeping rows whose `subject_key` appears in `child_key` of
    /// the downstream `child`, constraining a parent by its children.
    fn upstream_constraint_statement(
        &self,
        child: &Relation,
        subject_key: &str,
        child_key: &str,
    ) -> String;

    /// Union branch selecting up to `max_number_of_outliers` rows of `subject`
    /// whose `subject_key` has no counterpart in `constraint.constraint_key`.
    fn union_constraint_statement(
        &self,
        subject: &Relation,
        constraint: &Relation,
        subject_key: &str,
        constraint_key: &str,
        max_number_of_outliers: usize,
    ) -> String;

    /// Re-applies sampling on top of a constrained statement; with no
    /// sample method the statement is returned unchanged.
    fn directionally_wrap_statement(
        &self,
        sql: &str,
        relation: &Relation,
        sample_method: Option<&SampleMethod>,
    ) -> String;

    /// Wraps a sampling statement so it reports sample size and population size
    fn analyze_wrap_statement(&self, sql: &str, relation: &Relation) -> String;
}
