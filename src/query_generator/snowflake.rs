//! Snowflake flavoured implementation of [`SourceDialect`].

use super::dialect::SourceDialect;
use crate::catalog::{Relation, SampleMethod, SampleUnits};

const FINAL_SAMPLE_CTE: &str = "SAMPLEGRAPH_FINAL_SAMPLE";
const DIRECTIONAL_SAMPLE_CTE: &str = "SAMPLEGRAPH_DIRECTIONAL_SAMPLE";
const COUNT_POPULATION_CTE: &str = "SAMPLEGRAPH_COUNT_POPULATION";
const CORE_SAMPLE_CTE: &str = "SAMPLEGRAPH_CORE_SAMPLE";
const CORE_SAMPLE_COUNT_CTE: &str = "SAMPLEGRAPH_CORE_SAMPLE_COUNT";

#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeDialect;

impl SnowflakeDialect {
    pub fn new() -> Self {
        Self
    }

    /// Quotes identifiers that contain whitespace
    pub fn quoted(&self, identifier: &str) -> String {
        if identifier.chars().any(char::is_whitespace) {
            format!("\"{}\"", identifier.replace('"', "\"\""))
        } else {
            identifier.to_string()
        }
    }

    pub fn quoted_dot_notation(&self, relation: &Relation) -> String {
        [&relation.database, &relation.schema, &relation.name]
            .iter()
            .map(|part| self.quoted(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn sample_method_to_sql(&self, sample_method: &SampleMethod) -> String {
        match sample_method {
            SampleMethod::Bernoulli {
                value,
                units: SampleUnits::Probability,
            } => format!("SAMPLE BERNOULLI ({})", format_number(*value)),
            SampleMethod::Bernoulli {
                value,
                units: SampleUnits::Rows,
            } => format!("SAMPLE BERNOULLI ({} ROWS)", format_number(*value)),
        }
    }

    /// Subquery text standing for the sampled rows of an upstream relation.
    ///
    /// Uses the relation's compiled sample when it has one, its bare sample
    /// statement otherwise.
    fn sampled_source(&self, relation: &Relation, analyze: bool) -> String {
        let compiled = if analyze {
            relation.core_query.as_deref()
        } else {
            relation
                .compiled_query
                .as_deref()
                .or(relation.core_query.as_deref())
        };
        match compiled {
            Some(sql) => sql.to_string(),
            None => self.sample_statement_from_relation(relation, relation.sample_method.as_ref()),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl SourceDialect for SnowflakeDialect {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn correct_case(&self, identifier: &str) -> String {
        identifier.to_uppercase()
    }

    fn view_creation_statement(&self, relation: &Relation) -> String {
        format!(
            "SELECT GET_DDL('view', '{}')",
            self.quoted_dot_notation(relation).replace('\'', "''")
        )
    }

    fn unsampled_statement(&self, relation: &Relation) -> String {
        format!(
            "\nSELECT\n    *\nFROM\n    {}\n",
            self.quoted_dot_notation(relation)
        )
    }

    fn sample_statement_from_relation(
        &self,
        relation: &Relation,
        sample_method: Option<&SampleMethod>,
    ) -> String {
        let mut sql = format!(
            "\nSELECT\n    *\nFROM \n    {}\n",
            self.quoted_dot_notation(relation)
        );
        if let Some(method) = sample_method {
            sql.push_str(&format!("    {}\n", self.sample_method_to_sql(method)));
        }
        sql
    }

    fn predicate_constraint_statement(
        &self,
        relation: &Relation,
        analyze: bool,
        local_key: &str,
        remote_key: &str,
    ) -> String {
        format!(
            "\n{local} IN \n    ( SELECT  \n        {remote}\n      AS {local}\n    FROM ({source}))\n",
            local = local_key,
            remote = remote_key,
            source = self.sampled_source(relation, analyze)
        )
    }

    fn upstream_constraint_statement(
        &self,
        child: &Relation,
        subject_key: &str,
        child_key: &str,
    ) -> String {
        format!(
            " {} IN (SELECT {} FROM {})",
            subject_key,
            child_key,
            self.quoted_dot_notation(child)
        )
    }

    fn union_constraint_statement(
        &self,
        subject: &Relation,
        constraint: &Relation,
        subject_key: &str,
        constraint_key: &str,
        max_number_of_outliers: usize,
    ) -> String {
        format!(
            "\n(SELECT\n    *\nFROM\n{subject}\nWHERE\n    {subject_key}\nNOT IN\n(SELECT\n    {constraint_key}\nFROM\n{constraint})\nLIMIT {max})\n",
            subject = self.quoted_dot_notation(subject),
            subject_key = subject_key,
            constraint_key = constraint_key,
            constraint = self.quoted_dot_notation(constraint),
            max = max_number_of_outliers
        )
    }

    fn directionally_wrap_statement(
        &self,
        sql: &str,
        relation: &Relation,
        sample_method: Option<&SampleMethod>,
    ) -> String {
        let Some(method) = sample_method else {
            return sql.to_string();
        };
        let final_sample = relation.scoped_cte(FINAL_SAMPLE_CTE);
        let directional_sample = relation.scoped_cte(DIRECTIONAL_SAMPLE_CTE);
        format!(
            "\nWITH\n    {final_sample} AS (\n{sql}\n)\n,{directional_sample} AS (\nSELECT\n    *\nFROM\n    {final_sample}\n{sample}\n)\nSELECT \n    *\nFROM \n    {directional_sample}\n",
            final_sample = final_sample,
            directional_sample = directional_sample,
            sql = sql,
            sample = self.sample_method_to_sql(method)
        )
    }

    fn analyze_wrap_statement(&self, sql: &str, relation: &Relation) -> String {
        let population = relation.scoped_cte(COUNT_POPULATION_CTE);
        let core = relation.scoped_cte(CORE_SAMPLE_CTE);
        let core_count = relation.scoped_cte(CORE_SAMPLE_COUNT_CTE);
        format!(
            "\nWITH\n    {population} AS (\nSELECT\n    COUNT(*) AS population_size\nFROM\n    {relation}\n)\n,{core} AS (\n{sql}\n)\n,{core_count} AS (\nSELECT\n    COUNT(*) AS sample_size\nFROM\n    {core}\n)\nSELECT\n    s.sample_size AS sample_size\n    ,p.population_size AS population_size\nFROM\n    {core_count} s\nINNER JOIN\n    {population} p\nON\n    1=1\nLIMIT 1\n",
            population = population,
            relation = self.quoted_dot_notation(relation),
            core = core,
            sql = sql,
            core_count = core_count
        )
    }
}
