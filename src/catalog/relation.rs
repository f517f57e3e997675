//! The relation model: one table or view in the source catalog together with
//! the sampling state the graph builder and query compiler fill in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::sample_method::SampleMethod;

/// Default cap on outlier rows pulled in by a single union branch
pub const DEFAULT_MAX_NUMBER_OF_OUTLIERS: usize = 100;

/// How a relation is materialized in the source database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Materialization {
    #[default]
    Table,
    View,
}

/// Column data types understood by the sampling core
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Bigint,
    Integer,
    Smallint,
    Decimal,
    Numeric,
    Float,
    Boolean,
    Char,
    Varchar,
    Date,
    Time,
    TimestampNtz,
    TimestampTz,
    Json,
    Array,
    Binary,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Bigint
                | DataType::Integer
                | DataType::Smallint
                | DataType::Decimal
                | DataType::Numeric
                | DataType::Float
        )
    }
}

/// A typed column of a relation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Identity of a relation: (database, schema, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationKey {
    pub database: String,
    pub schema: String,
    pub name: String,
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.name)
    }
}

/// One table or view of the source catalog.
///
/// Equality and hashing only consider the identity key, so two snapshots of
/// the same relation with different sampling state compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub database: String,
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub materialization: Materialization,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Take the whole relation instead of a sample
    #[serde(default)]
    pub unsampled: bool,
    #[serde(default)]
    pub include_outliers: bool,
    #[serde(default = "default_max_number_of_outliers")]
    pub max_number_of_outliers: usize,
    #[serde(default)]
    pub sample_method: Option<SampleMethod>,
    /// Sampling statement before any analyze wrapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_query: Option<String>,
    /// Final statement handed to the execution layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_query: Option<String>,
}

fn default_max_number_of_outliers() -> usize {
    DEFAULT_MAX_NUMBER_OF_OUTLIERS
}

impl Relation {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        materialization: Materialization,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
            materialization,
            attributes,
            unsampled: false,
            include_outliers: false,
            max_number_of_outliers: DEFAULT_MAX_NUMBER_OF_OUTLIERS,
            sample_method: None,
            core_query: None,
            compiled_query: None,
        }
    }

    pub fn key(&self) -> RelationKey {
        RelationKey {
            database: self.database.clone(),
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is_view(&self) -> bool {
        self.materialization == Materialization::View
    }

    /// `database.schema.name`, unquoted
    pub fn dot_notation(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.name)
    }

    /// A CTE name unique to this relation, so statements for several
    /// relations can be nested without their CTE names colliding.
    pub fn scoped_cte(&self, prefix: &str) -> String {
        let scope: String = format!("{}_{}_{}", self.database, self.schema, self.name)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{}", prefix, scope)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Drops compiled statements so the relation can be compiled again
    pub fn clear_queries(&mut self) {
        self.core_query = None;
        self.compiled_query = None;
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.database == other.database && self.schema == other.schema && self.name == other.name
    }
}

impl Eq for Relation {}

impl Hash for Relation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.database.hash(state);
        self.schema.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dot_notation())
    }
}
