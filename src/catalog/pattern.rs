//! Relation pattern matching.
//!
//! A [`Pattern`] names relations by `(database, schema, name)`. Each part is a
//! regular expression matched against the whole identifier, case-insensitively,
//! so a literal such as `USERS` matches `users` and `.*` matches anything. An
//! empty part places no constraint on that part.
//!
//! Two contracts are exposed and must not be mixed up:
//!
//! - [`matches_any`] filters the catalog: a relation is kept when at least one
//!   pattern matches it.
//! - [`matches_exactly_one`] resolves a single named relation (an edge endpoint)
//!   and fails when the pattern matches zero or several relations.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{CatalogError, Result};
use super::relation::Relation;

/// A `(database, schema, name)` pattern triple
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Pattern {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub name: String,
}

impl Pattern {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Fills empty database/schema parts from `relation`.
    ///
    /// Edge targets written as `database: ''` mean "the same database as the
    /// relation declaring the edge".
    pub fn inherit_scope(&self, relation: &Relation) -> Pattern {
        Pattern {
            database: if self.database.is_empty() {
                regex::escape(&relation.database)
            } else {
                self.database.clone()
            },
            schema: if self.schema.is_empty() {
                regex::escape(&relation.schema)
            } else {
                self.schema.clone()
            },
            name: self.name.clone(),
        }
    }

    pub fn compile(&self) -> Result<CompiledPattern> {
        Ok(CompiledPattern {
            database: compile_part(&self.database, self)?,
            schema: compile_part(&self.schema, self)?,
            name: compile_part(&self.name, self)?,
            source: self.clone(),
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |part: &str| if part.is_empty() { "*".to_string() } else { part.to_string() };
        write!(
            f,
            "{}.{}.{}",
            show(&self.database),
            show(&self.schema),
            show(&self.name)
        )
    }
}

fn compile_part(part: &str, pattern: &Pattern) -> Result<Option<Regex>> {
    if part.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&format!("^(?:{})$", part))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| CatalogError::InvalidPattern {
            pattern: pattern.to_string(),
            error: e.to_string(),
        })
}

/// A [`Pattern`] with its parts compiled, ready for matching
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: Pattern,
    database: Option<Regex>,
    schema: Option<Regex>,
    name: Option<Regex>,
}

impl CompiledPattern {
    pub fn pattern(&self) -> &Pattern {
        &self.source
    }

    /// True when all three parts match the relation
    pub fn matches(&self, relation: &Relation) -> bool {
        part_matches(&self.database, &relation.database)
            && part_matches(&self.schema, &relation.schema)
            && part_matches(&self.name, &relation.name)
    }
}

fn part_matches(part: &Option<Regex>, value: &str) -> bool {
    part.as_ref().map_or(true, |re| re.is_match(value))
}

/// Catalog-wide filter: at least one pattern matches
pub fn matches_any(relation: &Relation, patterns: &[CompiledPattern]) -> bool {
    patterns.iter().any(|p| p.matches(relation))
}

/// Resolves `pattern` to exactly one of `candidates`.
///
/// Candidates are `(handle, relation)` pairs; the handle of the single match is
/// returned. Zero matches and multiple matches are both errors naming the pattern.
pub fn matches_exactly_one<'a, T>(
    pattern: &CompiledPattern,
    candidates: impl IntoIterator<Item = (T, &'a Relation)>,
) -> Result<T> {
    let mut found: Vec<(T, &'a Relation)> = candidates
        .into_iter()
        .filter(|(_, rel)| pattern.matches(rel))
        .collect();

    match found.len() {
        0 => Err(CatalogError::NoMatchingRelation {
            pattern: pattern.pattern().to_string(),
        }),
        1 => Ok(found.remove(0).0),
        count => Err(CatalogError::AmbiguousPattern {
            pattern: pattern.pattern().to_string(),
            count,
            matches: found
                .iter()
                .map(|(_, rel)| rel.dot_notation())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
