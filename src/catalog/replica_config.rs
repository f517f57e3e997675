use super::errors::{CatalogError, Result};
use super::pattern::Pattern;
use super::relation::DEFAULT_MAX_NUMBER_OF_OUTLIERS;
use super::sample_method::SampleMethod;
use crate::dependency_graph::Direction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Replica configuration management.
///
/// Replica configurations are written in YAML and say which relations of the
/// source catalog are sampled and how they relate to each other:
///
/// ```yaml
/// sampling:                      # Default sample method for every relation
///   bernoulli:
///     value: 10
///     units: probability
/// include_outliers: false        # Add outlier union branches
/// max_number_of_outliers: 100    # Cap per outlier branch
/// general_relations:             # Default sampling pattern tree
///   databases:
///     - pattern: DEV
///       schemas:
///         - pattern: SOURCE_SYSTEM
///           relations: ['.*']
/// specified_relations:           # Relations with explicit behaviour
///   - database: DEV
///     schema: SOURCE_SYSTEM
///     relation: ORDER_ITEMS
///     unsampled: true            # Copy the whole relation
///   - database: DEV
///     schema: SOURCE_SYSTEM
///     relation: USER_COOKIES
///     relationships:
///       bidirectional:
///         - database: ''         # Empty: same database as USER_COOKIES
///           schema: ''
///           relation: USERS
///           local_attribute: USER_ID
///           remote_attribute: ID
///       directional: []
/// ```
///
/// Every pattern is a regular expression matched against the full identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Sample method assigned to every included relation
    #[serde(default)]
    pub sampling: SampleMethod,
    /// Whether relations pull in rows outside their join constraints
    #[serde(default)]
    pub include_outliers: bool,
    /// Upper bound on rows added by each outlier union branch
    #[serde(default = "default_max_number_of_outliers")]
    pub max_number_of_outliers: usize,
    /// Pattern tree of relations sampled with default settings
    #[serde(default, alias = "default_sampling")]
    pub general_relations: DefaultSampling,
    /// Relations with explicit settings and relationships
    #[serde(default)]
    pub specified_relations: Vec<SpecifiedRelation>,
}

fn default_max_number_of_outliers() -> usize {
    DEFAULT_MAX_NUMBER_OF_OUTLIERS
}

/// Default sampling pattern tree: databases → schemas → relations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultSampling {
    #[serde(default)]
    pub databases: Vec<DatabasePattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasePattern {
    pub pattern: String,
    #[serde(default)]
    pub schemas: Vec<SchemaPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaPattern {
    pub pattern: String,
    /// Relation name patterns
    #[serde(default)]
    pub relations: Vec<String>,
}

/// A relation with explicit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecifiedRelation {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub schema: String,
    /// Relation name pattern
    pub relation: String,
    /// Copy every row; relationships are ignored
    #[serde(default)]
    pub unsampled: bool,
    #[serde(default)]
    pub relationships: Relationships,
}

/// Relationship specs of a specified relation, grouped by declared direction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub bidirectional: Vec<RelationshipSpec>,
    #[serde(default)]
    pub directional: Vec<RelationshipSpec>,
}

/// One declared dependency on another relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipSpec {
    /// Database pattern; empty inherits the declaring relation's database
    #[serde(default)]
    pub database: String,
    /// Schema pattern; empty inherits the declaring relation's schema
    #[serde(default)]
    pub schema: String,
    pub relation: String,
    /// Column of the declaring (downstream) relation
    pub local_attribute: String,
    /// Column of the referenced (upstream) relation
    pub remote_attribute: String,
}

impl Configuration {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| CatalogError::ConfigParseError {
                error: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            CatalogError::InvalidConfig { message } => {
                CatalogError::config_error_with_context(path.display().to_string(), message)
            }
            other => other,
        })
    }

    pub fn default_sample_method(&self) -> &SampleMethod {
        &self.sampling
    }

    /// Every pattern that admits a relation into the sample: the leaves of
    /// the default sampling tree followed by the specified relations.
    pub fn sum_patterns(&self) -> Vec<Pattern> {
        let defaults = self.general_relations.databases.iter().flat_map(|d| {
            d.schemas.iter().flat_map(move |s| {
                s.relations
                    .iter()
                    .map(move |r| Pattern::new(d.pattern.clone(), s.pattern.clone(), r.clone()))
            })
        });
        let specified = self.specified_relations.iter().map(SpecifiedRelation::pattern);
        defaults.chain(specified).collect()
    }

    /// Structural validation; patterns must compile and names must be present
    pub fn validate(&self) -> Result<()> {
        self.sampling
            .validate()
            .map_err(|message| CatalogError::InvalidConfig { message })?;

        for pattern in self.sum_patterns() {
            pattern.compile()?;
        }

        for (i, specified) in self.specified_relations.iter().enumerate() {
            if specified.relation.trim().is_empty() {
                return Err(CatalogError::InvalidConfig {
                    message: format!("specified_relations[{}] has an empty relation pattern", i),
                });
            }
            for (direction, spec) in specified.relationships.iter() {
                if spec.relation.trim().is_empty() {
                    return Err(CatalogError::InvalidConfig {
                        message: format!(
                            "{} relationship of `{}` has an empty relation pattern",
                            direction,
                            specified.pattern()
                        ),
                    });
                }
                if spec.local_attribute.trim().is_empty() || spec.remote_attribute.trim().is_empty()
                {
                    return Err(CatalogError::InvalidConfig {
                        message: format!(
                            "{} relationship `{}` of `{}` must name both local_attribute and remote_attribute",
                            direction,
                            spec.pattern(),
                            specified.pattern()
                        ),
                    });
                }
                spec.pattern().compile()?;
            }
        }
        Ok(())
    }
}

impl SpecifiedRelation {
    pub fn pattern(&self) -> Pattern {
        Pattern::new(
            self.database.clone(),
            self.schema.clone(),
            self.relation.clone(),
        )
    }
}

impl Relationships {
    /// Bidirectional specs first, then directional ones
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &RelationshipSpec)> {
        self.bidirectional
            .iter()
            .map(|s| (Direction::Bidirectional, s))
            .chain(self.directional.iter().map(|s| (Direction::Directional, s)))
    }

    pub fn is_empty(&self) -> bool {
        self.bidirectional.is_empty() && self.directional.is_empty()
    }
}

impl RelationshipSpec {
    pub fn pattern(&self) -> Pattern {
        Pattern::new(
            self.database.clone(),
            self.schema.clone(),
            self.relation.clone(),
        )
    }
}
