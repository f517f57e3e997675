//! Relation arena.
//!
//! Every relation of a run lives in one [`Catalog`] and is addressed by a
//! [`RelationId`]. Graphs only hold ids; the graph builder and the query
//! compiler mutate relations through the catalog, never through copies.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use super::errors::{CatalogError, Result};
use super::relation::{Relation, RelationKey};

/// Stable handle of a relation inside a [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId(usize);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// On-disk shape of a catalog snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub relations: Vec<Relation>,
}

/// Arena of relations keyed by identity.
///
/// Relations can be temporarily detached into a sub-catalog (see
/// [`Catalog::detach`]) so disjoint groups can be mutated on different threads
/// and merged back afterwards with their ids unchanged. A sub-catalog only
/// stores its own members.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    slots: BTreeMap<RelationId, Relation>,
    index: HashMap<RelationKey, RelationId>,
    /// Ids below this bound have been handed out by this catalog or its parent
    next_id: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog, rejecting duplicate identities
    pub fn from_relations(relations: impl IntoIterator<Item = Relation>) -> Result<Self> {
        let mut catalog = Self::new();
        for relation in relations {
            catalog.insert(relation)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, relation: Relation) -> Result<RelationId> {
        let key = relation.key();
        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicateRelation {
                relation: key.to_string(),
            });
        }
        let id = RelationId(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, relation);
        self.index.insert(key, id);
        Ok(id)
    }

    pub fn get(&self, id: RelationId) -> Option<&Relation> {
        self.slots.get(&id)
    }

    pub fn relation(&self, id: RelationId) -> Result<&Relation> {
        self.get(id)
            .ok_or(CatalogError::UnknownRelationId { id: id.0 })
    }

    pub fn relation_mut(&mut self, id: RelationId) -> Result<&mut Relation> {
        self.slots
            .get_mut(&id)
            .ok_or(CatalogError::UnknownRelationId { id: id.0 })
    }

    pub fn id_of(&self, key: &RelationKey) -> Option<RelationId> {
        self.index.get(key).copied()
    }

    /// Present relations in id order
    pub fn iter(&self) -> impl Iterator<Item = (RelationId, &Relation)> {
        self.slots.iter().map(|(id, rel)| (*id, rel))
    }

    pub fn ids(&self) -> impl Iterator<Item = RelationId> + '_ {
        self.slots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewrites identifiers with a dialect's case convention.
    ///
    /// Fails if two relations collapse onto the same identity.
    pub fn normalize_case(&mut self, correct_case: impl Fn(&str) -> String) -> Result<()> {
        let mut index = HashMap::with_capacity(self.index.len());
        for (id, relation) in self.slots.iter_mut() {
            relation.database = correct_case(&relation.database);
            relation.schema = correct_case(&relation.schema);
            relation.name = correct_case(&relation.name);
            for attribute in relation.attributes.iter_mut() {
                attribute.name = correct_case(&attribute.name);
            }
            let key = relation.key();
            if index.insert(key.clone(), *id).is_some() {
                return Err(CatalogError::DuplicateRelation {
                    relation: key.to_string(),
                });
            }
        }
        self.index = index;
        Ok(())
    }

    /// Moves the given relations into a new catalog that keeps their ids.
    ///
    /// On an unknown id, relations already moved are put back.
    pub fn detach(&mut self, ids: &[RelationId]) -> Result<Catalog> {
        let mut detached = Catalog {
            slots: BTreeMap::new(),
            index: HashMap::with_capacity(ids.len()),
            next_id: self.next_id,
        };
        for &id in ids {
            let Some(relation) = self.slots.remove(&id) else {
                self.attach(detached)?;
                return Err(CatalogError::UnknownRelationId { id: id.0 });
            };
            detached.index.insert(relation.key(), id);
            detached.slots.insert(id, relation);
        }
        Ok(detached)
    }

    /// Moves every relation of a detached catalog back under its id.
    pub fn attach(&mut self, other: Catalog) -> Result<()> {
        for (id, relation) in other.slots {
            if id.0 >= self.next_id || self.slots.contains_key(&id) {
                return Err(CatalogError::UnknownRelationId { id: id.0 });
            }
            self.slots.insert(id, relation);
        }
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot =
            serde_yaml::from_str(content).map_err(|e| CatalogError::ConfigParseError {
                error: e.to_string(),
            })?;
        Self::from_relations(snapshot.relations)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(content).map_err(|e| CatalogError::ConfigParseError {
                error: e.to_string(),
            })?;
        Self::from_relations(snapshot.relations)
    }

    /// Loads a catalog snapshot; `.json` files are read as JSON, anything else as YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
                error: format!("{}: {}", path.display(), e),
            })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        debug!(
            "Loaded {} relations from catalog snapshot {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }
}
