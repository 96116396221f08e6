//! Entity catalog keyed by name

use crate::model::Entity;
use crate::{Error, Result};
use indexmap::IndexMap;

/// Name-keyed map of entities, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: IndexMap<String, Entity>,
}

impl EntityCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            entities: IndexMap::new(),
        }
    }

    /// Build a catalog from a sequence of entities
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntity`] if two entities share a name.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self> {
        let mut catalog = Self::new();
        for entity in entities {
            catalog.insert(entity)?;
        }
        Ok(catalog)
    }

    /// Register an entity under its own name
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntity`] if the name is already taken.
    pub fn insert(&mut self, entity: Entity) -> Result<()> {
        if self.entities.contains_key(entity.name()) {
            return Err(Error::DuplicateEntity(entity.name().to_string()));
        }
        self.entities.insert(entity.name().to_string(), entity);
        Ok(())
    }

    /// Get an entity by name
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Check if an entity exists
    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Entity names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
