//! Multiple-inheritance resolution using C3 linearization

use crate::catalog::EntityCatalog;
use crate::model::Entity;
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Resolves ancestor order and effective definitions over one catalog.
///
/// The catalog is treated as immutable for the resolver's lifetime. Ancestor
/// orders are memoized per resolver; build a new resolver for a new catalog.
pub struct InheritanceResolver {
    catalog: EntityCatalog,
    ancestors: DashMap<String, Vec<String>>,
}

impl InheritanceResolver {
    /// Create a resolver owning the given catalog
    pub fn new(catalog: EntityCatalog) -> Self {
        Self {
            catalog,
            ancestors: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Get an entity definition as declared, without inheritance applied
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.catalog.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    /// Linearized ancestors of `name`, starting with `name` itself.
    ///
    /// A name the catalog does not define resolves to `[name]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] when the parent graph loops back on itself and
    /// [`Error::InconsistentPrecedence`] when parent orderings contradict each
    /// other.
    pub fn ancestors(&self, name: &str) -> Result<Vec<String>> {
        let mut visiting = Vec::new();
        self.linearize(name, &mut visiting)
    }

    fn linearize(&self, name: &str, visiting: &mut Vec<String>) -> Result<Vec<String>> {
        let Some(entity) = self.catalog.get(name) else {
            return Ok(vec![name.to_string()]);
        };

        if let Some(cached) = self.ancestors.get(name) {
            trace!("Ancestor cache hit for {}", name);
            return Ok(cached.clone());
        }

        if let Some(start) = visiting.iter().position(|n| n == name) {
            let mut path = visiting[start..].to_vec();
            path.push(name.to_string());
            return Err(Error::Cycle { path });
        }

        let linearization = if entity.has_parents() {
            visiting.push(name.to_string());
            let mut sequences: Vec<VecDeque<String>> =
                Vec::with_capacity(entity.parents().len() + 1);
            for parent in entity.parents() {
                sequences.push(self.linearize(parent, visiting)?.into());
            }
            visiting.pop();

            // Local precedence order takes part in the merge as its own sequence
            sequences.push(entity.parents().iter().cloned().collect());

            let mut result = vec![name.to_string()];
            result.extend(c3_merge(name, sequences)?);
            result
        } else {
            vec![name.to_string()]
        };

        trace!("Linearized {}: {:?}", name, linearization);
        self.ancestors
            .insert(name.to_string(), linearization.clone());
        Ok(linearization)
    }

    /// Fold `name` with all of its ancestors into one effective entity.
    ///
    /// Ancestors are merged in C3 order, so entities earlier in the order win
    /// header and section overrides while required names accumulate across the
    /// whole chain. A name the catalog does not define yields an empty entity.
    ///
    /// # Errors
    ///
    /// Propagates any graph error raised by [`InheritanceResolver::ancestors`].
    pub fn effective(&self, name: &str) -> Result<Entity> {
        let Some(entity) = self.catalog.get(name) else {
            debug!("Entity {} not in catalog, resolving as empty leaf", name);
            return Ok(Entity::placeholder(name));
        };

        let chain = self.ancestors(name)?;
        let mut effective = entity.clone();
        for ancestor in chain.iter().skip(1) {
            let placeholder;
            let parent = match self.catalog.get(ancestor) {
                Some(parent) => parent,
                None => {
                    placeholder = Entity::placeholder(ancestor);
                    &placeholder
                }
            };
            effective = effective.merge_with_parent(parent);
        }

        debug!(
            "Resolved effective entity {} through {} ancestor(s)",
            name,
            chain.len() - 1
        );
        Ok(effective)
    }

    /// Linearize every entity in the catalog and collect all graph errors
    /// instead of stopping at the first one.
    pub fn validate_inheritance(&self) -> Vec<Error> {
        self.catalog
            .names()
            .filter_map(|name| self.ancestors(name).err())
            .collect()
    }
}

/// Classic C3 merge: repeatedly take the first head that appears in no other
/// sequence's tail.
fn c3_merge(entity: &str, mut sequences: Vec<VecDeque<String>>) -> Result<Vec<String>> {
    let mut merged = Vec::new();

    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(merged);
        }

        let candidate = sequences
            .iter()
            .filter_map(VecDeque::front)
            .find(|head| {
                !sequences
                    .iter()
                    .any(|seq| seq.iter().skip(1).any(|n| n == *head))
            })
            .cloned();

        let Some(next) = candidate else {
            return Err(Error::InconsistentPrecedence {
                entity: entity.to_string(),
                pending: sequences.into_iter().map(Vec::from).collect(),
            });
        };

        for seq in &mut sequences {
            if seq.front() == Some(&next) {
                seq.pop_front();
            }
        }
        merged.push(next);
    }
}
