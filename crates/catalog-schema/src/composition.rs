//! Composition of several effective entities into one attributed name set

use crate::inheritance::InheritanceResolver;
use crate::model::NameSet;
use crate::names::push_unique;
use crate::{Namespace, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Required/optional names of one namespace plus the targets that contributed
/// each name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedNames {
    required: NameSet,
    optional: NameSet,
    sources: IndexMap<String, Vec<String>>,
}

impl ResolvedNames {
    pub fn required(&self) -> &NameSet {
        &self.required
    }

    /// Optional names, excluding anything any contributor required
    pub fn optional(&self) -> &NameSet {
        &self.optional
    }

    /// Required names followed by optional names
    pub fn all(&self) -> NameSet {
        self.required
            .iter()
            .chain(self.optional.iter())
            .cloned()
            .collect()
    }

    /// Targets that contributed `name`, in input order; empty if unknown
    pub fn sources(&self, name: &str) -> &[String] {
        self.sources.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether more than one target contributed `name`
    pub fn is_shared(&self, name: &str) -> bool {
        self.sources(name).len() > 1
    }

    /// The full name → contributing targets map
    pub fn attributions(&self) -> &IndexMap<String, Vec<String>> {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    fn absorb(&mut self, target: &str, required: &NameSet, optional: &NameSet) {
        for name in required {
            self.required.insert(name.clone());
            self.attribute(name, target);
        }
        for name in optional {
            if !self.required.contains(name) {
                self.optional.insert(name.clone());
            }
            self.attribute(name, target);
        }
    }

    fn attribute(&mut self, name: &str, target: &str) {
        let sources = self.sources.entry(name.to_string()).or_default();
        push_unique(sources, target);
    }

    /// Drop optional names that some contributor required
    fn promote(&mut self) {
        self.optional.retain(|name| !self.required.contains(name));
    }
}

/// Immutable result of composing several target entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSet {
    input_names: Vec<String>,
    fields: ResolvedNames,
    sub_entities: ResolvedNames,
}

impl ResolvedSet {
    /// Target names in the order they were requested
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Resolved names of one namespace
    pub fn names(&self, namespace: Namespace) -> &ResolvedNames {
        match namespace {
            Namespace::Fields => &self.fields,
            Namespace::SubEntities => &self.sub_entities,
        }
    }

    pub fn required_fields(&self) -> &NameSet {
        self.fields.required()
    }

    pub fn optional_fields(&self) -> &NameSet {
        self.fields.optional()
    }

    pub fn all_fields(&self) -> NameSet {
        self.fields.all()
    }

    pub fn field_sources(&self, name: &str) -> &[String] {
        self.fields.sources(name)
    }

    pub fn is_shared_field(&self, name: &str) -> bool {
        self.fields.is_shared(name)
    }

    pub fn required_sub_entities(&self) -> &NameSet {
        self.sub_entities.required()
    }

    pub fn optional_sub_entities(&self) -> &NameSet {
        self.sub_entities.optional()
    }

    pub fn all_sub_entities(&self) -> NameSet {
        self.sub_entities.all()
    }

    pub fn sub_entity_sources(&self, name: &str) -> &[String] {
        self.sub_entities.sources(name)
    }

    pub fn is_shared_sub_entity(&self, name: &str) -> bool {
        self.sub_entities.is_shared(name)
    }

    /// Whether no target contributed any field or sub-entity
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.sub_entities.is_empty()
    }
}

/// Composes the effective definitions of several targets
pub struct MultiEntityResolver<'a> {
    inheritance: &'a InheritanceResolver,
}

impl<'a> MultiEntityResolver<'a> {
    pub fn new(inheritance: &'a InheritanceResolver) -> Self {
        Self { inheritance }
    }

    /// Resolve each target independently and fold the results.
    ///
    /// Input order only affects the order of targets inside each attribution
    /// list. A name required by any target is never reported as optional.
    ///
    /// # Errors
    ///
    /// Propagates the first graph error hit while resolving a target.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolvedSet> {
        let mut resolved = ResolvedSet {
            input_names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            ..ResolvedSet::default()
        };

        for name in names {
            let name = name.as_ref();
            let effective = self.inheritance.effective(name)?;
            resolved.fields.absorb(
                name,
                effective.required_fields(),
                effective.optional_fields(),
            );
            resolved.sub_entities.absorb(
                name,
                effective.required_sub_entities(),
                effective.optional_sub_entities(),
            );
        }

        resolved.fields.promote();
        resolved.sub_entities.promote();

        debug!(
            "Resolved {} target(s) into {} required and {} optional field(s)",
            resolved.input_names.len(),
            resolved.fields.required.len(),
            resolved.fields.optional.len()
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityCatalog;
    use crate::model::Entity;

    fn resolver(entities: Vec<Entity>) -> InheritanceResolver {
        InheritanceResolver::new(EntityCatalog::from_entities(entities).unwrap())
    }

    fn names(set: &NameSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_absorb_attributes_optional_even_when_required() {
        let mut resolved = ResolvedNames::default();
        let required: NameSet = ["A".to_string()].into_iter().collect();
        let optional: NameSet = ["B".to_string()].into_iter().collect();
        resolved.absorb("First", &required, &optional);

        let later_optional: NameSet = ["A".to_string(), "B".to_string()].into_iter().collect();
        resolved.absorb("Second", &NameSet::new(), &later_optional);

        assert_eq!(names(resolved.required()), vec!["A"]);
        assert_eq!(names(resolved.optional()), vec!["B"]);
        assert_eq!(resolved.sources("A"), ["First", "Second"]);
        assert!(resolved.is_shared("B"));
    }

    #[test]
    fn test_promotion_removes_late_required() {
        let mut resolved = ResolvedNames::default();
        let optional: NameSet = ["Shared".to_string()].into_iter().collect();
        let required = optional.clone();
        resolved.absorb("P1", &NameSet::new(), &optional);
        resolved.absorb("P2", &required, &NameSet::new());
        assert!(resolved.optional().contains("Shared"));

        resolved.promote();

        assert!(resolved.required().contains("Shared"));
        assert!(resolved.optional().is_empty());
    }

    #[test]
    fn test_resolve_composes_sub_entities_independently() {
        let resolver = resolver(vec![
            Entity::builder("Paper")
                .required_fields(["Title"])
                .optional_sub_entities(["Author"])
                .build()
                .unwrap(),
            Entity::builder("Book")
                .optional_fields(["Title"])
                .required_sub_entities(["Author"])
                .build()
                .unwrap(),
        ]);

        let resolved = MultiEntityResolver::new(&resolver)
            .resolve(&["Paper", "Book"])
            .unwrap();

        assert_eq!(names(resolved.required_fields()), vec!["Title"]);
        assert!(resolved.optional_fields().is_empty());
        assert_eq!(names(resolved.required_sub_entities()), vec!["Author"]);
        assert!(resolved.optional_sub_entities().is_empty());
        assert_eq!(resolved.sub_entity_sources("Author"), ["Paper", "Book"]);
        assert!(resolved.is_shared_sub_entity("Author"));
    }

    #[test]
    fn test_repeated_target_is_attributed_once() {
        let resolver = resolver(vec![
            Entity::builder("X").required_fields(["Id"]).build().unwrap(),
        ]);

        let resolved = MultiEntityResolver::new(&resolver)
            .resolve(&["X", "X"])
            .unwrap();

        assert_eq!(resolved.input_names(), ["X", "X"]);
        assert_eq!(resolved.field_sources("Id"), ["X"]);
        assert!(!resolved.is_shared_field("Id"));
    }

    #[test]
    fn test_all_fields_lists_required_first() {
        let resolver = resolver(vec![
            Entity::builder("X")
                .optional_fields(["Notes"])
                .required_fields(["Id"])
                .build()
                .unwrap(),
        ]);

        let resolved = MultiEntityResolver::new(&resolver).resolve(&["X"]).unwrap();
        assert_eq!(names(&resolved.all_fields()), vec!["Id", "Notes"]);
    }

    #[test]
    fn test_unknown_lookup_has_no_sources() {
        let resolved = ResolvedSet::default();
        assert!(resolved.field_sources("Nothing").is_empty());
        assert!(!resolved.is_shared_field("Nothing"));
        assert!(resolved.is_empty());
    }
}
