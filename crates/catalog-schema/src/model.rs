//! Schema entity model definitions

use crate::names::{intersection, normalize_list, normalize_name, normalize_set};
use crate::{Error, Namespace, Result};
use indexmap::IndexSet;
use serde::Serialize;

/// Insertion-ordered set of field or sub-entity names
pub type NameSet = IndexSet<String>;

/// A named group of fields inside a display or form configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Section {
    pub name: String,
    pub fields: Vec<String>,
}

impl Section {
    /// Create a section, normalizing its name and field list
    pub fn new<I, S>(name: impl AsRef<str>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.as_ref().trim().to_string(),
            fields: normalize_list(fields),
        }
    }
}

/// Header plus ordered sections, used for both display and form layout
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SectionConfig {
    pub header: Vec<String>,
    pub sections: Vec<Section>,
}

impl SectionConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header field list
    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.header = normalize_list(header);
        self
    }

    /// Append a section
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Whether neither a header nor any section is configured
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.sections.is_empty()
    }

    /// Find a section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Every field name referenced by the header or any section
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.fields.iter()))
            .map(String::as_str)
    }

    /// Combine `self` (child) with `parent`.
    ///
    /// A non-empty child header replaces the parent's. Sections are matched by
    /// name: a child section replaces the parent's section of the same name in
    /// place, new child sections are appended after the parent's.
    pub fn merge_with_parent(&self, parent: &SectionConfig) -> SectionConfig {
        let header = if self.header.is_empty() {
            parent.header.clone()
        } else {
            self.header.clone()
        };

        let mut sections = parent.sections.clone();
        for child_section in &self.sections {
            match sections.iter_mut().find(|s| s.name == child_section.name) {
                Some(slot) => *slot = child_section.clone(),
                None => sections.push(child_section.clone()),
            }
        }

        SectionConfig { header, sections }
    }
}

/// An immutable, validated schema entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    name: String,
    parents: Vec<String>,
    label: String,
    description: String,
    target_namespace: Option<String>,
    required_fields: NameSet,
    optional_fields: NameSet,
    required_sub_entities: NameSet,
    optional_sub_entities: NameSet,
    display: SectionConfig,
    form: SectionConfig,
}

impl Entity {
    /// Start building an entity with the given name
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(name)
    }

    /// An empty leaf standing in for a name the catalog does not define.
    /// The name is used as given.
    pub(crate) fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parents: Vec::new(),
            label: name.to_string(),
            description: String::new(),
            target_namespace: None,
            required_fields: NameSet::new(),
            optional_fields: NameSet::new(),
            required_sub_entities: NameSet::new(),
            optional_sub_entities: NameSet::new(),
            display: SectionConfig::default(),
            form: SectionConfig::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct parents in declaration (local precedence) order
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    pub fn required_fields(&self) -> &NameSet {
        &self.required_fields
    }

    pub fn optional_fields(&self) -> &NameSet {
        &self.optional_fields
    }

    pub fn required_sub_entities(&self) -> &NameSet {
        &self.required_sub_entities
    }

    pub fn optional_sub_entities(&self) -> &NameSet {
        &self.optional_sub_entities
    }

    /// Required names of the given namespace
    pub fn required(&self, namespace: Namespace) -> &NameSet {
        match namespace {
            Namespace::Fields => &self.required_fields,
            Namespace::SubEntities => &self.required_sub_entities,
        }
    }

    /// Optional names of the given namespace
    pub fn optional(&self, namespace: Namespace) -> &NameSet {
        match namespace {
            Namespace::Fields => &self.optional_fields,
            Namespace::SubEntities => &self.optional_sub_entities,
        }
    }

    pub fn display(&self) -> &SectionConfig {
        &self.display
    }

    pub fn form(&self) -> &SectionConfig {
        &self.form
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    /// Required fields followed by optional fields
    pub fn all_fields(&self) -> impl Iterator<Item = &str> {
        self.required_fields
            .iter()
            .chain(self.optional_fields.iter())
            .map(String::as_str)
    }

    /// Combine this entity (child) with `parent` into a new entity.
    ///
    /// Required names are the union of both sides; optional names are the
    /// union minus anything required, so a name required on either side ends
    /// up required. Identity and metadata come from the child.
    pub fn merge_with_parent(&self, parent: &Entity) -> Entity {
        let (required_fields, optional_fields) = merge_names(
            &parent.required_fields,
            &self.required_fields,
            &parent.optional_fields,
            &self.optional_fields,
        );
        let (required_sub_entities, optional_sub_entities) = merge_names(
            &parent.required_sub_entities,
            &self.required_sub_entities,
            &parent.optional_sub_entities,
            &self.optional_sub_entities,
        );

        Entity {
            name: self.name.clone(),
            parents: self.parents.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            target_namespace: self
                .target_namespace
                .clone()
                .or_else(|| parent.target_namespace.clone()),
            required_fields,
            optional_fields,
            required_sub_entities,
            optional_sub_entities,
            display: self.display.merge_with_parent(&parent.display),
            form: self.form.merge_with_parent(&parent.form),
        }
    }
}

fn merge_names(
    parent_required: &NameSet,
    child_required: &NameSet,
    parent_optional: &NameSet,
    child_optional: &NameSet,
) -> (NameSet, NameSet) {
    let required: NameSet = parent_required
        .iter()
        .chain(child_required)
        .cloned()
        .collect();
    let optional: NameSet = parent_optional
        .iter()
        .chain(child_optional)
        .filter(|name| !required.contains(*name))
        .cloned()
        .collect();
    (required, optional)
}

/// Builder collecting raw entity data ahead of validation
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    name: String,
    parents: Vec<String>,
    label: Option<String>,
    description: String,
    target_namespace: Option<String>,
    required_fields: Vec<String>,
    optional_fields: Vec<String>,
    required_sub_entities: Vec<String>,
    optional_sub_entities: Vec<String>,
    display: SectionConfig,
    form: SectionConfig,
}

fn collect<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = collect(parents);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = Some(namespace.into());
        self
    }

    pub fn required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = collect(fields);
        self
    }

    pub fn optional_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_fields = collect(fields);
        self
    }

    pub fn required_sub_entities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_sub_entities = collect(names);
        self
    }

    pub fn optional_sub_entities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_sub_entities = collect(names);
        self
    }

    pub fn display(mut self, display: SectionConfig) -> Self {
        self.display = display;
        self
    }

    pub fn form(mut self, form: SectionConfig) -> Self {
        self.form = form;
        self
    }

    /// Validate the collected data and produce an [`Entity`].
    ///
    /// # Errors
    ///
    /// Fails on a blank or malformed name or parent, a self-parent, a parent
    /// listed twice, a name declared both required and optional within
    /// either namespace, or a display or form section with a blank name.
    pub fn build(self) -> Result<Entity> {
        let name = normalize_name(&self.name)?;

        let mut parents: Vec<String> = Vec::with_capacity(self.parents.len());
        for raw in &self.parents {
            let parent = normalize_name(raw)?;
            if parent == name {
                return Err(Error::SelfParent(name));
            }
            if parents.contains(&parent) {
                return Err(Error::DuplicateParent {
                    entity: name,
                    parent,
                });
            }
            parents.push(parent);
        }

        let required_fields = normalize_set(&self.required_fields);
        let optional_fields = normalize_set(&self.optional_fields);
        check_disjoint(&name, Namespace::Fields, &required_fields, &optional_fields)?;

        let required_sub_entities = normalize_set(&self.required_sub_entities);
        let optional_sub_entities = normalize_set(&self.optional_sub_entities);
        check_disjoint(
            &name,
            Namespace::SubEntities,
            &required_sub_entities,
            &optional_sub_entities,
        )?;

        for section in self.display.sections.iter().chain(&self.form.sections) {
            if section.name.trim().is_empty() {
                return Err(Error::invalid_name(
                    section.name.clone(),
                    format!("section name in entity '{name}' must not be empty"),
                ));
            }
        }

        Ok(Entity {
            label: self.label.unwrap_or_else(|| name.clone()),
            name,
            parents,
            description: self.description,
            target_namespace: self.target_namespace,
            required_fields,
            optional_fields,
            required_sub_entities,
            optional_sub_entities,
            display: self.display,
            form: self.form,
        })
    }
}

fn check_disjoint(
    entity: &str,
    namespace: Namespace,
    required: &NameSet,
    optional: &NameSet,
) -> Result<()> {
    let overlap = intersection(required, optional);
    if overlap.is_empty() {
        Ok(())
    } else {
        Err(Error::Overlap {
            entity: entity.to_string(),
            namespace,
            names: overlap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &NameSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_build_minimal_entity() {
        let entity = Entity::builder("Person").build().unwrap();
        assert_eq!(entity.name(), "Person");
        assert_eq!(entity.label(), "Person");
        assert!(entity.parents().is_empty());
        assert!(entity.required_fields().is_empty());
        assert!(entity.display().is_empty());
    }

    #[test]
    fn test_build_normalizes_names() {
        let entity = Entity::builder("  Employee ")
            .parents([" Person"])
            .required_fields(["Email ", "Email", ""])
            .build()
            .unwrap();
        assert_eq!(entity.name(), "Employee");
        assert_eq!(entity.parents(), ["Person"]);
        assert_eq!(names(entity.required_fields()), vec!["Email"]);
    }

    #[test]
    fn test_build_rejects_empty_name() {
        let result = Entity::builder("").build();
        assert!(matches!(result, Err(Error::InvalidName { .. })));
    }

    #[test]
    fn test_build_rejects_delimiter_in_name() {
        let result = Entity::builder("Bad|Name").build();
        assert!(matches!(result, Err(Error::InvalidName { .. })));
    }

    #[test]
    fn test_build_rejects_malformed_parent() {
        let result = Entity::builder("Child").parents(["Par[ent]"]).build();
        assert!(matches!(result, Err(Error::InvalidName { .. })));
    }

    #[test]
    fn test_build_rejects_self_parent() {
        let result = Entity::builder("Loop").parents(["Other", "Loop"]).build();
        assert_eq!(result.unwrap_err(), Error::SelfParent("Loop".to_string()));
    }

    #[test]
    fn test_build_rejects_duplicate_parent() {
        let result = Entity::builder("Child").parents(["A", "B", "A"]).build();
        assert_eq!(
            result.unwrap_err(),
            Error::DuplicateParent {
                entity: "Child".to_string(),
                parent: "A".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_field_overlap() {
        let result = Entity::builder("Person")
            .required_fields(["Name", "Email"])
            .optional_fields(["Email"])
            .build();
        assert_eq!(
            result.unwrap_err(),
            Error::Overlap {
                entity: "Person".to_string(),
                namespace: Namespace::Fields,
                names: vec!["Email".to_string()],
            }
        );
    }

    #[test]
    fn test_build_rejects_sub_entity_overlap() {
        let result = Entity::builder("Person")
            .required_sub_entities(["Address"])
            .optional_sub_entities(["Address"])
            .build();
        assert!(matches!(
            result,
            Err(Error::Overlap {
                namespace: Namespace::SubEntities,
                ..
            })
        ));
    }

    #[test]
    fn test_build_rejects_blank_section_name() {
        let display = Entity::builder("Person")
            .display(SectionConfig::new().with_section(Section::new("   ", ["Name"])))
            .build();
        assert_eq!(
            display.unwrap_err(),
            Error::invalid_name("", "section name in entity 'Person' must not be empty")
        );

        let form = Entity::builder("Person")
            .form(SectionConfig::new().with_section(Section {
                name: "\t".to_string(),
                fields: vec!["Name".to_string()],
            }))
            .build();
        assert!(matches!(form, Err(Error::InvalidName { .. })));
    }

    #[test]
    fn test_namespaces_are_independent() {
        // The same name may be a required field and an optional sub-entity.
        let entity = Entity::builder("Person")
            .required_fields(["Address"])
            .optional_sub_entities(["Address"])
            .build()
            .unwrap();
        assert!(entity.required(Namespace::Fields).contains("Address"));
        assert!(entity.optional(Namespace::SubEntities).contains("Address"));
    }

    #[test]
    fn test_merge_unions_required_and_optional() {
        let parent = Entity::builder("Person")
            .required_fields(["FullName"])
            .optional_fields(["Bio"])
            .build()
            .unwrap();
        let child = Entity::builder("Employee")
            .parents(["Person"])
            .required_fields(["Email"])
            .optional_fields(["Phone"])
            .build()
            .unwrap();

        let merged = child.merge_with_parent(&parent);

        assert_eq!(merged.name(), "Employee");
        assert_eq!(merged.parents(), ["Person"]);
        assert_eq!(names(merged.required_fields()), vec!["FullName", "Email"]);
        assert_eq!(names(merged.optional_fields()), vec!["Bio", "Phone"]);
    }

    #[test]
    fn test_merge_parent_required_wins_over_child_optional() {
        let parent = Entity::builder("Base")
            .required_fields(["Title"])
            .required_sub_entities(["Author"])
            .build()
            .unwrap();
        let child = Entity::builder("Paper")
            .optional_fields(["Title", "Abstract"])
            .optional_sub_entities(["Author"])
            .build()
            .unwrap();

        let merged = child.merge_with_parent(&parent);

        assert_eq!(names(merged.required_fields()), vec!["Title"]);
        assert_eq!(names(merged.optional_fields()), vec!["Abstract"]);
        assert_eq!(names(merged.required_sub_entities()), vec!["Author"]);
        assert!(merged.optional_sub_entities().is_empty());
    }

    #[test]
    fn test_merge_child_required_wins_over_parent_optional() {
        let parent = Entity::builder("Base")
            .optional_fields(["Title"])
            .build()
            .unwrap();
        let child = Entity::builder("Paper")
            .required_fields(["Title"])
            .build()
            .unwrap();

        let merged = child.merge_with_parent(&parent);

        assert!(merged.required_fields().contains("Title"));
        assert!(merged.optional_fields().is_empty());
    }

    #[test]
    fn test_merge_keeps_child_metadata() {
        let parent = Entity::builder("Base")
            .label("Base Label")
            .description("Base description")
            .target_namespace("Property")
            .build()
            .unwrap();
        let child = Entity::builder("Child")
            .label("Child Label")
            .build()
            .unwrap();

        let merged = child.merge_with_parent(&parent);

        assert_eq!(merged.label(), "Child Label");
        assert_eq!(merged.description(), "");
        // Absent on the child, so the parent's value is carried through.
        assert_eq!(merged.target_namespace(), Some("Property"));

        let own = Entity::builder("Own")
            .target_namespace("Custom")
            .build()
            .unwrap();
        assert_eq!(own.merge_with_parent(&parent).target_namespace(), Some("Custom"));
    }

    #[test]
    fn test_merge_does_not_alias_inputs() {
        let parent = Entity::builder("Base")
            .required_fields(["A"])
            .build()
            .unwrap();
        let child = Entity::builder("Child").build().unwrap();
        let before = (parent.clone(), child.clone());

        let _merged = child.merge_with_parent(&parent);

        assert_eq!(before, (parent, child));
    }

    #[test]
    fn test_header_override() {
        let parent = SectionConfig::new().with_header(["Name", "Email"]);
        let child = SectionConfig::new().with_header(["Title"]);
        let unspecified = SectionConfig::new();

        assert_eq!(child.merge_with_parent(&parent).header, vec!["Title"]);
        assert_eq!(
            unspecified.merge_with_parent(&parent).header,
            vec!["Name", "Email"]
        );
    }

    #[test]
    fn test_section_replace_in_place_and_append() {
        let parent = SectionConfig::new()
            .with_section(Section::new("Basics", ["Name"]))
            .with_section(Section::new("Contact", ["Email"]))
            .with_section(Section::new("Other", ["Notes"]));
        let child = SectionConfig::new()
            .with_section(Section::new("Extra", ["Badge"]))
            .with_section(Section::new("Contact", ["Email", "Phone"]));

        let merged = child.merge_with_parent(&parent);

        let order: Vec<&str> = merged.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, vec!["Basics", "Contact", "Other", "Extra"]);
        assert_eq!(
            merged.section("Contact").unwrap().fields,
            vec!["Email", "Phone"]
        );
    }

    #[test]
    fn test_entity_merge_applies_to_display_and_form() {
        let parent = Entity::builder("Base")
            .display(SectionConfig::new().with_header(["Name"]))
            .form(SectionConfig::new().with_section(Section::new("Main", ["Name"])))
            .build()
            .unwrap();
        let child = Entity::builder("Child")
            .form(SectionConfig::new().with_section(Section::new("Main", ["Title"])))
            .build()
            .unwrap();

        let merged = child.merge_with_parent(&parent);

        assert_eq!(merged.display().header, vec!["Name"]);
        assert_eq!(merged.form().section("Main").unwrap().fields, vec!["Title"]);
    }

    #[test]
    fn test_field_names_cover_header_and_sections() {
        let config = SectionConfig::new()
            .with_header(["Name"])
            .with_section(Section::new("Contact", ["Email", "Phone"]));
        let fields: Vec<&str> = config.field_names().collect();
        assert_eq!(fields, vec!["Name", "Email", "Phone"]);
    }

    #[test]
    fn test_placeholder_is_empty_leaf() {
        let entity = Entity::placeholder("Unknown");
        assert_eq!(entity.name(), "Unknown");
        assert!(!entity.has_parents());
        assert_eq!(entity.all_fields().count(), 0);
    }
}
