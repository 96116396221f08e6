#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # catalog-schema
//!
//! Schema entity model, inheritance resolution and multi-entity composition.
//!
//! Entities form a multiple-inheritance graph referenced purely by name.
//! The [`InheritanceResolver`] linearizes each entity's ancestors with C3 and
//! folds them into one effective [`Entity`]; the [`MultiEntityResolver`]
//! composes several effective entities into a source-attributed
//! [`ResolvedSet`].
//!
//! ```rust
//! use catalog_schema::{Entity, EntityCatalog, InheritanceResolver, MultiEntityResolver};
//!
//! let person = Entity::builder("Person")
//!     .required_fields(["FullName"])
//!     .optional_fields(["Bio"])
//!     .build()
//!     .unwrap();
//! let employee = Entity::builder("Employee")
//!     .parents(["Person"])
//!     .required_fields(["Email"])
//!     .build()
//!     .unwrap();
//!
//! let catalog = EntityCatalog::from_entities([person, employee]).unwrap();
//! let resolver = InheritanceResolver::new(catalog);
//!
//! assert_eq!(resolver.ancestors("Employee").unwrap(), vec!["Employee", "Person"]);
//!
//! let resolved = MultiEntityResolver::new(&resolver).resolve(&["Employee"]).unwrap();
//! assert!(resolved.required_fields().contains("FullName"));
//! assert_eq!(resolved.field_sources("Email"), ["Employee"]);
//! ```

/// Name-keyed entity map consumed by the resolvers.
pub mod catalog;
/// Multi-entity composition and the resolved set it produces.
pub mod composition;
/// C3 linearization and ancestor folding.
pub mod inheritance;
/// Schema entity value object and section configuration.
pub mod model;
/// Name validation and name-list normalization helpers.
pub mod names;

pub use catalog::EntityCatalog;
pub use composition::{MultiEntityResolver, ResolvedNames, ResolvedSet};
pub use inheritance::InheritanceResolver;
pub use model::{Entity, EntityBuilder, NameSet, Section, SectionConfig};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The two independent name namespaces an entity declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Fields,
    SubEntities,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Fields => f.write_str("fields"),
            Namespace::SubEntities => f.write_str("sub-entities"),
        }
    }
}

/// Errors raised while constructing entities or resolving their inheritance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Entity '{0}' cannot list itself as a parent")]
    SelfParent(String),

    #[error("Entity '{entity}' lists parent '{parent}' more than once")]
    DuplicateParent { entity: String, parent: String },

    #[error("Entity '{entity}' declares {namespace} as both required and optional: {}", names.join(", "))]
    Overlap {
        entity: String,
        namespace: Namespace,
        names: Vec<String>,
    },

    #[error("Duplicate entity name: {0}")]
    DuplicateEntity(String),

    #[error("Circular inheritance detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Inconsistent precedence order while linearizing '{entity}': cannot merge {}", format_pending(pending))]
    InconsistentPrecedence {
        entity: String,
        pending: Vec<Vec<String>>,
    },
}

impl Error {
    /// Build an invalid-name error with the offending name and reason.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error comes from the inheritance graph rather than from
    /// entity construction.
    pub fn is_graph_error(&self) -> bool {
        matches!(self, Error::Cycle { .. } | Error::InconsistentPrecedence { .. })
    }
}

fn format_pending(pending: &[Vec<String>]) -> String {
    pending
        .iter()
        .map(|seq| format!("[{}]", seq.join(", ")))
        .collect::<Vec<_>>()
        .join(" ")
}

pub type Result<T> = std::result::Result<T, Error>;
