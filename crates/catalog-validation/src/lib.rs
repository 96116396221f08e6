//! # catalog-validation
//!
//! Whole-catalog validation for entity definitions.
//!
//! The resolution core deliberately treats unknown parents as empty leaves;
//! this crate is where such references are surfaced, together with every
//! inheritance error in the catalog and, optionally, field names missing
//! from a field registry.
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_schema::{Entity, EntityCatalog, InheritanceResolver};
//! use catalog_validation::{CatalogValidator, StrictnessLevel, ValidationConfig};
//!
//! let child = Entity::builder("Child").parents(["Ghost"]).build().unwrap();
//! let resolver = InheritanceResolver::new(EntityCatalog::from_entities([child]).unwrap());
//!
//! let config = ValidationConfig::new().strictness(StrictnessLevel::Strict);
//! let report = CatalogValidator::with_config(config).validate(&resolver);
//! assert!(!report.is_valid());
//! ```

pub mod engine;
pub mod reporter;

pub use engine::{CatalogValidator, StrictnessLevel, ValidationConfig};
pub use reporter::{IssueKind, Severity, ValidationIssue, ValidationReport};

use catalog_schema::InheritanceResolver;

/// Convenience function to validate a catalog with default settings
pub fn validate(resolver: &InheritanceResolver) -> ValidationReport {
    CatalogValidator::new().validate(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_schema::{Entity, EntityCatalog};

    #[test]
    fn test_convenience_validate() {
        let catalog = EntityCatalog::from_entities([
            Entity::builder("Base").build().unwrap(),
            Entity::builder("Child").parents(["Base"]).build().unwrap(),
        ])
        .unwrap();
        let report = validate(&InheritanceResolver::new(catalog));
        assert!(report.is_valid());
        assert!(report.is_empty());
    }
}
