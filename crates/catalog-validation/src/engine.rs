//! Catalog validation engine

use crate::reporter::{IssueKind, Severity, ValidationIssue, ValidationReport};
use catalog_schema::{Entity, InheritanceResolver};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Strictness level for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictnessLevel {
    /// Strict: unknown parents and fields are errors
    Strict,
    /// Moderate: unknown parents and fields are warnings
    #[default]
    Moderate,
    /// Lenient: unknown parents are not reported
    Lenient,
}

impl FromStr for StrictnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(StrictnessLevel::Strict),
            "moderate" => Ok(StrictnessLevel::Moderate),
            "lenient" => Ok(StrictnessLevel::Lenient),
            other => Err(format!(
                "unknown strictness '{other}', expected strict, moderate or lenient"
            )),
        }
    }
}

impl fmt::Display for StrictnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrictnessLevel::Strict => f.write_str("strict"),
            StrictnessLevel::Moderate => f.write_str("moderate"),
            StrictnessLevel::Lenient => f.write_str("lenient"),
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Strictness level
    pub strictness: StrictnessLevel,
    /// Registry of known field names; field checks are skipped when unset
    pub known_fields: Option<HashSet<String>>,
    /// Maximum issues before stopping (0 = unlimited)
    pub max_issues: usize,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strictness(mut self, strictness: StrictnessLevel) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn known_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_issues(mut self, max_issues: usize) -> Self {
        self.max_issues = max_issues;
        self
    }
}

/// Validates a whole catalog and reports every problem found
pub struct CatalogValidator {
    config: ValidationConfig,
}

impl CatalogValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Create with specific configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run every check over the resolver's catalog
    pub fn validate(&self, resolver: &InheritanceResolver) -> ValidationReport {
        let mut report = ValidationReport::new();

        self.check_parents(resolver, &mut report);
        self.check_inheritance(resolver, &mut report);
        if let Some(known) = &self.config.known_fields {
            for entity in resolver.catalog().iter() {
                self.check_fields(entity, known, &mut report);
            }
        }

        debug!(
            "Validated {} entities: {} issue(s)",
            resolver.catalog().len(),
            report.len()
        );
        report
    }

    fn check_parents(&self, resolver: &InheritanceResolver, report: &mut ValidationReport) {
        let severity = match self.config.strictness {
            StrictnessLevel::Strict => Severity::Error,
            StrictnessLevel::Moderate => Severity::Warning,
            StrictnessLevel::Lenient => return,
        };

        for entity in resolver.catalog().iter() {
            for parent in entity.parents() {
                if !resolver.contains(parent) {
                    self.record(
                        report,
                        ValidationIssue {
                            severity,
                            kind: IssueKind::UnknownParent,
                            entity: entity.name().to_string(),
                            message: format!("parent '{parent}' is not defined"),
                        },
                    );
                }
            }
        }
    }

    fn check_inheritance(&self, resolver: &InheritanceResolver, report: &mut ValidationReport) {
        // An entity that only inherits a cycle is still reported under its own name
        for name in resolver.catalog().names() {
            let Err(error) = resolver.ancestors(name) else {
                continue;
            };
            let entity = name.to_string();
            self.record(
                report,
                ValidationIssue {
                    severity: Severity::Error,
                    kind: IssueKind::Inheritance,
                    entity,
                    message: error.to_string(),
                },
            );
        }
    }

    fn check_fields(&self, entity: &Entity, known: &HashSet<String>, report: &mut ValidationReport) {
        let severity = if self.config.strictness == StrictnessLevel::Strict {
            Severity::Error
        } else {
            Severity::Warning
        };

        let referenced = entity
            .all_fields()
            .chain(entity.display().field_names())
            .chain(entity.form().field_names());

        let mut seen = HashSet::new();
        for field in referenced {
            if !known.contains(field) && seen.insert(field) {
                self.record(
                    report,
                    ValidationIssue {
                        severity,
                        kind: IssueKind::UnknownField,
                        entity: entity.name().to_string(),
                        message: format!("field '{field}' is not in the field registry"),
                    },
                );
            }
        }
    }

    fn record(&self, report: &mut ValidationReport, issue: ValidationIssue) {
        if issue.severity == Severity::Warning {
            warn!("{}", issue);
        }
        report.push(issue, self.config.max_issues);
    }
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::new()
    }
}
