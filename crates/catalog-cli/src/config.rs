//! CLI configuration file

use anyhow::Context;
use catalog_validation::{StrictnessLevel, ValidationConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from the YAML file given with `--config`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Definition files or directories to load
    pub catalog_paths: Vec<PathBuf>,
    /// Validation strictness
    pub strictness: StrictnessLevel,
    /// Field registry used by `validate`
    pub known_fields: Option<Vec<String>>,
    /// Maximum issues to report (0 = unlimited)
    pub max_issues: usize,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Read a config file. Relative catalog paths are taken relative to the
    /// file's directory.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.catalog_paths = config
                .catalog_paths
                .into_iter()
                .map(|p| if p.is_relative() { base.join(p) } else { p })
                .collect();
        }
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        // An empty file deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validation settings derived from this config
    pub fn validation_config(&self) -> ValidationConfig {
        let mut config = ValidationConfig::new()
            .strictness(self.strictness)
            .max_issues(self.max_issues);
        if let Some(fields) = &self.known_fields {
            config = config.known_fields(fields.iter().cloned());
        }
        config
    }
}
