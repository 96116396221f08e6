//! Entity definition loader

use crate::{Error, Result};
use catalog_schema::{Entity, EntityCatalog, Section, SectionConfig};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

const INLINE_ORIGIN: &str = "<inline>";

/// Serializable catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    entities: Vec<EntityFile>,
}

/// Serializable entity definition
#[derive(Debug, Deserialize)]
struct EntityFile {
    name: String,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    label: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    target_namespace: Option<String>,
    #[serde(default)]
    required_fields: Vec<String>,
    #[serde(default)]
    optional_fields: Vec<String>,
    #[serde(default)]
    required_sub_entities: Vec<String>,
    #[serde(default)]
    optional_sub_entities: Vec<String>,
    #[serde(default)]
    display: SectionConfigFile,
    #[serde(default)]
    form: SectionConfigFile,
}

#[derive(Debug, Default, Deserialize)]
struct SectionConfigFile {
    #[serde(default)]
    header: Vec<String>,
    #[serde(default)]
    sections: Vec<SectionFile>,
}

#[derive(Debug, Deserialize)]
struct SectionFile {
    name: String,
    #[serde(default)]
    fields: Vec<String>,
}

impl From<SectionConfigFile> for SectionConfig {
    fn from(file: SectionConfigFile) -> Self {
        file.sections.into_iter().fold(
            SectionConfig::new().with_header(file.header),
            |config, section| config.with_section(Section::new(section.name, section.fields)),
        )
    }
}

/// Display metadata accepts any scalar and is coerced to a string
fn coerce_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl EntityFile {
    fn into_entity(self) -> catalog_schema::Result<Entity> {
        let mut builder = Entity::builder(self.name)
            .parents(self.parents)
            .required_fields(self.required_fields)
            .optional_fields(self.optional_fields)
            .required_sub_entities(self.required_sub_entities)
            .optional_sub_entities(self.optional_sub_entities)
            .display(self.display.into())
            .form(self.form.into());

        if let Some(label) = coerce_string(self.label) {
            builder = builder.label(label);
        }
        if let Some(description) = coerce_string(self.description) {
            builder = builder.description(description);
        }
        if let Some(namespace) = self.target_namespace {
            builder = builder.target_namespace(namespace);
        }

        builder.build()
    }
}

/// Definition file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension: `.yaml`/`.yml` are YAML,
    /// anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        if path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            Format::Yaml
        } else {
            Format::Json
        }
    }

    /// Whether the path looks like a definition file
    pub fn is_definition_file(path: &Path) -> bool {
        path.extension()
            .map(|e| e == "json" || e == "yaml" || e == "yml")
            .unwrap_or(false)
    }
}

/// Loads entity definitions from strings, files and directories
pub struct CatalogLoader {
    paths: Vec<PathBuf>,
}

impl CatalogLoader {
    /// Create a new loader with the given files or directories
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Add a file or directory to load
    pub fn add_path(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Load every configured path into one catalog
    ///
    /// # Errors
    ///
    /// Fails on unreadable paths, malformed documents, invalid entities, or
    /// an entity name defined more than once across all paths.
    pub fn load(&self) -> Result<EntityCatalog> {
        self.load_paths(&self.paths)
    }

    /// Load the given files or directories into one catalog, ignoring the
    /// configured paths
    ///
    /// # Errors
    ///
    /// Same as [`CatalogLoader::load`].
    pub fn load_paths(&self, paths: &[PathBuf]) -> Result<EntityCatalog> {
        let mut catalog = EntityCatalog::new();
        for path in paths {
            let entities = if path.is_dir() {
                self.load_dir(path)?
            } else {
                self.load_file(path)?
            };
            let origin = path.display().to_string();
            for entity in entities {
                catalog
                    .insert(entity)
                    .map_err(|e| Error::entity(&origin, e))?;
            }
        }
        info!(
            "Loaded {} entities from {} path(s)",
            catalog.len(),
            paths.len()
        );
        Ok(catalog)
    }

    /// Load all definition files in a directory, in file-name order
    ///
    /// # Errors
    ///
    /// Fails if the directory or any definition file in it cannot be loaded.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<Entity>> {
        let io_err = |source| Error::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && Format::is_definition_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        debug!("Found {} definition file(s) in {:?}", files.len(), dir);

        let mut entities = Vec::new();
        for file in files {
            entities.extend(self.load_file(&file)?);
        }
        Ok(entities)
    }

    /// Load entities from a single file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not hold valid definitions.
    pub fn load_file(&self, path: &Path) -> Result<Vec<Entity>> {
        trace!("Loading definitions from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_definitions(&content, Format::from_path(path), &path.display().to_string())
    }

    /// Load entities from a JSON or YAML string
    ///
    /// # Errors
    ///
    /// Fails if the content is malformed or holds an invalid entity.
    pub fn load_str(&self, content: &str, format: Format) -> Result<Vec<Entity>> {
        parse_definitions(content, format, INLINE_ORIGIN)
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn parse_definitions(content: &str, format: Format, origin: &str) -> Result<Vec<Entity>> {
    let document: Value = match format {
        Format::Json => serde_json::from_str(content)
            .map_err(|e| Error::invalid_format(origin, format!("JSON parse error: {e}")))?,
        Format::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::invalid_format(origin, format!("YAML parse error: {e}")))?,
    };

    let files = if document.get("entities").is_some() {
        serde_json::from_value::<CatalogFile>(document)
            .map_err(|e| Error::invalid_format(origin, e))?
            .entities
    } else if document.is_object() {
        vec![serde_json::from_value::<EntityFile>(document)
            .map_err(|e| Error::invalid_format(origin, e))?]
    } else {
        return Err(Error::invalid_format(
            origin,
            "expected an entity object or an `entities` list",
        ));
    };

    files
        .into_iter()
        .map(|file| file.into_entity().map_err(|e| Error::entity(origin, e)))
        .collect()
}
