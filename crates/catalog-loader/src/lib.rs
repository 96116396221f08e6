//! # catalog-loader
//!
//! Loads raw entity definitions from JSON or YAML into a validated
//! [`catalog_schema::EntityCatalog`].
//!
//! A definition document is either a single entity object or a catalog
//! document of the form `{ "entities": [ ... ] }`.

pub mod loader;

pub use loader::{CatalogLoader, Format};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading entity definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid definition format in {origin}: {message}")]
    InvalidFormat { origin: String, message: String },

    #[error("Invalid entity in {origin}: {source}")]
    Entity {
        origin: String,
        #[source]
        source: catalog_schema::Error,
    },
}

impl Error {
    pub(crate) fn invalid_format(origin: &str, message: impl ToString) -> Self {
        Self::InvalidFormat {
            origin: origin.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn entity(origin: &str, source: catalog_schema::Error) -> Self {
        Self::Entity {
            origin: origin.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
