//! # catalog-cli
//!
//! Command-line interface for inspecting and validating entity catalogs.
//!
//! Loads entity definitions from disk, then prints ancestor orders,
//! effective entities, multi-entity compositions or a validation report.

mod config;

use anyhow::Context;
use catalog_loader::CatalogLoader;
use catalog_schema::{InheritanceResolver, MultiEntityResolver};
use catalog_validation::{CatalogValidator, StrictnessLevel};
use clap::{Parser, Subcommand};
use config::CliConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Schema entity catalog CLI")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Definition file or directory to load (repeatable)
    #[arg(long = "catalog", global = true)]
    catalog: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the linearized ancestors of an entity
    Ancestors {
        /// Entity name
        name: String,
    },

    /// Print the effective definition of an entity as JSON
    Effective {
        /// Entity name
        name: String,
    },

    /// Compose several entities and print the result as JSON
    Resolve {
        /// Entity names, in attribution order
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Validate the whole catalog
    Validate {
        /// Override the configured strictness
        #[arg(short, long)]
        strictness: Option<StrictnessLevel>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };
    init_logging(cli.verbose, config.log_level.as_deref());

    if !cli.catalog.is_empty() {
        config.catalog_paths = cli.catalog.clone();
    }
    if config.catalog_paths.is_empty() {
        anyhow::bail!("No catalog given; pass --catalog or set catalog_paths in the config file");
    }

    let catalog = CatalogLoader::new(config.catalog_paths.clone())
        .load()
        .context("Failed to load catalog")?;
    tracing::info!("Catalog holds {} entities", catalog.len());
    let resolver = InheritanceResolver::new(catalog);

    match cli.command {
        Commands::Ancestors { name } => {
            for ancestor in resolver.ancestors(&name)? {
                println!("{ancestor}");
            }
        }
        Commands::Effective { name } => {
            let effective = resolver.effective(&name)?;
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        Commands::Resolve { names } => {
            let resolved = MultiEntityResolver::new(&resolver).resolve(&names)?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Commands::Validate { strictness } => {
            if let Some(level) = strictness {
                config.strictness = level;
            }
            let report =
                CatalogValidator::with_config(config.validation_config()).validate(&resolver);
            println!("{report}");

            return Ok(if report.has_errors() {
                ExitCode::from(2)
            } else if report.warnings().next().is_some() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            });
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool, configured: Option<&str>) {
    let default = if verbose {
        "debug"
    } else {
        configured.unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
