//! Run configuration from environment variables
//!
//! Expected environment variables (all optional):
//! - ETL_SOURCE_DIR: directory of files to ingest (default `data_sources`)
//! - ETL_DATABASE: SQLite database file (default `etl.db`)
//! - ETL_DOMAIN: `education`, `real_estate`, or a path to a YAML domain file
//!   (default `education`)

use crate::domain::DomainSchema;
use crate::error::{EtlError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_DIR: &str = "data_sources";
pub const DEFAULT_DATABASE: &str = "etl.db";
pub const DEFAULT_DOMAIN: &str = "education";

/// Settings fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub source_dir: PathBuf,
    pub database: PathBuf,
    pub domain: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            database: PathBuf::from(DEFAULT_DATABASE),
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

impl EtlConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            source_dir: std::env::var_os("ETL_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            database: std::env::var_os("ETL_DATABASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database),
            domain: std::env::var("ETL_DOMAIN").unwrap_or(defaults.domain),
        }
    }

    /// Resolve the configured domain into a validated schema
    pub fn schema(&self) -> Result<DomainSchema> {
        resolve_domain(&self.domain)
    }
}

/// A built-in domain name, or a path to a YAML domain file
pub fn resolve_domain(domain: &str) -> Result<DomainSchema> {
    if let Some(schema) = DomainSchema::builtin(domain) {
        return Ok(schema);
    }
    let path = Path::new(domain);
    if path.is_file() {
        return DomainSchema::read(path);
    }
    Err(EtlError::InvalidSchema(format!(
        "unknown domain {domain:?}: expected education, real_estate, or a YAML file"
    )))
}
