//! Tabular ETL
//!
//! Ingests education and real-estate tabular files from a directory,
//! cleans them according to a domain schema, persists them to SQLite and
//! computes role-gated aggregate charts over the stored records.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod etl;
pub mod storage;
pub mod table;
pub mod transform;

// Re-exports for convenience
pub use config::EtlConfig;
pub use domain::{CleanRecord, DomainSchema};
pub use error::{EtlError, PipelineError, Stage};
pub use etl::{Extractor, Loader, Pipeline, PipelineReport, PipelineState, Transformer};
pub use storage::{Database, DirectoryExtractor, RecordLoader, read_table};
pub use table::{Cell, RawTable};
pub use transform::SchemaTransformer;
