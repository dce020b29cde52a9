//! CLI helper functions

use crate::{
    config::EtlConfig,
    dashboard::Dashboard,
    domain::DomainSchema,
    error::{PipelineError, Stage},
    etl::{EtlObserver, Pipeline, PipelineReport},
    storage::{Database, DirectoryExtractor, RecordLoader},
    transform::SchemaTransformer,
};
use eyre::{Context, Result};
use std::sync::Arc;

/// Run the ETL pipeline for one domain
///
/// Pipeline: DirectoryExtractor → SchemaTransformer → RecordLoader
///
/// Runs are not coordinated with each other: callers must serialise runs
/// that target the same database. Re-running over an unchanged source
/// directory inserts every record again.
pub fn run_etl(
    config: &EtlConfig,
    schema: DomainSchema,
    observer: Arc<dyn EtlObserver>,
) -> std::result::Result<PipelineReport, PipelineError> {
    let db = Database::open(&config.database).map_err(|e| PipelineError::new(Stage::Loading, e))?;

    let extractor = DirectoryExtractor::new(&config.source_dir).with_observer(observer.clone());
    let transformer = SchemaTransformer::new(schema.clone()).with_observer(observer.clone());
    let loader = RecordLoader::new(db, schema).with_observer(observer.clone());

    Pipeline::new(extractor, transformer, loader)
        .with_observer(observer)
        .run()
}

/// Role-gated chart data for a domain, as pretty JSON
pub fn charts_json(config: &EtlConfig, schema: &DomainSchema, role: &str) -> Result<String> {
    let db = Database::open(&config.database)
        .with_context(|| format!("Failed to open database: {}", config.database.display()))?;

    let charts = Dashboard::new(schema)
        .load_for_role(&db, role)
        .with_context(|| format!("Failed to read {} records", schema.name))?;
    log::info!("Role {} may view {} chart(s)", role, charts.len());

    serde_json::to_string_pretty(&charts).context("Failed to serialize charts")
}
