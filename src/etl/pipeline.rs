//! Pipeline orchestration for ETL operations

use super::{EtlEvent, EtlObserver, Extractor, Loader, LogObserver, SkippedFile, Transformer};
use crate::error::{PipelineError, Stage};
use std::sync::Arc;

/// Where a pipeline run currently is
///
/// `Extracting -> Transforming -> Loading -> Done`, or `Failed` from any of
/// the three working states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Extracting,
    Transforming,
    Loading,
    Done,
    Failed(Stage),
}

impl From<Stage> for PipelineState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Extracting => PipelineState::Extracting,
            Stage::Transforming => PipelineState::Transforming,
            Stage::Loading => PipelineState::Loading,
        }
    }
}

/// Summary of a successful run
#[derive(Debug)]
pub struct PipelineReport {
    /// Records persisted by the loader
    pub loaded: usize,
    /// Source entries the extractor skipped
    pub skipped: Vec<SkippedFile>,
}

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// Stages run strictly in sequence. A failure aborts the remaining stages,
/// so a later stage never observes partial output of a failed one.
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use tabular_etl::domain::DomainSchema;
/// use tabular_etl::etl::Pipeline;
/// use tabular_etl::storage::{Database, DirectoryExtractor, RecordLoader};
/// use tabular_etl::transform::SchemaTransformer;
///
/// # fn example() -> eyre::Result<()> {
/// let schema = DomainSchema::education();
/// let pipeline = Pipeline::new(
///     DirectoryExtractor::new("data_sources"),
///     SchemaTransformer::new(schema.clone()),
///     RecordLoader::new(Database::open("etl.db")?, schema),
/// );
///
/// let report = pipeline.run()?;
/// println!("Loaded {} records", report.loaded);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
    observer: Arc<dyn EtlObserver>,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline that reports to the `log` facade
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            observer: Arc::new(LogObserver),
        }
    }

    /// Report state changes and failures to `observer` instead
    pub fn with_observer(mut self, observer: Arc<dyn EtlObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract data from source
    /// 2. Transform it
    /// 3. Load it to the destination
    ///
    /// # Errors
    /// Returns the first stage failure, tagged with that stage
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let extraction = self.stage(Stage::Extracting, || self.extractor.extract())?;
        let transformed = self.stage(Stage::Transforming, || {
            self.transformer.transform(extraction.data)
        })?;
        let loaded = self.stage(Stage::Loading, || self.loader.load(transformed))?;

        self.observer
            .notify(&EtlEvent::StateChanged(PipelineState::Done));

        Ok(PipelineReport {
            loaded,
            skipped: extraction.skipped,
        })
    }

    fn stage<R>(
        &self,
        stage: Stage,
        work: impl FnOnce() -> crate::error::Result<R>,
    ) -> Result<R, PipelineError> {
        self.observer
            .notify(&EtlEvent::StateChanged(PipelineState::from(stage)));

        work().map_err(|source| {
            let err = PipelineError::new(stage, source);
            self.observer.notify(&EtlEvent::Failed {
                stage,
                message: err.source.to_string(),
            });
            self.observer
                .notify(&EtlEvent::StateChanged(PipelineState::Failed(stage)));
            err
        })
    }
}

/// One-line, user-facing summary of a run
pub fn outcome_message(result: &Result<PipelineReport, PipelineError>) -> String {
    match result {
        Ok(report) => format!(
            "ETL process completed successfully: {} record(s) loaded.",
            report.loaded
        ),
        Err(err) => format!("ETL process failed: {}", err.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EtlError, Result};
    use crate::etl::{Extraction, RecordingObserver};
    use std::sync::Mutex;

    struct MockExtractor(Option<Vec<i32>>);

    impl Extractor for MockExtractor {
        type Item = Vec<i32>;
        fn extract(&self) -> Result<Extraction<Self::Item>> {
            self.0
                .clone()
                .map(Extraction::complete)
                .ok_or(EtlError::NoDataExtracted)
        }
    }

    struct DoubleTransformer;

    impl Transformer for DoubleTransformer {
        type Input = Vec<i32>;
        type Output = Vec<i32>;
        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            Ok(input.into_iter().map(|v| v * 2).collect())
        }
    }

    struct SumLoader(Arc<Mutex<Option<i32>>>);

    impl Loader for SumLoader {
        type Item = Vec<i32>;
        fn load(&self, items: Self::Item) -> Result<usize> {
            *self.0.lock().unwrap() = Some(items.iter().sum());
            Ok(items.len())
        }
    }

    #[test]
    fn test_pipeline() {
        let result = Arc::new(Mutex::new(None));
        let observer = Arc::new(RecordingObserver::new());

        let pipeline = Pipeline::new(
            MockExtractor(Some(vec![1, 2, 3])),
            DoubleTransformer,
            SumLoader(result.clone()),
        )
        .with_observer(observer.clone());

        let report = pipeline.run().unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(*result.lock().unwrap(), Some(12)); // (1+2+3)*2 = 12
        assert_eq!(
            observer.states(),
            vec![
                PipelineState::Extracting,
                PipelineState::Transforming,
                PipelineState::Loading,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_failed_extract_skips_later_stages() {
        let result = Arc::new(Mutex::new(None));
        let observer = Arc::new(RecordingObserver::new());

        let pipeline = Pipeline::new(MockExtractor(None), DoubleTransformer, SumLoader(result.clone()))
            .with_observer(observer.clone());

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.stage, Stage::Extracting);
        assert!(matches!(err.source, EtlError::NoDataExtracted));
        assert_eq!(*result.lock().unwrap(), None, "loader must not run");
        assert_eq!(
            observer.states(),
            vec![
                PipelineState::Extracting,
                PipelineState::Failed(Stage::Extracting)
            ]
        );
    }

    #[test]
    fn test_outcome_message() {
        let ok: std::result::Result<PipelineReport, PipelineError> = Ok(PipelineReport {
            loaded: 7,
            skipped: Vec::new(),
        });
        assert_eq!(
            outcome_message(&ok),
            "ETL process completed successfully: 7 record(s) loaded."
        );

        let failed: std::result::Result<PipelineReport, PipelineError> = Err(PipelineError::new(
            Stage::Extracting,
            EtlError::NoDataExtracted,
        ));
        assert!(outcome_message(&failed).starts_with("ETL process failed: extract stage failed"));
    }
}
