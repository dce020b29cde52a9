//! Error types shared by every ETL stage
//!
//! Per-file failures (`UnsupportedFormat`, `Decode`, `Walk`) are caught at the
//! extractor boundary and turned into skip records. Everything else is fatal
//! and reaches the caller wrapped in a [`PipelineError`].

use std::fmt;
use std::path::PathBuf;

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// The file extension has no registered decoder
    #[error("unsupported file format: {extension:?}")]
    UnsupportedFormat { extension: String },

    /// The file exists but could not be decoded into a table
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Directory traversal failed for one entry
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Not a single file under the source directory could be read
    #[error("no data extracted: none of the source files could be read")]
    NoDataExtracted,

    /// A column the domain schema relies on is absent from the table
    #[error("schema violation: column `{column}` is missing")]
    SchemaViolation { column: String },

    /// A row could not be mapped onto the persistent record shape
    #[error("row {row}: field `{field}` expected {expected}, found {found}")]
    MalformedRecord {
        row: usize,
        field: String,
        expected: &'static str,
        found: String,
    },

    /// A storage operation failed; a failed batch write is rolled back
    #[error("storage error: {0}")]
    Persist(#[from] rusqlite::Error),

    /// The domain configuration itself is unusable
    #[error("invalid domain schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub(crate) fn decode(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the extractor should record this error as a skip and move on
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::Decode { .. } | Self::Walk(_)
        )
    }

    /// Message safe to show to end users (no filesystem paths)
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode { message, .. } => format!("a source file could not be decoded: {message}"),
            Self::Walk(_) => "the source directory could not be traversed".to_string(),
            Self::Io(e) => format!("I/O error: {}", e.kind()),
            // rusqlite messages can embed the database file path
            Self::Persist(e) => match e.sqlite_error_code() {
                Some(code) => format!("storage error: {code:?}"),
                None => "storage error".to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// The three working stages of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extracting,
    Transforming,
    Loading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extracting => "extract",
            Stage::Transforming => "transform",
            Stage::Loading => "load",
        };
        f.write_str(name)
    }
}

/// A fatal error tagged with the stage that produced it
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: EtlError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: EtlError) -> Self {
        Self { stage, source }
    }

    pub fn user_message(&self) -> String {
        format!("{} stage failed: {}", self.stage, self.source.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_file_classification() {
        assert!(EtlError::UnsupportedFormat { extension: "txt".into() }.is_per_file());
        assert!(EtlError::decode("a.csv", "bad row").is_per_file());
        assert!(!EtlError::NoDataExtracted.is_per_file());
        assert!(!EtlError::SchemaViolation { column: "price".into() }.is_per_file());
    }

    #[test]
    fn test_user_message_hides_paths() {
        let err = PipelineError::new(
            Stage::Extracting,
            EtlError::decode("/srv/uploads/secret/listing.csv", "unexpected end of file"),
        );
        let message = err.user_message();
        assert!(message.starts_with("extract stage failed"));
        assert!(message.contains("unexpected end of file"));
        assert!(!message.contains("/srv/uploads"));
    }

    #[test]
    fn test_storage_user_message_hides_database_path() {
        let missing = std::env::temp_dir()
            .join("tetl-no-such-dir")
            .join("nested")
            .join("etl.db");
        let source = rusqlite::Connection::open(&missing).unwrap_err();
        let err = PipelineError::new(Stage::Loading, EtlError::Persist(source));

        let message = err.user_message();
        assert_eq!(message, "load stage failed: storage error: CannotOpen");
        assert!(!message.contains("tetl-no-such-dir"));
    }

    #[test]
    fn test_stage_display() {
        let err = PipelineError::new(
            Stage::Transforming,
            EtlError::SchemaViolation { column: "status".into() },
        );
        assert_eq!(
            err.to_string(),
            "transform stage failed: schema violation: column `status` is missing"
        );
    }
}
