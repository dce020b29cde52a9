//! Recursive extraction of every tabular file under a directory

use super::read_table;
use crate::error::{EtlError, Result};
use crate::etl::{EtlEvent, EtlObserver, Extraction, Extractor, LogObserver, SkippedFile};
use crate::table::RawTable;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Reads and concatenates every file under a source directory
///
/// Files that cannot be read are skipped and reported; they never abort the
/// run. Visiting order follows the filesystem and is not stable.
pub struct DirectoryExtractor {
    path: PathBuf,
    observer: Arc<dyn EtlObserver>,
}

impl DirectoryExtractor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn EtlObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn skip(&self, skipped: &mut Vec<SkippedFile>, path: PathBuf, reason: EtlError) {
        self.observer.notify(&EtlEvent::FileSkipped {
            path: path.clone(),
            reason: reason.to_string(),
        });
        skipped.push(SkippedFile { path, reason });
    }
}

impl Extractor for DirectoryExtractor {
    type Item = RawTable;

    fn extract(&self) -> Result<Extraction<Self::Item>> {
        let mut tables = Vec::new();
        let mut skipped = Vec::new();

        for entry in WalkDir::new(&self.path) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.path.clone());
                    self.skip(&mut skipped, path, EtlError::Walk(e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            match read_table(&path) {
                Ok(table) => {
                    self.observer.notify(&EtlEvent::FileRead {
                        path: path.clone(),
                        rows: table.len(),
                    });
                    tables.push(table);
                }
                Err(e) if e.is_per_file() => self.skip(&mut skipped, path, e),
                Err(e) => return Err(e),
            }
        }

        if tables.is_empty() {
            return Err(EtlError::NoDataExtracted);
        }

        let files = tables.len();
        let data = RawTable::concat(tables);
        self.observer.notify(&EtlEvent::Extracted {
            files,
            skipped: skipped.len(),
            rows: data.len(),
        });

        Ok(Extraction { data, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::RecordingObserver;
    use tempfile::TempDir;

    #[test]
    fn test_extract_recurses_and_skips() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("2024/q1");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("a.csv"), "x,y\n1,2\n").unwrap();
        std::fs::write(nested.join("b.json"), r#"[{"x": 3, "z": "k"}]"#).unwrap();
        std::fs::write(nested.join("notes.txt"), "hello").unwrap();

        let observer = Arc::new(RecordingObserver::new());
        let extraction = DirectoryExtractor::new(temp.path())
            .with_observer(observer.clone())
            .extract()
            .unwrap();

        assert_eq!(extraction.data.len(), 2);
        assert_eq!(extraction.data.columns().len(), 3);
        assert_eq!(extraction.skipped.len(), 1);
        assert!(extraction.skipped[0].path.ends_with("notes.txt"));
        assert!(matches!(
            extraction.skipped[0].reason,
            EtlError::UnsupportedFormat { .. }
        ));
        assert!(observer.events().iter().any(|e| matches!(
            e,
            EtlEvent::Extracted { files: 2, skipped: 1, rows: 2 }
        )));
        // One skip event per file; it is the only place skips get logged
        let skip_events = observer
            .events()
            .into_iter()
            .filter(|e| matches!(e, EtlEvent::FileSkipped { .. }))
            .count();
        assert_eq!(skip_events, 1);
    }

    #[test]
    fn test_empty_directory_has_no_data() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            DirectoryExtractor::new(temp.path()).extract(),
            Err(EtlError::NoDataExtracted)
        ));
    }

    #[test]
    fn test_missing_directory_has_no_data() {
        let temp = TempDir::new().unwrap();
        let extraction = DirectoryExtractor::new(temp.path().join("absent")).extract();
        assert!(matches!(extraction, Err(EtlError::NoDataExtracted)));
    }
}
