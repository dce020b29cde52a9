//! Extractor trait for reading data from a source

use crate::error::{EtlError, Result};
use std::path::PathBuf;

/// A source entry that was skipped during extraction, with the reason
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: EtlError,
}

/// Extraction result: the data that was read plus everything that was skipped
///
/// Skips are not failures. An extractor only returns `Err` when the run as a
/// whole cannot continue.
#[derive(Debug)]
pub struct Extraction<T> {
    pub data: T,
    pub skipped: Vec<SkippedFile>,
}

impl<T> Extraction<T> {
    /// Extraction with nothing skipped
    pub fn complete(data: T) -> Self {
        Self {
            data,
            skipped: Vec::new(),
        }
    }
}

/// Extractor trait for extracting data from a source
///
/// # Example
/// ```no_run
/// use tabular_etl::etl::{Extraction, Extractor};
/// use tabular_etl::error::Result;
///
/// struct FixedExtractor(Vec<i32>);
///
/// impl Extractor for FixedExtractor {
///     type Item = Vec<i32>;
///
///     fn extract(&self) -> Result<Extraction<Self::Item>> {
///         Ok(Extraction::complete(self.0.clone()))
///     }
/// }
/// ```
pub trait Extractor {
    /// The type of data extracted
    type Item;

    /// Extract data from the source
    ///
    /// # Errors
    /// Returns an error only if nothing usable could be extracted
    fn extract(&self) -> Result<Extraction<Self::Item>>;
}
