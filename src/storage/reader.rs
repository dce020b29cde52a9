//! Extension-based dispatch to the tabular decoders

use super::formats;
use crate::error::{EtlError, Result};
use crate::table::RawTable;
use std::path::Path;

/// Tabular file formats with a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
    Json,
    Parquet,
}

impl FileFormat {
    /// Pick the format from the file name suffix (case-sensitive)
    ///
    /// # Errors
    /// `UnsupportedFormat` carrying the offending extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if name.ends_with(".csv") {
            Ok(FileFormat::Csv)
        } else if name.ends_with(".xlsx") || name.ends_with(".xls") {
            Ok(FileFormat::Excel)
        } else if name.ends_with(".json") {
            Ok(FileFormat::Json)
        } else if name.ends_with(".parquet") {
            Ok(FileFormat::Parquet)
        } else {
            Err(EtlError::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
        }
    }
}

/// Read a tabular file into a [`RawTable`]
///
/// # Errors
/// `UnsupportedFormat` for unknown extensions, `Decode` for malformed files
pub fn read_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    match FileFormat::from_path(path)? {
        FileFormat::Csv => formats::read_csv(path),
        FileFormat::Excel => formats::read_excel(path),
        FileFormat::Json => formats::read_json(path),
        FileFormat::Parquet => formats::read_parquet(path),
    }
}
