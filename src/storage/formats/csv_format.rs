use super::infer_cell;
use crate::error::{EtlError, Result};
use crate::table::RawTable;
use std::path::Path;

/// Read a CSV file with a header row
pub(crate) fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| EtlError::decode(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| EtlError::decode(path, e))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut table = RawTable::new(headers);
    for record in reader.records() {
        let record = record.map_err(|e| EtlError::decode(path, e))?;
        table.push_row(record.iter().map(infer_cell).collect());
    }
    Ok(table)
}
