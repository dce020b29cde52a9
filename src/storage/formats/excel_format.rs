use super::is_missing_token;
use crate::error::{EtlError, Result};
use crate::table::{Cell, RawTable};
use crate::transform::parse_datetime;
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// Read the first worksheet of an Excel workbook; its first row is the header
pub(crate) fn read_excel(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| EtlError::decode(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::decode(path, "workbook has no worksheets"))?
        .map_err(|e| EtlError::decode(path, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::default());
    };

    let mut table = RawTable::new(header.iter().map(|c| c.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(to_cell).collect());
    }
    Ok(table)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::String(s) if is_missing_token(s) => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => dt.as_datetime().map(Cell::DateTime).unwrap_or(Cell::Null),
        Data::DateTimeIso(s) => parse_datetime(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
