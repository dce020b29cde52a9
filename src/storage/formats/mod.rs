//! Decoders for the supported tabular file formats

mod csv_format;
mod excel_format;
mod json_format;
mod parquet_format;

pub(crate) use csv_format::read_csv;
pub(crate) use excel_format::read_excel;
pub(crate) use json_format::read_json;
pub(crate) use parquet_format::read_parquet;

use crate::table::Cell;

/// Text values treated as missing
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

pub(crate) fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// Cell for an untyped text value: missing token, number, or text
pub(crate) fn infer_cell(value: &str) -> Cell {
    if is_missing_token(value) {
        return Cell::Null;
    }
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(value.to_string()),
    }
}
