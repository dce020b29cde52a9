use crate::error::{EtlError, Result};
use crate::table::{Cell, RawTable};
use chrono::{DateTime, NaiveDate, TimeDelta};
use parquet::basic::{LogicalType, TimeUnit};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use std::fs::File;
use std::path::Path;

/// Read every row group of a Parquet file
pub(crate) fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|e| EtlError::decode(path, e))?;
    let reader = SerializedFileReader::new(file).map_err(|e| EtlError::decode(path, e))?;

    let fields = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields()
        .to_vec();
    let columns = fields.iter().map(|f| f.name().to_string()).collect();
    // pandas writes datetime64[ns] as plain INT64 annotated with a timestamp unit
    let units: Vec<Option<TimeUnit>> = fields
        .iter()
        .map(|f| match f.get_basic_info().logical_type() {
            Some(LogicalType::Timestamp { unit, .. }) => Some(unit),
            _ => None,
        })
        .collect();

    let mut table = RawTable::new(columns);
    let rows = reader
        .get_row_iter(None)
        .map_err(|e| EtlError::decode(path, e))?;
    for row in rows {
        let row = row.map_err(|e| EtlError::decode(path, e))?;
        table.push_row(
            row.get_column_iter()
                .zip(&units)
                .map(|((_, field), unit)| match (field, unit) {
                    (Field::Long(v), Some(unit)) => timestamp(*v, unit),
                    (field, _) => to_cell(field),
                })
                .collect(),
        );
    }
    Ok(table)
}

fn timestamp(value: i64, unit: &TimeUnit) -> Cell {
    let dt = match unit {
        TimeUnit::MILLIS(_) => DateTime::from_timestamp_millis(value),
        TimeUnit::MICROS(_) => DateTime::from_timestamp_micros(value),
        TimeUnit::NANOS(_) => Some(DateTime::from_timestamp_nanos(value)),
    };
    dt.map(|dt| Cell::DateTime(dt.naive_utc())).unwrap_or(Cell::Null)
}

fn to_cell(field: &Field) -> Cell {
    match field {
        Field::Null => Cell::Null,
        Field::Byte(v) => Cell::Number(f64::from(*v)),
        Field::Short(v) => Cell::Number(f64::from(*v)),
        Field::Int(v) => Cell::Number(f64::from(*v)),
        Field::Long(v) => Cell::Number(*v as f64),
        Field::UByte(v) => Cell::Number(f64::from(*v)),
        Field::UShort(v) => Cell::Number(f64::from(*v)),
        Field::UInt(v) => Cell::Number(f64::from(*v)),
        Field::ULong(v) => Cell::Number(*v as f64),
        Field::Float(v) if v.is_nan() => Cell::Null,
        Field::Float(v) => Cell::Number(f64::from(*v)),
        Field::Double(v) if v.is_nan() => Cell::Null,
        Field::Double(v) => Cell::Number(*v),
        Field::Str(s) => Cell::Text(s.clone()),
        Field::Date(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(TimeDelta::days(i64::from(*days))))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Cell::DateTime)
            .unwrap_or(Cell::Null),
        Field::TimestampMillis(ms) => DateTime::from_timestamp_millis(*ms)
            .map(|dt| Cell::DateTime(dt.naive_utc()))
            .unwrap_or(Cell::Null),
        Field::TimestampMicros(us) => DateTime::from_timestamp_micros(*us)
            .map(|dt| Cell::DateTime(dt.naive_utc()))
            .unwrap_or(Cell::Null),
        other => Cell::Text(other.to_string()),
    }
}
