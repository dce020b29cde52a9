use crate::error::{EtlError, Result};
use crate::table::{Cell, RawTable};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a JSON table
///
/// Two layouts are accepted: an array of row objects, or an object of
/// columns each mapping a row label to a value.
pub(crate) fn read_json(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|e| EtlError::decode(path, e))?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| EtlError::decode(path, e))?;

    match value {
        Value::Array(rows) => from_records(path, rows),
        Value::Object(columns) => from_columns(path, columns),
        _ => Err(EtlError::decode(
            path,
            "expected an array of records or an object of columns",
        )),
    }
}

fn from_records(path: &Path, rows: Vec<Value>) -> Result<RawTable> {
    let mut objects = Vec::with_capacity(rows.len());
    for row in rows {
        match row {
            Value::Object(object) => objects.push(object),
            other => {
                return Err(EtlError::decode(
                    path,
                    format!("expected a record object, found {other}"),
                ));
            }
        }
    }

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(columns.clone());
    for mut object in objects {
        table.push_row(
            columns
                .iter()
                .map(|c| object.remove(c).map(to_cell).unwrap_or(Cell::Null))
                .collect(),
        );
    }
    Ok(table)
}

fn from_columns(path: &Path, columns: Map<String, Value>) -> Result<RawTable> {
    let mut labels: Vec<String> = Vec::new();
    let mut names = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());

    for (name, column) in columns {
        let Value::Object(cells) = column else {
            return Err(EtlError::decode(
                path,
                format!("column {name:?} is not an object of row values"),
            ));
        };
        for label in cells.keys() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        names.push(name);
        values.push(cells);
    }

    let mut table = RawTable::new(names);
    for label in &labels {
        table.push_row(
            values
                .iter_mut()
                .map(|cells| cells.remove(label).map(to_cell).unwrap_or(Cell::Null))
                .collect(),
        );
    }
    Ok(table)
}

fn to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
        Value::String(s) => Cell::Text(s),
        Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_records() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rows.json");
        std::fs::write(
            &path,
            r#"[{"bed": 3, "state": "Ohio"}, {"bed": null, "city": "Dayton"}]"#,
        )
        .unwrap();

        let table = read_json(&path).unwrap();
        assert_eq!(table.columns(), &["bed", "state", "city"]);
        assert_eq!(table.cell(0, "bed"), Some(&Cell::Number(3.0)));
        assert_eq!(table.cell(1, "bed"), Some(&Cell::Null));
        assert_eq!(table.cell(0, "city"), Some(&Cell::Null));
    }

    #[test]
    fn test_read_columns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("columns.json");
        std::fs::write(
            &path,
            r#"{"bed": {"0": 2, "1": 4}, "state": {"0": "Utah", "1": "Iowa"}}"#,
        )
        .unwrap();

        let table = read_json(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "bed"), Some(&Cell::Number(4.0)));
        assert_eq!(table.cell(1, "state"), Some(&Cell::Text("Iowa".into())));
    }

    #[test]
    fn test_scalar_is_decode_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scalar.json");
        std::fs::write(&path, "42").unwrap();
        assert!(matches!(read_json(&path), Err(EtlError::Decode { .. })));
    }
}
