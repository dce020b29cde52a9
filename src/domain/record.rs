//! Mapping of cleaned rows onto the persistent record shape

use super::schema::{DomainSchema, FieldKind};
use crate::error::{EtlError, Result};
use crate::table::{Cell, RawTable};
use rusqlite::types::Value;

/// One row in the domain's persistent shape, values in `fields` order
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    values: Vec<Value>,
}

impl CleanRecord {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Map every row of `table` onto records
    ///
    /// # Errors
    /// `SchemaViolation` if a mapped column is absent, `MalformedRecord` on the
    /// first cell that does not fit its field kind
    pub fn map_table(schema: &DomainSchema, table: &RawTable) -> Result<Vec<CleanRecord>> {
        let indices = schema
            .fields
            .iter()
            .map(|mapping| {
                table
                    .column_index(&mapping.column)
                    .ok_or_else(|| EtlError::SchemaViolation {
                        column: mapping.column.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        table
            .rows()
            .iter()
            .enumerate()
            .map(|(row_number, row)| {
                let values = schema
                    .fields
                    .iter()
                    .zip(&indices)
                    .map(|(mapping, &idx)| {
                        convert(&row[idx], mapping.kind).ok_or_else(|| EtlError::MalformedRecord {
                            row: row_number,
                            field: mapping.field.clone(),
                            expected: mapping.kind.sql_type(),
                            found: row[idx].kind().to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CleanRecord { values })
            })
            .collect()
    }
}

fn convert(cell: &Cell, kind: FieldKind) -> Option<Value> {
    match (kind, cell) {
        (_, Cell::Null) => None,
        (FieldKind::Real, Cell::Number(n)) => Some(Value::Real(*n)),
        (FieldKind::Integer, Cell::Number(n)) if n.fract() == 0.0 => Some(Value::Integer(*n as i64)),
        (FieldKind::Text, Cell::Text(s)) => Some(Value::Text(s.clone())),
        (FieldKind::Text, other @ (Cell::Number(_) | Cell::DateTime(_))) => {
            Some(Value::Text(other.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldMapping;

    fn schema() -> DomainSchema {
        DomainSchema {
            name: "demo".into(),
            table: "demo".into(),
            filters: Vec::new(),
            derivations: Vec::new(),
            fields: vec![
                FieldMapping::new("Score", "score", FieldKind::Real),
                FieldMapping::new("Level", "level", FieldKind::Text),
                FieldMapping::new("Year", "year", FieldKind::Integer),
            ],
            charts: Vec::new(),
            roles: Vec::new(),
            fallback_charts: Vec::new(),
        }
    }

    fn table(rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::from_rows(
            vec!["Year".into(), "Score".into(), "Level".into()],
            rows,
        )
    }

    #[test]
    fn test_maps_in_field_order() {
        let records = CleanRecord::map_table(
            &schema(),
            &table(vec![vec![
                Cell::Number(2023.0),
                Cell::Number(80.5),
                Cell::Number(3.0),
            ]]),
        )
        .unwrap();

        assert_eq!(
            records[0].values(),
            &[
                Value::Real(80.5),
                Value::Text("3".into()),
                Value::Integer(2023)
            ]
        );
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err = CleanRecord::map_table(
            &schema(),
            &table(vec![vec![
                Cell::Number(2023.0),
                Cell::Text("high".into()),
                Cell::Text("A".into()),
            ]]),
        )
        .unwrap_err();

        match err {
            EtlError::MalformedRecord { row, field, .. } => {
                assert_eq!(row, 0);
                assert_eq!(field, "score");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column_is_schema_violation() {
        let table = RawTable::from_rows(vec!["Score".into()], vec![vec![Cell::Number(1.0)]]);
        assert!(matches!(
            CleanRecord::map_table(&schema(), &table),
            Err(EtlError::SchemaViolation { column }) if column == "Level"
        ));
    }
}
