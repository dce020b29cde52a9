//! Domain-driven cleaning of a raw table

use super::parse_datetime;
use crate::domain::{Derivation, DomainSchema};
use crate::error::{EtlError, Result};
use crate::etl::{EtlEvent, EtlObserver, LogObserver, Transformer};
use crate::table::{Cell, RawTable};
use chrono::Datelike;
use std::sync::Arc;

/// Cleans a table according to a [`DomainSchema`]
///
/// Steps, in order:
/// 1. drop rows with a missing value in any column
/// 2. keep rows satisfying every filter predicate
/// 3. compute derived columns, then drop rows whose derivation failed
///
/// Running it again on its own output changes nothing. Every column used by a
/// filter, a derivation or a field mapping must be present up front.
///
/// # Example
/// ```
/// use tabular_etl::domain::DomainSchema;
/// use tabular_etl::etl::Transformer;
/// use tabular_etl::table::{Cell, RawTable};
/// use tabular_etl::transform::SchemaTransformer;
///
/// let schema = DomainSchema::education();
/// let columns = schema.fields.iter().map(|f| f.column.clone()).collect();
/// let student = |hours: f64| {
///     let mut row = vec![Cell::Number(hours), Cell::Number(90.0), Cell::Number(7.0)];
///     row.extend(std::iter::repeat_n(Cell::Text("Medium".into()), 6));
///     row.push(Cell::Number(80.0));
///     row
/// };
/// let table = RawTable::from_rows(columns, vec![student(5.0), student(-1.0)]);
///
/// let cleaned = SchemaTransformer::new(schema).transform(table).unwrap();
/// assert_eq!(cleaned.len(), 1);
/// ```
pub struct SchemaTransformer {
    schema: DomainSchema,
    observer: Arc<dyn EtlObserver>,
}

impl SchemaTransformer {
    pub fn new(schema: DomainSchema) -> Self {
        Self {
            schema,
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn EtlObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn step(&self, name: &str, table: &mut RawTable, apply: impl FnOnce(&mut RawTable)) {
        let before = table.len();
        apply(table);
        self.observer.notify(&EtlEvent::StepApplied {
            step: name.to_string(),
            before,
            after: table.len(),
        });
    }
}

impl Transformer for SchemaTransformer {
    type Input = RawTable;
    type Output = RawTable;

    fn transform(&self, mut table: Self::Input) -> Result<Self::Output> {
        if let Some(column) = self
            .schema
            .referenced_columns()
            .into_iter()
            .chain(self.schema.required_columns())
            .find(|c| !table.has_column(c))
        {
            return Err(EtlError::SchemaViolation {
                column: column.to_string(),
            });
        }

        self.step("drop rows with missing values", &mut table, RawTable::drop_missing);

        for predicate in &self.schema.filters {
            let Some(idx) = table.column_index(predicate.column()) else {
                continue;
            };
            self.step(&format!("filter {}", predicate.describe()), &mut table, |t| {
                t.retain(|row| predicate.matches(&row[idx]))
            });
        }

        if !self.schema.derivations.is_empty() {
            for derivation in &self.schema.derivations {
                derive(&mut table, derivation);
            }
            self.step("drop rows with failed derivations", &mut table, RawTable::drop_missing);
        }

        Ok(table)
    }
}

fn derive(table: &mut RawTable, derivation: &Derivation) {
    match derivation {
        Derivation::DateParts {
            source,
            day,
            month,
            year,
        } => {
            let Some(idx) = table.column_index(source) else {
                return;
            };
            let dates: Vec<_> = table
                .rows()
                .iter()
                .map(|row| match &row[idx] {
                    Cell::DateTime(dt) => Some(*dt),
                    Cell::Text(text) => parse_datetime(text),
                    _ => None,
                })
                .collect();

            let part = |f: fn(&chrono::NaiveDateTime) -> f64| -> Vec<Cell> {
                dates
                    .iter()
                    .map(|d| d.as_ref().map(|d| Cell::Number(f(d))).unwrap_or(Cell::Null))
                    .collect()
            };
            let days = part(|d| f64::from(d.day()));
            let months = part(|d| f64::from(d.month()));
            let years = part(|d| f64::from(d.year()));

            table.set_column(day, days);
            table.set_column(month, months);
            table.set_column(year, years);
        }
    }
}
