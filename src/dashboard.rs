//! Aggregate chart data over persisted records, gated by user role

use crate::domain::{Aggregate, ChartKind, ChartSpec, DomainSchema};
use crate::error::Result;
use crate::storage::Database;
use crate::table::{Cell, RawTable};
use serde::Serialize;
use std::cmp::Ordering;

/// One aggregated value for a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

/// Chart data ready for a rendering library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

pub struct Dashboard<'a> {
    schema: &'a DomainSchema,
}

impl<'a> Dashboard<'a> {
    pub fn new(schema: &'a DomainSchema) -> Self {
        Self { schema }
    }

    /// Chart indices a role may see
    pub fn grants(&self, role: &str) -> &'a [usize] {
        self.schema
            .roles
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.charts.as_slice())
            .unwrap_or(&self.schema.fallback_charts)
    }

    /// Compute every chart the role is granted from a table of persisted records
    pub fn charts_for_role(&self, table: &RawTable, role: &str) -> Vec<Chart> {
        self.grants(role)
            .iter()
            .filter_map(|&idx| self.schema.charts.get(idx))
            .map(|spec| build_chart(spec, table))
            .collect()
    }

    /// Read the domain's records from the database and chart them for a role
    ///
    /// Never writes: before the first load the charts are simply empty.
    pub fn load_for_role(&self, db: &Database, role: &str) -> Result<Vec<Chart>> {
        let table = match db.has_table(self.schema)? {
            true => db.fetch_all(self.schema)?,
            false => RawTable::default(),
        };
        Ok(self.charts_for_role(&table, role))
    }
}

fn build_chart(spec: &ChartSpec, table: &RawTable) -> Chart {
    let x_idx = table.column_index(&spec.x);
    let y_idx = spec.y.as_deref().and_then(|y| table.column_index(y));

    // (label, sum, count) per group, in first-seen order
    let mut groups: Vec<(Cell, f64, usize)> = Vec::new();
    if let Some(x_idx) = x_idx {
        for row in table.rows() {
            let key = &row[x_idx];
            if key.is_null() {
                continue;
            }
            let value = match (spec.aggregate, y_idx) {
                (Aggregate::Count, _) => 0.0,
                (_, Some(y)) => match row[y].as_number() {
                    Some(v) => v,
                    None => continue,
                },
                (_, None) => continue,
            };
            match groups.iter_mut().find(|(k, _, _)| k == key) {
                Some((_, sum, count)) => {
                    *sum += value;
                    *count += 1;
                }
                None => groups.push((key.clone(), value, 1)),
            }
        }
    }

    if groups.iter().all(|(k, _, _)| k.as_number().is_some()) {
        groups.sort_by(|a, b| {
            a.0.as_number()
                .partial_cmp(&b.0.as_number())
                .unwrap_or(Ordering::Equal)
        });
    } else {
        groups.sort_by_key(|(k, _, _)| k.to_string());
    }

    let points = groups
        .into_iter()
        .map(|(key, sum, count)| ChartPoint {
            x: key.to_string(),
            y: match spec.aggregate {
                Aggregate::Mean => sum / count as f64,
                Aggregate::Sum => sum,
                Aggregate::Count => count as f64,
            },
        })
        .collect();

    let y_label = match (spec.aggregate, spec.y.as_deref()) {
        (Aggregate::Count, _) | (_, None) => "count".to_string(),
        (Aggregate::Mean, Some(y)) => format!("average {y}"),
        (Aggregate::Sum, Some(y)) => format!("total {y}"),
    };

    Chart {
        title: spec.title.clone(),
        kind: spec.kind,
        x_label: spec.x.clone(),
        y_label,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> RawTable {
        let row = |price: f64, bed: f64, state: &str, month: f64| {
            vec![
                Cell::Number(price),
                Cell::Number(bed),
                Cell::Number(2.0),
                Cell::Text(state.into()),
                Cell::Number(1500.0),
                Cell::Number(1.0),
                Cell::Number(month),
                Cell::Number(2023.0),
            ]
        };
        RawTable::from_rows(
            DomainSchema::real_estate()
                .field_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            vec![
                row(100.0, 10.0, "Utah", 5.0),
                row(300.0, 2.0, "Ohio", 5.0),
                row(200.0, 2.0, "Ohio", 3.0),
            ],
        )
    }

    #[test]
    fn test_mean_groups_sorted_numerically() {
        let schema = DomainSchema::real_estate();
        let charts = Dashboard::new(&schema).charts_for_role(&listings(), "viewer");
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].title, "Number of Beds vs Average Price");
        assert_eq!(
            charts[0].points,
            vec![
                ChartPoint { x: "2".into(), y: 250.0 },
                ChartPoint { x: "10".into(), y: 100.0 },
            ]
        );
    }

    #[test]
    fn test_count_and_sum() {
        let schema = DomainSchema::real_estate();
        let charts = Dashboard::new(&schema).charts_for_role(&listings(), "analyst");
        assert_eq!(charts.len(), 6);

        let counts = &charts[4];
        assert_eq!(counts.y_label, "count");
        assert_eq!(
            counts.points,
            vec![
                ChartPoint { x: "Ohio".into(), y: 2.0 },
                ChartPoint { x: "Utah".into(), y: 1.0 },
            ]
        );

        let monthly = &charts[5];
        assert_eq!(monthly.kind, ChartKind::Line);
        assert_eq!(monthly.points[1], ChartPoint { x: "5".into(), y: 400.0 });
    }

    #[test]
    fn test_role_gates() {
        let education = DomainSchema::education();
        let dashboard = Dashboard::new(&education);
        assert_eq!(dashboard.grants("admin").len(), 9);
        assert_eq!(dashboard.grants("teacher"), &[0, 1]);
        assert_eq!(dashboard.grants("med_asst"), &[2, 3, 4]);
        assert_eq!(dashboard.grants("coordinator"), &[5, 6, 7]);
        assert_eq!(dashboard.grants("parent"), &[8]);

        let real_estate = DomainSchema::real_estate();
        let dashboard = Dashboard::new(&real_estate);
        assert_eq!(dashboard.grants("validator"), &[0, 1]);
        assert!(dashboard.grants("guest").is_empty());
    }

    #[test]
    fn test_empty_database_gives_empty_series() {
        let schema = DomainSchema::education();
        let db = Database::open_in_memory().unwrap();
        let charts = Dashboard::new(&schema).load_for_role(&db, "teacher").unwrap();
        assert_eq!(charts.len(), 2);
        assert!(charts.iter().all(|c| c.points.is_empty()));
        assert!(!db.has_table(&schema).unwrap(), "charting must not create tables");
    }
}
