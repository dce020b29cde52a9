//! Domain schema definition
//!
//! A domain schema is stored as YAML. Example format:
//! ```yaml
//! name: education
//! table: education_data
//! filters:
//!   - op: greater_than
//!     column: Hours_Studied
//!     value: 0.0
//! derivations: []
//! fields:
//!   - column: Hours_Studied
//!     field: hours_studied
//!     kind: real
//! ```

use crate::error::{EtlError, Result};
use crate::table::Cell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Row-retention predicate on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Numeric value strictly greater than `value`
    GreaterThan { column: String, value: f64 },
    /// Numeric value within `[min, max]`
    Between { column: String, min: f64, max: f64 },
    /// Text value equal to `value`
    Equals { column: String, value: String },
    /// Text value equal to one of `values`
    OneOf { column: String, values: Vec<String> },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::GreaterThan { column, .. }
            | Predicate::Between { column, .. }
            | Predicate::Equals { column, .. }
            | Predicate::OneOf { column, .. } => column,
        }
    }

    /// Whether a cell satisfies the predicate; values of the wrong type never do
    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Predicate::GreaterThan { value, .. } => cell.as_number().is_some_and(|n| n > *value),
            Predicate::Between { min, max, .. } => {
                cell.as_number().is_some_and(|n| n >= *min && n <= *max)
            }
            Predicate::Equals { value, .. } => cell.as_text() == Some(value.as_str()),
            Predicate::OneOf { values, .. } => cell
                .as_text()
                .is_some_and(|text| values.iter().any(|v| v == text)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Predicate::GreaterThan { column, value } => format!("{column} > {value}"),
            Predicate::Between { column, min, max } => format!("{column} in [{min}, {max}]"),
            Predicate::Equals { column, value } => format!("{column} == {value:?}"),
            Predicate::OneOf { column, values } => format!("{column} in {values:?}"),
        }
    }
}

/// Derived-column rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// Parse `source` as a date and split it into day, month and year columns
    DateParts {
        source: String,
        day: String,
        month: String,
        year: String,
    },
}

impl Derivation {
    pub fn source(&self) -> &str {
        match self {
            Derivation::DateParts { source, .. } => source,
        }
    }

    pub fn outputs(&self) -> Vec<&str> {
        match self {
            Derivation::DateParts {
                day, month, year, ..
            } => vec![day.as_str(), month.as_str(), year.as_str()],
        }
    }
}

/// Storage type of a persisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Real,
    Integer,
    Text,
}

impl FieldKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldKind::Real => "REAL",
            FieldKind::Integer => "INTEGER",
            FieldKind::Text => "TEXT",
        }
    }
}

/// Maps a table column onto a persisted field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub column: String,
    pub field: String,
    pub kind: FieldKind,
}

impl FieldMapping {
    pub fn new(column: &str, field: &str, kind: FieldKind) -> Self {
        Self {
            column: column.to_string(),
            field: field.to_string(),
            kind,
        }
    }
}

/// How chart values are aggregated per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Mean,
    Sum,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

/// An aggregate chart over persisted fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    /// Field to group by
    pub x: String,
    /// Field to aggregate; unused for `count`
    #[serde(default)]
    pub y: Option<String>,
    pub aggregate: Aggregate,
}

/// Charts (by index into `charts`) a role may see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAccess {
    pub role: String,
    pub charts: Vec<usize>,
}

/// Everything that distinguishes one vertical from another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSchema {
    pub name: String,
    /// Storage table for persisted records
    pub table: String,
    #[serde(default)]
    pub filters: Vec<Predicate>,
    #[serde(default)]
    pub derivations: Vec<Derivation>,
    pub fields: Vec<FieldMapping>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
    #[serde(default)]
    pub roles: Vec<RoleAccess>,
    /// Charts for roles not listed in `roles`
    #[serde(default)]
    pub fallback_charts: Vec<usize>,
}

impl DomainSchema {
    /// Columns the transformer needs to find in its input
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        let referenced = self
            .filters
            .iter()
            .map(Predicate::column)
            .chain(self.derivations.iter().map(Derivation::source));
        for column in referenced {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }

    /// Raw columns the loader maps, excluding ones produced by derivations
    pub fn required_columns(&self) -> Vec<&str> {
        let derived: HashSet<&str> = self
            .derivations
            .iter()
            .flat_map(Derivation::outputs)
            .collect();
        self.fields
            .iter()
            .map(|f| f.column.as_str())
            .filter(|c| !derived.contains(c))
            .collect()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }

    /// Reject schemas that would produce invalid SQL or dangling references
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(EtlError::InvalidSchema(msg)) };

        if !IDENTIFIER.is_match(&self.table) {
            return invalid(format!("table name {:?} is not a valid identifier", self.table));
        }
        if self.fields.is_empty() {
            return invalid(format!("domain {:?} declares no fields", self.name));
        }

        let mut seen = HashSet::new();
        for mapping in &self.fields {
            if !IDENTIFIER.is_match(&mapping.field) || mapping.field.eq_ignore_ascii_case("id") {
                return invalid(format!("field name {:?} is not allowed", mapping.field));
            }
            if !seen.insert(mapping.field.as_str()) {
                return invalid(format!("field {:?} is declared twice", mapping.field));
            }
        }

        for chart in &self.charts {
            for field in std::iter::once(&chart.x).chain(chart.y.as_ref()) {
                if !seen.contains(field.as_str()) {
                    return invalid(format!(
                        "chart {:?} references unknown field {:?}",
                        chart.title, field
                    ));
                }
            }
            if chart.aggregate != Aggregate::Count && chart.y.is_none() {
                return invalid(format!("chart {:?} needs a y field", chart.title));
            }
        }

        let grants = self
            .roles
            .iter()
            .flat_map(|r| r.charts.iter())
            .chain(self.fallback_charts.iter());
        for &index in grants {
            if index >= self.charts.len() {
                return invalid(format!("chart index {index} is out of range"));
            }
        }

        Ok(())
    }

    /// Read and validate a schema from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let schema: Self = serde_yaml::from_str(&content).map_err(|e| {
            EtlError::InvalidSchema(format!("failed to parse {}: {}", path.display(), e))
        })?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| EtlError::InvalidSchema(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> DomainSchema {
        DomainSchema {
            name: "demo".into(),
            table: "demo_data".into(),
            filters: vec![Predicate::GreaterThan {
                column: "Score".into(),
                value: 0.0,
            }],
            derivations: vec![Derivation::DateParts {
                source: "When".into(),
                day: "d".into(),
                month: "m".into(),
                year: "y".into(),
            }],
            fields: vec![
                FieldMapping::new("Score", "score", FieldKind::Real),
                FieldMapping::new("y", "year", FieldKind::Integer),
            ],
            charts: Vec::new(),
            roles: Vec::new(),
            fallback_charts: Vec::new(),
        }
    }

    #[test]
    fn test_predicates() {
        let gt = Predicate::GreaterThan {
            column: "x".into(),
            value: 0.0,
        };
        assert!(gt.matches(&Cell::Number(5.0)));
        assert!(!gt.matches(&Cell::Number(0.0)));
        assert!(!gt.matches(&Cell::Text("5".into())));

        let between = Predicate::Between {
            column: "x".into(),
            min: 1.0,
            max: 10.0,
        };
        assert!(between.matches(&Cell::Number(1.0)));
        assert!(between.matches(&Cell::Number(10.0)));
        assert!(!between.matches(&Cell::Number(11.0)));

        let eq = Predicate::Equals {
            column: "status".into(),
            value: "for_sale".into(),
        };
        assert!(eq.matches(&Cell::Text("for_sale".into())));
        assert!(!eq.matches(&Cell::Text("sold".into())));
    }

    #[test]
    fn test_required_columns_exclude_derived() {
        let schema = minimal();
        assert_eq!(schema.required_columns(), vec!["Score"]);
        assert_eq!(schema.referenced_columns(), vec!["Score", "When"]);
    }

    #[test]
    fn test_validate_rejects_bad_identifiers() {
        let mut schema = minimal();
        assert!(schema.validate().is_ok());

        schema.table = "demo; DROP TABLE users".into();
        assert!(matches!(schema.validate(), Err(EtlError::InvalidSchema(_))));

        let mut schema = minimal();
        schema.fields.push(FieldMapping::new("Other", "score", FieldKind::Real));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dangling_chart_grants() {
        let mut schema = minimal();
        schema.fallback_charts = vec![0];
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("demo.yml");
        std::fs::write(&path, minimal().to_yaml().unwrap()).unwrap();

        let loaded = DomainSchema::read(&path).unwrap();
        assert_eq!(loaded, minimal());
    }

    #[test]
    fn test_yaml_tags() {
        let yaml = r#"
name: listings
table: listings
filters:
  - op: between
    column: bed
    min: 1
    max: 10
  - op: one_of
    column: status
    values: [for_sale, ready_to_build]
fields:
  - column: bed
    field: bed
    kind: real
"#;
        let schema: DomainSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.filters.len(), 2);
        assert!(schema.derivations.is_empty());
        assert!(schema.filters[1].matches(&Cell::Text("ready_to_build".into())));
    }
}
