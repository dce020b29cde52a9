//! Built-in domains: education performance and real-estate listings

use super::schema::{
    Aggregate, ChartKind, ChartSpec, Derivation, DomainSchema, FieldKind, FieldMapping, Predicate,
    RoleAccess,
};

fn greater_than_zero(column: &str) -> Predicate {
    Predicate::GreaterThan {
        column: column.to_string(),
        value: 0.0,
    }
}

fn chart(title: &str, kind: ChartKind, x: &str, y: Option<&str>, aggregate: Aggregate) -> ChartSpec {
    ChartSpec {
        title: title.to_string(),
        kind,
        x: x.to_string(),
        y: y.map(str::to_string),
        aggregate,
    }
}

fn mean_bar(title: &str, x: &str, y: &str) -> ChartSpec {
    chart(title, ChartKind::Bar, x, Some(y), Aggregate::Mean)
}

fn grant(role: &str, charts: impl IntoIterator<Item = usize>) -> RoleAccess {
    RoleAccess {
        role: role.to_string(),
        charts: charts.into_iter().collect(),
    }
}

impl DomainSchema {
    /// Student performance records
    pub fn education() -> Self {
        use FieldKind::{Real, Text};

        Self {
            name: "education".to_string(),
            table: "education_data".to_string(),
            filters: vec![
                greater_than_zero("Hours_Studied"),
                greater_than_zero("Sleep_Hours"),
                greater_than_zero("Exam_Score"),
            ],
            derivations: Vec::new(),
            fields: vec![
                FieldMapping::new("Hours_Studied", "hours_studied", Real),
                FieldMapping::new("Attendance", "attendance", Real),
                FieldMapping::new("Sleep_Hours", "sleep_hours", Real),
                FieldMapping::new("Physical_Activity", "physical_activity", Text),
                FieldMapping::new("Learning_Disabilities", "learning_disabilities", Text),
                FieldMapping::new("Parental_Involvement", "parental_involvement", Text),
                FieldMapping::new("Parental_Education_Level", "parental_education_level", Text),
                FieldMapping::new("Distance_from_Home", "distance_from_home", Text),
                FieldMapping::new("Peer_Influence", "peer_influence", Text),
                FieldMapping::new("Exam_Score", "exam_score", Real),
            ],
            charts: vec![
                mean_bar("Hours Studied vs Average Exam Score", "hours_studied", "exam_score"),
                mean_bar("Attendance vs Average Exam Score", "attendance", "exam_score"),
                mean_bar("Sleep Hours vs Average Exam Score", "sleep_hours", "exam_score"),
                mean_bar("Physical Activity vs Average Sleep Hours", "physical_activity", "sleep_hours"),
                mean_bar(
                    "Learning Disabilities vs Average Exam Score",
                    "learning_disabilities",
                    "exam_score",
                ),
                mean_bar(
                    "Parental Involvement vs Average Exam Score",
                    "parental_involvement",
                    "exam_score",
                ),
                mean_bar(
                    "Parental Education Level vs Average Exam Score",
                    "parental_education_level",
                    "exam_score",
                ),
                mean_bar(
                    "Distance from Home vs Average Exam Score",
                    "distance_from_home",
                    "exam_score",
                ),
                mean_bar("Peer Influence vs Average Exam Score", "peer_influence", "exam_score"),
            ],
            roles: vec![
                grant("admin", 0..9),
                grant("teacher", 0..2),
                grant("med_asst", 2..5),
                grant("coordinator", 5..8),
            ],
            fallback_charts: vec![8],
        }
    }

    /// Property listings; the previous sale date is split into day/month/year
    pub fn real_estate() -> Self {
        use FieldKind::{Integer, Real, Text};

        let bounded = |column: &str| Predicate::Between {
            column: column.to_string(),
            min: 1.0,
            max: 10.0,
        };

        Self {
            name: "real_estate".to_string(),
            table: "real_estate_data".to_string(),
            filters: vec![
                Predicate::Equals {
                    column: "status".to_string(),
                    value: "for_sale".to_string(),
                },
                bounded("bed"),
                bounded("bath"),
                greater_than_zero("price"),
            ],
            derivations: vec![Derivation::DateParts {
                source: "prev_sold_date".to_string(),
                day: "day".to_string(),
                month: "month".to_string(),
                year: "year".to_string(),
            }],
            fields: vec![
                FieldMapping::new("price", "price", Real),
                FieldMapping::new("bed", "bed", Real),
                FieldMapping::new("bath", "bath", Real),
                FieldMapping::new("state", "state", Text),
                FieldMapping::new("house_size", "house_size", Real),
                FieldMapping::new("day", "day", Integer),
                FieldMapping::new("month", "month", Integer),
                FieldMapping::new("year", "year", Integer),
            ],
            charts: vec![
                mean_bar("Number of Beds vs Average Price", "bed", "price"),
                mean_bar("Number of Baths vs Average Price", "bath", "price"),
                mean_bar("State vs Average Price", "state", "price"),
                mean_bar("State vs Average House Size", "state", "house_size"),
                chart("State vs Count of Listings", ChartKind::Bar, "state", None, Aggregate::Count),
                chart("Month Sold vs Total Price", ChartKind::Line, "month", Some("price"), Aggregate::Sum),
            ],
            roles: vec![
                grant("admin", 0..6),
                grant("analyst", 0..6),
                grant("researcher", 0..6),
                grant("validator", 0..2),
                grant("viewer", [0]),
            ],
            fallback_charts: Vec::new(),
        }
    }

    /// Look up a built-in domain by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "education" => Some(Self::education()),
            "real_estate" | "real-estate" => Some(Self::real_estate()),
            _ => None,
        }
    }
}
