//! Domain configuration
//!
//! A [`DomainSchema`] is all that distinguishes one vertical from another:
//! its filters, derived columns, persisted fields and dashboard charts.

mod builtin;
mod record;
mod schema;

pub use record::CleanRecord;
pub use schema::{
    Aggregate, ChartKind, ChartSpec, Derivation, DomainSchema, FieldKind, FieldMapping, Predicate,
    RoleAccess,
};
