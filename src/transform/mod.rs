//! Transformers for cleaning extracted tables
//!
//! [`SchemaTransformer`] applies a domain's filters and derivations.

mod dates;
mod schema_transformer;

pub use dates::parse_datetime;
pub use schema_transformer::SchemaTransformer;
