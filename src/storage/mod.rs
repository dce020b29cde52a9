//! File system and database storage
//!
//! This module handles all I/O performed by a pipeline run:
//! - decoding CSV, Excel, JSON and Parquet files into tables
//! - recursive extraction from a source directory
//! - bulk persistence to SQLite

mod database;
mod directory;
mod formats;
mod reader;

pub use database::{Database, RecordLoader};
pub use directory::DirectoryExtractor;
pub use reader::{FileFormat, read_table};
