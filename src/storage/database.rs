//! SQLite persistence for domain records

use crate::domain::{CleanRecord, DomainSchema};
use crate::error::Result;
use crate::etl::{EtlEvent, EtlObserver, Loader, LogObserver};
use crate::table::{Cell, RawTable};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use std::path::Path;
use std::sync::Arc;

/// Relational store holding one table per domain
///
/// The backend is chosen once, when the store is opened.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the domain's table if it does not exist
    pub fn ensure_table(&self, schema: &DomainSchema) -> Result<()> {
        let columns = schema
            .fields
            .iter()
            .map(|f| format!("{} {}", f.field, f.kind.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
                schema.table, columns
            ),
            [],
        )?;
        Ok(())
    }

    /// Whether the domain's table has been created yet
    pub fn has_table(&self, schema: &DomainSchema) -> Result<bool> {
        let found = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?
            .exists([&schema.table])?;
        Ok(found)
    }

    /// Insert every record in one transaction
    ///
    /// Either all records are committed or, on the first error, the
    /// transaction is rolled back and nothing is visible.
    pub fn insert_batch(&self, schema: &DomainSchema, records: &[CleanRecord]) -> Result<usize> {
        let fields = schema.field_names();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table,
            fields.join(", "),
            placeholders
        );

        // Dropping the transaction without commit rolls it back.
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                stmt.execute(params_from_iter(record.values()))?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Number of persisted records for a domain
    pub fn count(&self, schema: &DomainSchema) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", schema.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Read every persisted record back, columns named after the fields
    pub fn fetch_all(&self, schema: &DomainSchema) -> Result<RawTable> {
        let fields = schema.field_names();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            fields.join(", "),
            schema.table
        ))?;

        let mut table = RawTable::new(fields.iter().map(|f| f.to_string()).collect());
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(fields.len());
            for idx in 0..fields.len() {
                cells.push(match row.get_ref(idx)? {
                    ValueRef::Null => Cell::Null,
                    ValueRef::Integer(i) => Cell::Number(i as f64),
                    ValueRef::Real(f) => Cell::Number(f),
                    ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(_) => Cell::Null,
                });
            }
            table.push_row(cells);
        }
        Ok(table)
    }
}

/// Loader that persists a cleaned table as domain records
pub struct RecordLoader {
    db: Database,
    schema: DomainSchema,
    observer: Arc<dyn EtlObserver>,
}

impl RecordLoader {
    pub fn new(db: Database, schema: DomainSchema) -> Self {
        Self {
            db,
            schema,
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn EtlObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Loader for RecordLoader {
    type Item = RawTable;

    fn load(&self, table: Self::Item) -> Result<usize> {
        let records = CleanRecord::map_table(&self.schema, &table)?;
        self.db.ensure_table(&self.schema)?;
        let count = self.db.insert_batch(&self.schema, &records)?;

        self.observer.notify(&EtlEvent::Loaded {
            table: self.schema.table.clone(),
            records: count,
        });
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldKind, FieldMapping};
    use crate::error::EtlError;

    fn schema() -> DomainSchema {
        DomainSchema {
            name: "scores".into(),
            table: "scores".into(),
            filters: Vec::new(),
            derivations: Vec::new(),
            fields: vec![
                FieldMapping::new("Name", "name", FieldKind::Text),
                FieldMapping::new("Score", "score", FieldKind::Real),
            ],
            charts: Vec::new(),
            roles: Vec::new(),
            fallback_charts: Vec::new(),
        }
    }

    fn table(n: usize) -> RawTable {
        RawTable::from_rows(
            vec!["Name".into(), "Score".into()],
            (0..n)
                .map(|i| vec![Cell::Text(format!("s{i}")), Cell::Number(i as f64)])
                .collect(),
        )
    }

    #[test]
    fn test_load_persists_every_row() {
        let loader = RecordLoader::new(Database::open_in_memory().unwrap(), schema());
        assert_eq!(loader.load(table(4)).unwrap(), 4);
        assert_eq!(loader.database().count(&schema()).unwrap(), 4);

        let stored = loader.database().fetch_all(&schema()).unwrap();
        assert_eq!(stored.cell(3, "name"), Some(&Cell::Text("s3".into())));
        assert_eq!(stored.cell(3, "score"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_has_table() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.has_table(&schema()).unwrap());
        db.ensure_table(&schema()).unwrap();
        assert!(db.has_table(&schema()).unwrap());
    }

    #[test]
    fn test_failure_mid_batch_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_table(&schema()).unwrap();
        db.connection()
            .execute_batch(
                "CREATE TRIGGER fail_third BEFORE INSERT ON scores
                 WHEN (SELECT COUNT(*) FROM scores) >= 2
                 BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END;",
            )
            .unwrap();

        let loader = RecordLoader::new(db, schema());
        let err = loader.load(table(5)).unwrap_err();
        assert!(matches!(err, EtlError::Persist(_)));
        assert_eq!(loader.database().count(&schema()).unwrap(), 0);
    }

    #[test]
    fn test_malformed_row_writes_nothing() {
        let mut bad = table(3);
        bad.push_row(vec![Cell::Text("s3".into()), Cell::Text("high".into())]);

        let loader = RecordLoader::new(Database::open_in_memory().unwrap(), schema());
        assert!(matches!(
            loader.load(bad),
            Err(EtlError::MalformedRecord { row: 3, .. })
        ));
        loader.database().ensure_table(&schema()).unwrap();
        assert_eq!(loader.database().count(&schema()).unwrap(), 0);
    }
}
