//! SQL table output using rusqlite.

use std::fs;

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, error, info};

use super::{validate, Result};
use crate::models::config::DatabaseConfig;
use crate::models::record::{ExtractionRecord, Schema};

/// Quote an identifier so column names with spaces or accents stay intact.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(schema: &Schema) -> String {
    schema
        .columns()
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns = schema
        .columns()
        .iter()
        .map(|c| format!("{} TEXT", quote_identifier(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quote_identifier(table), columns)
}

fn insert_sql(table: &str, schema: &Schema) -> String {
    let placeholders = vec!["?"; schema.columns().len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        column_list(schema),
        placeholders
    )
}

/// Inserts a batch into a table with one parameterized statement, inside a
/// single transaction.
pub struct DatabaseSink {
    config: DatabaseConfig,
}

impl DatabaseSink {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Insert every record and commit once. Returns the number of rows
    /// inserted.
    ///
    /// The connection, statement and transaction live only for this call; on
    /// any error nothing is committed and the error is returned after being
    /// logged.
    pub fn write(&self, schema: &Schema, records: &[ExtractionRecord]) -> Result<usize> {
        validate(schema, records)?;

        match self.insert(schema, records) {
            Ok(inserted) => {
                info!(
                    "Inserted {} rows into {} ({})",
                    inserted,
                    self.config.table,
                    self.config.path.display()
                );
                Ok(inserted)
            }
            Err(e) => {
                error!("Error writing to the database: {}", e);
                Err(e)
            }
        }
    }

    fn insert(&self, schema: &Schema, records: &[ExtractionRecord]) -> Result<usize> {
        if let Some(parent) = self.config.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(&self.config.path)?;

        if self.config.create_table {
            conn.execute(&create_table_sql(&self.config.table, schema), [])?;
        }

        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let sql = insert_sql(&self.config.table, schema);
            debug!("Prepared statement: {}", sql);

            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                inserted += stmt.execute(params_from_iter(record.values()))?;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::models::record::FieldValue;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn schema() -> Schema {
        Schema::new(vec!["F1".to_string(), "F2".to_string()])
    }

    fn records() -> Vec<ExtractionRecord> {
        (1..=3)
            .map(|i| {
                ExtractionRecord::completed(
                    vec![
                        FieldValue::new("F1", format!("{}", i)),
                        FieldValue::not_available("F2"),
                    ],
                    format!("doc{}.pdf", i),
                )
            })
            .collect()
    }

    fn sink(path: &Path) -> DatabaseSink {
        DatabaseSink::new(DatabaseConfig {
            path: path.to_path_buf(),
            ..DatabaseConfig::default()
        })
    }

    fn rows(path: &Path) -> Vec<Vec<String>> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare(r#"SELECT "F1", "F2", "File Name", "Status" FROM invoice_records ORDER BY rowid"#)
            .unwrap();
        stmt.query_map([], |row| {
            (0..4)
                .map(|i| row.get::<_, String>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("invoice_records", &schema()),
            r#"INSERT INTO "invoice_records" ("F1", "F2", "File Name", "Status") VALUES (?, ?, ?, ?)"#
        );
        assert_eq!(quote_identifier(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_inserts_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");

        let inserted = sink(&path).write(&schema(), &records()).unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(
            rows(&path),
            vec![
                vec!["1", "N/A", "doc1.pdf", "Completed"],
                vec!["2", "N/A", "doc2.pdf", "Completed"],
                vec!["3", "N/A", "doc3.pdf", "Completed"],
            ]
        );
    }

    #[test]
    fn test_created_table_columns_follow_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");
        sink(&path).write(&schema(), &records()).unwrap();

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn.prepare("PRAGMA table_info(invoice_records)").unwrap();
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(columns, vec!["F1", "F2", "File Name", "Status"]);
    }

    #[test]
    fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");
        let sink = sink(&path);

        sink.write(&schema(), &records()).unwrap();
        sink.write(&schema(), &records()).unwrap();

        assert_eq!(rows(&path).len(), 6);
    }

    #[test]
    fn test_failed_insert_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                r#"CREATE TABLE invoice_records ("F1" TEXT, "F2" TEXT, "File Name" TEXT UNIQUE, "Status" TEXT)"#,
                [],
            )
            .unwrap();
        }

        let mut batch = records();
        batch.push(batch[0].clone());

        let err = sink(&path).write(&schema(), &batch).unwrap_err();

        assert!(matches!(err, SinkError::Database(_)));
        assert!(rows(&path).is_empty());
    }

    #[test]
    fn test_missing_table_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");
        let sink = DatabaseSink::new(DatabaseConfig {
            path: path.clone(),
            create_table: false,
            ..DatabaseConfig::default()
        });

        let err = sink.write(&schema(), &records()).unwrap_err();
        assert!(matches!(err, SinkError::Database(_)));
    }

    #[test]
    fn test_rejects_empty_and_heterogeneous_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.db");
        let sink = sink(&path);

        assert!(matches!(
            sink.write(&schema(), &[]).unwrap_err(),
            SinkError::EmptyBatch
        ));

        let mut batch = records();
        batch.push(ExtractionRecord::completed(vec![FieldValue::new("F1", "x")], "short.pdf"));
        assert!(matches!(
            sink.write(&schema(), &batch).unwrap_err(),
            SinkError::SchemaMismatch { file } if file == "short.pdf"
        ));

        // Validation happens before any connection is opened
        assert!(!path.exists());
    }
}
