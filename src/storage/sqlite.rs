//! # SQLite Table Store
//!
//! Alternative backend: one table per schema, one TEXT column per field.
//! Table and column names are sanitized from the schema since identifiers
//! cannot be bound; every value goes through a placeholder, never string
//! interpolation.

use rusqlite::{params_from_iter, Connection};

use crate::validation::{Record, Schema};

use super::backend::{Decoded, Row, StorageBackend};
use super::errors::{StorageError, StorageResult};

/// SQLite-backed table store for one schema.
pub struct SqliteStore {
    conn: Connection,
    table: String,
    /// `(field name, column name)` in schema order.
    columns: Vec<(String, String)>,
}

impl SqliteStore {
    /// Opens (and creates if needed) the table for `schema` in the database
    /// at `path`.
    pub fn open(path: impl AsRef<std::path::Path>, schema: &Schema) -> StorageResult<Self> {
        Self::with_connection(Connection::open(path)?, schema)
    }

    /// In-memory store, used by tests.
    pub fn in_memory(schema: &Schema) -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, schema)
    }

    fn with_connection(conn: Connection, schema: &Schema) -> StorageResult<Self> {
        let table = sanitize_identifier(schema.name())?;
        let columns: Vec<(String, String)> = schema
            .fields()
            .iter()
            .map(|f| Ok((f.name().to_string(), sanitize_identifier(f.name())?)))
            .collect::<StorageResult<_>>()?;

        let column_defs: Vec<String> = columns
            .iter()
            .map(|(_, col)| format!("\"{col}\" TEXT NOT NULL"))
            .collect();
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{table}\" ({})",
                column_defs.join(", ")
            ),
            [],
        )?;

        Ok(Self { conn, table, columns })
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|(_, col)| format!("\"{col}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert_row(&self, record: &Record) -> StorageResult<()> {
        let placeholders: Vec<String> =
            (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table,
            self.column_list(),
            placeholders.join(", ")
        );
        let values: Vec<String> = self
            .columns
            .iter()
            .map(|(field, _)| record.get(field).cloned().unwrap_or_default())
            .collect();
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }
}

impl StorageBackend for SqliteStore {
    fn list(&self) -> StorageResult<Vec<Row>> {
        let sql = format!(
            "SELECT {} FROM \"{}\" ORDER BY rowid",
            self.column_list(),
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut rows = Vec::new();
        let mut results = stmt.query([])?;
        let mut position = 0;
        while let Some(sql_row) = results.next()? {
            position += 1;
            let mut record = Record::new();
            let mut corrupt = None;
            for (index, (field, _)) in self.columns.iter().enumerate() {
                match sql_row.get::<_, String>(index) {
                    Ok(value) => {
                        record.insert(field.clone(), value);
                    }
                    Err(err) => {
                        corrupt = Some(format!("column '{field}': {err}"));
                        break;
                    }
                }
            }
            rows.push(Row {
                position,
                decoded: match corrupt {
                    // A row that fails to read as TEXT has no reproducible
                    // stored form here; only the reason survives.
                    Some(reason) => Decoded::Corrupt { reason, raw: None },
                    None => Decoded::Ok(record),
                },
            });
        }
        Ok(rows)
    }

    fn append(&self, record: &Record) -> StorageResult<()> {
        self.insert_row(record)
    }

    fn rewrite(&self, rows: &[Row]) -> StorageResult<()> {
        self.conn
            .execute(&format!("DELETE FROM \"{}\"", self.table), [])?;
        for row in rows {
            if let Decoded::Ok(record) = &row.decoded {
                self.insert_row(record)?;
            }
        }
        Ok(())
    }
}

/// Sanitizes a schema or field name into a SQL identifier: lowercase ASCII
/// letters, digits and underscores, starting with a letter.
fn sanitize_identifier(name: &str) -> StorageResult<String> {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.is_empty() || !cleaned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldDef;

    fn sample_schema() -> Schema {
        Schema::new("Member")
            .with_id_field("id")
            .field(FieldDef::read_only("id", "ID"))
            .field(FieldDef::text("firstName", "First name"))
    }

    fn record(id: &str, name: &str) -> Record {
        Record::from([
            ("id".to_string(), id.to_string()),
            ("firstName".to_string(), name.to_string()),
        ])
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Member").unwrap(), "member");
        assert_eq!(sanitize_identifier("firstName").unwrap(), "firstname");
        assert_eq!(sanitize_identifier("drop;table--").unwrap(), "droptable");
        assert!(sanitize_identifier("1234").is_err());
        assert!(sanitize_identifier(";--").is_err());
    }

    #[test]
    fn test_append_and_list_in_rowid_order() {
        let store = SqliteStore::in_memory(&sample_schema()).unwrap();
        store.append(&record("1", "Alice")).unwrap();
        store.append(&record("2", "Bob")).unwrap();

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].decoded, Decoded::Ok(record("1", "Alice")));
        assert_eq!(rows[1].decoded, Decoded::Ok(record("2", "Bob")));
    }

    #[test]
    fn test_rewrite_replaces_rows() {
        let store = SqliteStore::in_memory(&sample_schema()).unwrap();
        store.append(&record("1", "Alice")).unwrap();
        store.append(&record("2", "Bob")).unwrap();

        store.rewrite(&[Row::ok(1, record("3", "Carol"))]).unwrap();

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].decoded, Decoded::Ok(record("3", "Carol")));
    }

    #[test]
    fn test_hostile_values_are_bound_not_interpolated() {
        let store = SqliteStore::in_memory(&sample_schema()).unwrap();
        let hostile = record("1", "Robert'); DROP TABLE member;--");
        store.append(&hostile).unwrap();

        let rows = store.list().unwrap();
        assert_eq!(rows[0].decoded, Decoded::Ok(hostile));
    }
}
