// 🗄️ Table Stores - Concrete connectors behind `TableStore`
//
// - SqliteTableStore: `SELECT * FROM "<table>"` on a shared connection
// - FileTableStore:   `<dir>/<table>.json` (array of objects) or `<dir>/<table>.csv`
// - MemoryTableStore: fixed tables for tests and demos
//
// Every store returns rows as untyped `RawRecord`s. Text cells that look
// like JSON objects or arrays are decoded so nested structures (line items,
// vaccine records, checklist items) survive a round trip through a flat
// column.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::config::is_valid_table_name;
use crate::error::{FetchError, FetchResult};
use crate::fetch::TableStore;
use crate::value::{records_from_json, RawRecord, RawValue};

fn ensure_valid(table: &str) -> FetchResult<()> {
    if is_valid_table_name(table) {
        Ok(())
    } else {
        Err(FetchError::InvalidTableName(table.to_string()))
    }
}

/// Text cell -> value, decoding embedded JSON arrays/objects
pub fn decode_text(text: &str) -> RawValue {
    let trimmed = text.trim();
    let looks_like_json = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));

    if looks_like_json {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return RawValue::from(json);
        }
    }
    RawValue::Text(text.to_string())
}

// ============================================================================
// SQLITE
// ============================================================================

/// Reads whole tables from a SQLite database.
///
/// Queries run on tokio's blocking pool; the connection mutex serializes them.
#[derive(Clone)]
pub struct SqliteTableStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTableStore {
    pub fn open(path: impl AsRef<Path>) -> FetchResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl TableStore for SqliteTableStore {
    async fn fetch_table(&self, table: &str) -> FetchResult<Vec<RawRecord>> {
        ensure_valid(table)?;

        let conn = Arc::clone(&self.conn);
        let table = table.to_string();

        tokio::task::spawn_blocking(move || {
            // A panic in another query leaves the connection usable for reads
            let conn = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            query_table(&conn, &table)
        })
        .await?
    }
}

fn query_table(conn: &Connection, table: &str) -> FetchResult<Vec<RawRecord>> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(FetchError::MissingTable(table.to_string()));
    }

    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", table))?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let rows = stmt.query_map([], |row| {
        let mut record = RawRecord::new();
        for (index, column) in columns.iter().enumerate() {
            let value = sql_value(row.get_ref(index)?);
            if !value.is_null() {
                record.insert(column.clone(), value);
            }
        }
        Ok(record)
    })?;

    let records = rows.collect::<Result<Vec<_>, _>>()?;
    debug!(table, rows = records.len(), "sqlite table read");
    Ok(records)
}

fn sql_value(value: ValueRef<'_>) -> RawValue {
    match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Number(i as f64),
        ValueRef::Real(f) => RawValue::Number(f),
        ValueRef::Text(bytes) => decode_text(&String::from_utf8_lossy(bytes)),
        // Binary columns carry nothing the mappers can read
        ValueRef::Blob(_) => RawValue::Null,
    }
}

// ============================================================================
// FILE DIRECTORY
// ============================================================================

/// One file per table in a directory; JSON wins when both exist
#[derive(Debug, Clone)]
pub struct FileTableStore {
    dir: PathBuf,
}

impl FileTableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TableStore for FileTableStore {
    async fn fetch_table(&self, table: &str) -> FetchResult<Vec<RawRecord>> {
        ensure_valid(table)?;

        let json_path = self.dir.join(format!("{}.json", table));
        if tokio::fs::try_exists(&json_path).await? {
            let content = tokio::fs::read_to_string(&json_path).await?;
            let json: serde_json::Value = serde_json::from_str(&content)?;
            return records_from_json(json)
                .ok_or_else(|| FetchError::malformed(table, "expected a JSON array of objects"));
        }

        let csv_path = self.dir.join(format!("{}.csv", table));
        if tokio::fs::try_exists(&csv_path).await? {
            let content = tokio::fs::read(&csv_path).await?;
            return parse_csv(&content);
        }

        Err(FetchError::MissingTable(table.to_string()))
    }
}

/// Header row names the fields; empty cells are left out of the record
pub fn parse_csv(content: &[u8]) -> FetchResult<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(header, cell)| (header.to_string(), decode_text(cell)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// IN MEMORY
// ============================================================================

#[derive(Debug, Clone)]
enum Payload {
    Records(Vec<RawRecord>),
    Failure(String),
}

/// Fixed tables held in memory; tables can also be set up to fail
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    tables: HashMap<String, Payload>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: impl Into<String>, records: Vec<RawRecord>) -> Self {
        self.tables.insert(table.into(), Payload::Records(records));
        self
    }

    /// A JSON payload as a remote store would return it; anything but an
    /// array fails the fetch
    pub fn with_json(mut self, table: impl Into<String>, json: serde_json::Value) -> Self {
        let payload = match records_from_json(json) {
            Some(records) => Payload::Records(records),
            None => Payload::Failure("expected a list of records".to_string()),
        };
        self.tables.insert(table.into(), payload);
        self
    }

    pub fn with_failure(mut self, table: impl Into<String>, reason: impl Into<String>) -> Self {
        self.tables.insert(table.into(), Payload::Failure(reason.into()));
        self
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn fetch_table(&self, table: &str) -> FetchResult<Vec<RawRecord>> {
        match self.tables.get(table) {
            Some(Payload::Records(records)) => Ok(records.clone()),
            Some(Payload::Failure(reason)) => Err(FetchError::malformed(table, reason.clone())),
            None => Err(FetchError::MissingTable(table.to_string())),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;
    use serde_json::json;

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text("plain"), RawValue::Text("plain".into()));
        assert_eq!(decode_text("[not json"), RawValue::Text("[not json".into()));
        assert!(matches!(decode_text(" [\"Bath\", \"Nails\"] "), RawValue::List(ref items) if items.len() == 2));
        assert!(matches!(decode_text("{\"Rabies\": \"2026-01-01\"}"), RawValue::Map(_)));
    }

    #[test]
    fn test_parse_csv() {
        let csv = b"name , qty,cost\nShampoo,9,$12.40\nTowels,,3\n";
        let records = parse_csv(csv).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(resolve::string(&records[0], &["name"]), Some("Shampoo".into()));
        assert_eq!(resolve::number(&records[0], &["cost"]), Some(12.4));
        assert!(!records[1].contains_key("qty"));
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE invoices (id TEXT, total REAL, qty INTEGER, items TEXT, note TEXT);
             INSERT INTO invoices VALUES ('inv-1', 120.5, 2, '[{\"name\": \"Bath\"}]', NULL);",
        )
        .unwrap();
        let store = SqliteTableStore::from_connection(conn);

        let records = store.fetch_table("invoices").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(resolve::number(&records[0], &["total"]), Some(120.5));
        assert_eq!(resolve::number(&records[0], &["qty"]), Some(2.0));
        assert!(matches!(records[0].get("items"), Some(RawValue::List(_))));
        assert!(!records[0].contains_key("note"));

        assert!(matches!(
            store.fetch_table("expenses").await,
            Err(FetchError::MissingTable(_))
        ));
        assert!(matches!(
            store.fetch_table("invoices; DROP TABLE invoices").await,
            Err(FetchError::InvalidTableName(_))
        ));
    }

    #[tokio::test]
    async fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vendors.json"), r#"[{"name": "PetSupply"}, 3]"#).unwrap();
        std::fs::write(dir.path().join("shifts.csv"), "staff_name,start\nAna,2025-03-01T09:00:00Z\n").unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"rows": []}"#).unwrap();

        let store = FileTableStore::new(dir.path());

        let vendors = store.fetch_table("vendors").await.unwrap();
        assert_eq!(vendors.len(), 1);

        let shifts = store.fetch_table("shifts").await.unwrap();
        assert_eq!(resolve::string(&shifts[0], &["staff_name"]), Some("Ana".into()));

        assert!(matches!(store.fetch_table("broken").await, Err(FetchError::Malformed { .. })));
        assert!(matches!(store.fetch_table("clients").await, Err(FetchError::MissingTable(_))));
        assert!(matches!(store.fetch_table("../etc").await, Err(FetchError::InvalidTableName(_))));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTableStore::new()
            .with_json("clients", json!([{"name": "Maya"}]))
            .with_json("payouts", json!({"error": "rate limited"}))
            .with_failure("expenses", "timeout");

        assert_eq!(store.fetch_table("clients").await.unwrap().len(), 1);
        assert!(store.fetch_table("payouts").await.is_err());
        assert!(store.fetch_table("expenses").await.is_err());
        assert!(matches!(store.fetch_table("nope").await, Err(FetchError::MissingTable(_))));
    }
}
