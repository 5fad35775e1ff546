//! SQLite persistence for calculation history.

use crate::{Result, TallyError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tally_types::{CalculationRecord, SessionId, MAX_EXPRESSION_LEN};

/// SQLite-backed history of calculations, partitioned by session.
///
/// All access goes through one connection guarded by a mutex, so every
/// mutation is applied atomically with respect to other callers.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Each statement is atomic, so a poisoned lock still holds a usable connection.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS calculations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                expression TEXT NOT NULL,
                result TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                session_id TEXT NOT NULL,
                error_message TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_calculations_session_time
                ON calculations(session_id, timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Store a successful calculation.
    pub fn append(
        &self,
        expression: &str,
        result: &str,
        session_id: &SessionId,
    ) -> Result<CalculationRecord> {
        self.insert(expression, result, session_id, None)
    }

    /// Store a failed calculation with the reason it failed.
    pub fn append_failure(
        &self,
        expression: &str,
        error_message: &str,
        session_id: &SessionId,
    ) -> Result<CalculationRecord> {
        self.insert(expression, "", session_id, Some(error_message))
    }

    fn insert(
        &self,
        expression: &str,
        result: &str,
        session_id: &SessionId,
        error_message: Option<&str>,
    ) -> Result<CalculationRecord> {
        if expression.chars().count() > MAX_EXPRESSION_LEN {
            return Err(TallyError::InvalidExpression(format!(
                "expression is longer than {MAX_EXPRESSION_LEN} characters"
            )));
        }

        let timestamp = Utc::now();
        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO calculations (expression, result, timestamp, session_id, error_message)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                expression,
                result,
                format_timestamp(&timestamp),
                session_id.as_str(),
                error_message,
            ],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!(target: "tally::history", "Stored calculation {} for session {}", id, session_id);

        Ok(CalculationRecord {
            id,
            expression: expression.to_string(),
            result: result.to_string(),
            timestamp: parse_timestamp(&format_timestamp(&timestamp)),
            session_id: session_id.clone(),
            error_message: error_message.map(str::to_string),
        })
    }

    /// Get a record by ID.
    pub fn get(&self, id: i64) -> Result<Option<CalculationRecord>> {
        let conn = self.lock();
        let record = conn
            .query_row(
                "SELECT * FROM calculations WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// List up to `limit` records for a session, most recent first.
    pub fn list(&self, session_id: &SessionId, limit: u32) -> Result<Vec<CalculationRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM calculations
            WHERE session_id = ?1
            ORDER BY timestamp DESC, id DESC
            LIMIT ?2
            "#,
        )?;
        let records = stmt
            .query_map(params![session_id.as_str(), limit], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Number of records stored for a session.
    pub fn count(&self, session_id: &SessionId) -> Result<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM calculations WHERE session_id = ?1",
            params![session_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete a record regardless of owner. Returns whether a record was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let removed = conn.execute("DELETE FROM calculations WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Delete a record only if it belongs to `session_id`.
    pub fn delete_owned(&self, id: i64, session_id: &SessionId) -> Result<bool> {
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM calculations WHERE id = ?1 AND session_id = ?2",
            params![id, session_id.as_str()],
        )?;
        Ok(removed > 0)
    }

    /// Delete every record of a session. Returns how many were removed.
    pub fn clear(&self, session_id: &SessionId) -> Result<usize> {
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM calculations WHERE session_id = ?1",
            params![session_id.as_str()],
        )?;
        Ok(removed)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CalculationRecord> {
        let session_id: String = row.get("session_id")?;
        let timestamp: String = row.get("timestamp")?;

        let session_id = SessionId::new(&session_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        Ok(CalculationRecord {
            id: row.get("id")?,
            expression: row.get("expression")?,
            result: row.get("result")?,
            timestamp: parse_timestamp(&timestamp),
            session_id,
            error_message: row.get("error_message")?,
        })
    }
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (HistoryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("history").join("test.db");
        let store = HistoryStore::open(&db_path).unwrap();
        (store, temp_dir)
    }

    fn session(name: &str) -> SessionId {
        SessionId::new(name).unwrap()
    }

    #[test]
    fn test_append_then_list_returns_record_first() {
        let (store, _dir) = create_test_store();
        let s = session("alpha");

        let record = store.append("2+3", "5", &s).unwrap();
        let records = store.list(&s, 50).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
        assert_eq!(records[0].expression, "2+3");
        assert_eq!(records[0].result, "5");
        assert!(records[0].error_message.is_none());
    }

    #[test]
    fn test_list_newest_first_and_limited() {
        let (store, _dir) = create_test_store();
        let s = session("alpha");

        for i in 0..5 {
            store.append(&format!("{i}+0"), &i.to_string(), &s).unwrap();
        }

        let records = store.list(&s, 3).unwrap();
        let expressions: Vec<&str> = records.iter().map(|r| r.expression.as_str()).collect();
        assert_eq!(expressions, vec!["4+0", "3+0", "2+0"]);
        assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_list_unknown_session_is_empty() {
        let (store, _dir) = create_test_store();
        store.append("1+1", "2", &session("alpha")).unwrap();
        assert!(store.list(&session("beta"), 50).unwrap().is_empty());
    }

    #[test]
    fn test_sessions_are_partitioned() {
        let (store, _dir) = create_test_store();
        let a = session("alpha");
        let b = session("beta");
        store.append("1+1", "2", &a).unwrap();
        store.append("2+2", "4", &b).unwrap();
        store.append("3+3", "6", &b).unwrap();

        assert_eq!(store.count(&a).unwrap(), 1);
        assert_eq!(store.count(&b).unwrap(), 2);
        assert!(store.list(&a, 50).unwrap().iter().all(|r| r.session_id == a));
    }

    #[test]
    fn test_delete_missing_returns_false() {
        let (store, _dir) = create_test_store();
        let s = session("alpha");
        store.append("1+1", "2", &s).unwrap();

        assert!(!store.delete(9999).unwrap());
        assert_eq!(store.count(&s).unwrap(), 1);
    }

    #[test]
    fn test_delete_removes_record() {
        let (store, _dir) = create_test_store();
        let s = session("alpha");
        let record = store.append("1+1", "2", &s).unwrap();

        assert!(store.delete(record.id).unwrap());
        assert!(store.get(record.id).unwrap().is_none());
        assert!(!store.delete(record.id).unwrap());
    }

    #[test]
    fn test_delete_owned_checks_session() {
        let (store, _dir) = create_test_store();
        let owner = session("alpha");
        let record = store.append("1+1", "2", &owner).unwrap();

        assert!(!store.delete_owned(record.id, &session("beta")).unwrap());
        assert!(store.get(record.id).unwrap().is_some());
        assert!(store.delete_owned(record.id, &owner).unwrap());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (store, _dir) = create_test_store();
        let s = session("alpha");
        let first = store.append("1+1", "2", &s).unwrap();
        store.delete(first.id).unwrap();
        let second = store.append("1+1", "2", &s).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_clear_only_touches_one_session() {
        let (store, _dir) = create_test_store();
        let a = session("alpha");
        let b = session("beta");
        store.append("1+1", "2", &a).unwrap();
        store.append("2+2", "4", &a).unwrap();
        store.append("3+3", "6", &b).unwrap();

        assert_eq!(store.clear(&a).unwrap(), 2);
        assert!(store.list(&a, 50).unwrap().is_empty());
        assert_eq!(store.count(&b).unwrap(), 1);
    }

    #[test]
    fn test_clear_empty_session_is_noop() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.clear(&session("nobody")).unwrap(), 0);
    }

    #[test]
    fn test_append_failure_keeps_message() {
        let store = HistoryStore::open_in_memory().unwrap();
        let s = session("alpha");
        let record = store.append_failure("5/0", "Cannot divide by zero", &s).unwrap();

        assert!(record.is_failure());
        assert_eq!(record.result, "");
        let stored = store.get(record.id).unwrap().unwrap();
        assert_eq!(stored.error_message.as_deref(), Some("Cannot divide by zero"));
    }

    #[test]
    fn test_append_rejects_overlong_expression() {
        let store = HistoryStore::open_in_memory().unwrap();
        let expr = "1".repeat(MAX_EXPRESSION_LEN + 1);
        let err = store.append(&expr, "1", &session("alpha")).unwrap_err();
        assert!(matches!(err, TallyError::InvalidExpression(_)));
        assert_eq!(store.count(&session("alpha")).unwrap(), 0);
    }

    #[test]
    fn test_reopen_keeps_history() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let s = session("alpha");
        {
            let store = HistoryStore::open(&db_path).unwrap();
            store.append("7*6", "42", &s).unwrap();
        }
        let store = HistoryStore::open(&db_path).unwrap();
        let records = store.list(&s, 50).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result, "42");
    }

    #[test]
    fn test_concurrent_appends() {
        let store = std::sync::Arc::new(HistoryStore::open_in_memory().unwrap());
        let s = session("alpha");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let s = s.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        store.append(&format!("{i}+{j}"), "0", &s).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count(&s).unwrap(), 80);
    }
}
