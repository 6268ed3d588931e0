//! `SQLite`-backed record store for multi-process exploration.

use core::time::Duration;
use std::path::Path;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OptionalExtension};

use super::{RecordStore, StoreScope};
use crate::error::{Error, Result};
use crate::record::Record;

/// A record store that persists records in a `SQLite` database.
///
/// The exclusive scope is a `BEGIN IMMEDIATE` transaction: it takes the
/// database write lock up front, so the count read, the id enumeration and
/// the insert of one draw are isolated from every other connection.
/// Acquisition waits for as long as another connection holds the lock.
/// Releasing the scope commits; dropping it without release rolls back.
///
/// Record ids carry a `UNIQUE` constraint, so a duplicate id is rejected by
/// the database itself.
///
/// # Examples
///
/// ```no_run
/// use lockstep::storage::SqliteStore;
///
/// let store = SqliteStore::new("draws.db").unwrap();
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// WAL mode is enabled so readers never block the writer.
    ///
    /// # Errors
    ///
    /// Returns a [`Storage`](crate::Error::Storage) error if the
    /// database cannot be opened or the schema cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage_err)?;
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns a [`Storage`](crate::Error::Storage) error if the schema
    /// cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // WAL mode: concurrent readers, single writer.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(storage_err)?;
        conn.busy_handler(Some(wait_for_lock)).map_err(storage_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                seq       INTEGER PRIMARY KEY AUTOINCREMENT,
                record_id INTEGER NOT NULL UNIQUE,
                data      TEXT NOT NULL
            );",
        )
        .map_err(storage_err)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Busy handler that never gives up, so acquiring the scope blocks until
/// the competing transaction finishes.
fn wait_for_lock(_attempt: i32) -> bool {
    std::thread::sleep(Duration::from_millis(1));
    true
}

impl RecordStore for SqliteStore {
    fn lock(&self) -> Result<Box<dyn StoreScope + '_>> {
        let conn = self.conn.lock();
        conn.execute_batch("BEGIN IMMEDIATE").map_err(storage_err)?;
        Ok(Box::new(SqliteScope { conn, open: true }))
    }
}

struct SqliteScope<'a> {
    conn: MutexGuard<'a, Connection>,
    /// Whether the transaction still needs a `COMMIT` or `ROLLBACK`.
    open: bool,
}

impl StoreScope for SqliteScope<'_> {
    #[allow(clippy::cast_sign_loss)]
    fn count_records(&mut self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(storage_err)?;
        Ok(n as u64)
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM records ORDER BY seq")
            .map_err(storage_err)?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_err)?;

        let mut records = Vec::new();
        for row in rows {
            let data = row.map_err(storage_err)?;
            let record: Record = serde_json::from_str(&data).map_err(storage_err)?;
            records.push(record);
        }

        Ok(records)
    }

    fn insert_record(&mut self, record: Record) -> Result<()> {
        let data = serde_json::to_string(&record).map_err(storage_err)?;
        let id = i64::try_from(record.id())
            .map_err(|_| Error::Storage(format!("record id {} exceeds i64", record.id())))?;
        self.conn
            .execute(
                "INSERT INTO records (record_id, data) VALUES (?1, ?2)",
                rusqlite::params![id, data],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    fn set_loss(&mut self, id: u64, loss: f64) -> Result<bool> {
        let Ok(key) = i64::try_from(id) else {
            return Ok(false);
        };
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM records WHERE record_id = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err)?;
        let Some(data) = data else {
            return Ok(false);
        };

        let mut record: Record = serde_json::from_str(&data).map_err(storage_err)?;
        record.loss = Some(loss);
        let data = serde_json::to_string(&record).map_err(storage_err)?;
        self.conn
            .execute(
                "UPDATE records SET data = ?1 WHERE record_id = ?2",
                rusqlite::params![data, key],
            )
            .map_err(storage_err)?;
        Ok(true)
    }

    fn release(mut self: Box<Self>) -> Result<()> {
        self.open = false;
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(storage_err(e));
        }
        Ok(())
    }
}

impl Drop for SqliteScope<'_> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn storage_err(e: impl ToString) -> Error {
    Error::Storage(e.to_string())
}
