//! Record store backends.
//!
//! A [`RecordStore`] holds the durable history of an exploration: one
//! [`Record`] per draw. Samplers only touch a store through an exclusive
//! [`StoreScope`] obtained from [`RecordStore::lock`]; the scope serializes
//! every reader and writer of the same store, across threads and (for the
//! file-backed stores) across processes.
//!
//! # Available backends
//!
//! | Backend | Description | Feature flag |
//! |---------|-------------|-------------|
//! | [`MemoryStore`] | In-memory `Vec` behind a mutex, shared between threads via `Arc` | — |
//! | `JournalStore` | JSONL file with `fs2` file locking for multi-process sharing | `journal` |
//! | `SqliteStore` | `SQLite` database, scope is a `BEGIN IMMEDIATE` transaction | `sqlite` |
//!
//! # Implementing a custom backend
//!
//! Implement [`RecordStore`] and return a [`StoreScope`] that holds whatever
//! lock your backend needs. The lock must be released when the scope is
//! dropped, so that early returns and errors never leave the store locked.

#[cfg(feature = "journal")]
mod journal;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "journal")]
pub use journal::JournalStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::record::Record;

/// A shared store of records that can be locked exclusively.
///
/// Implementations must be `Send + Sync` because one store is typically
/// shared by several samplers on different threads.
pub trait RecordStore: Send + Sync {
    /// Blocks until the exclusive scope is acquired.
    ///
    /// The scope is released when the returned value is dropped or
    /// [released](StoreScope::release).
    ///
    /// # Errors
    ///
    /// Returns a backend error if the underlying lock or file cannot be
    /// acquired.
    fn lock(&self) -> Result<Box<dyn StoreScope + '_>>;

    /// Returns a copy of every record, taken under the exclusive scope.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`lock`](Self::lock) and
    /// [`all_records`](StoreScope::all_records).
    fn snapshot(&self) -> Result<Vec<Record>> {
        let mut scope = self.lock()?;
        let records = scope.all_records()?;
        scope.release()?;
        Ok(records)
    }
}

/// Exclusive access to a [`RecordStore`].
///
/// Everything done through one scope is a single atomic unit from the point
/// of view of other callers of the same store.
pub trait StoreScope {
    /// Number of records currently stored.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the store cannot be read.
    fn count_records(&mut self) -> Result<u64>;

    /// Every stored record. The order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the store cannot be read.
    fn all_records(&mut self) -> Result<Vec<Record>>;

    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the record cannot be written.
    fn insert_record(&mut self, record: Record) -> Result<()>;

    /// Sets the loss of the record with `id`. Returns `false` if there is no
    /// such record.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the update cannot be written.
    fn set_loss(&mut self, id: u64, loss: f64) -> Result<bool>;

    /// Releases the scope, surfacing errors that a plain drop would have to
    /// swallow (for example a failed commit).
    ///
    /// # Errors
    ///
    /// Returns a backend error if the release fails.
    fn release(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
