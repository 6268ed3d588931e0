//! JSONL-based journal store.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use super::{RecordStore, StoreScope};
use crate::error::{Error, Result};
use crate::record::Record;

/// One line of the journal file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum JournalEntry {
    Insert { record: Record },
    Loss { id: u64, loss: f64 },
}

/// A record store that appends entries as JSON lines to a file.
///
/// Multiple processes can share the same file: the exclusive scope holds an
/// exclusive `fs2` lock on the file, and re-reads the journal on acquisition
/// so that records written by other processes are always visible. Inside one
/// process an additional mutex keeps threads from contending on the file
/// lock.
///
/// # Examples
///
/// ```no_run
/// use lockstep::storage::{JournalStore, RecordStore};
///
/// let store = JournalStore::new("draws.jsonl");
/// let records = store.snapshot().unwrap();
/// ```
pub struct JournalStore {
    path: PathBuf,
    /// Serialise in-process scopes so we only hold the file lock once.
    local: Mutex<()>,
}

impl JournalStore {
    /// Creates a journal store backed by `path`.
    ///
    /// The file does not need to exist yet. It is created on the
    /// first scope acquisition.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            local: Mutex::new(()),
        }
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JournalStore {
    fn lock(&self) -> Result<Box<dyn StoreScope + '_>> {
        let guard = self.local.lock();

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(storage_err)?;

        FileExt::lock_exclusive(&file).map_err(storage_err)?;

        let mut scope = JournalScope {
            _guard: guard,
            file,
            records: Vec::new(),
            released: false,
        };
        // On error the scope drops here and unlocks the file.
        scope.records = read_journal(&scope.file)?;
        Ok(Box::new(scope))
    }
}

struct JournalScope<'a> {
    _guard: MutexGuard<'a, ()>,
    file: File,
    records: Vec<Record>,
    released: bool,
}

impl JournalScope<'_> {
    fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(storage_err)?;
        writeln!(self.file, "{line}").map_err(storage_err)?;
        self.file.flush().map_err(storage_err)?;
        Ok(())
    }
}

impl StoreScope for JournalScope<'_> {
    fn count_records(&mut self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn insert_record(&mut self, record: Record) -> Result<()> {
        self.append(&JournalEntry::Insert {
            record: record.clone(),
        })?;
        self.records.push(record);
        Ok(())
    }

    fn set_loss(&mut self, id: u64, loss: f64) -> Result<bool> {
        if !self.records.iter().any(|r| r.id() == id) {
            return Ok(false);
        }
        self.append(&JournalEntry::Loss { id, loss })?;
        apply_loss(&mut self.records, id, loss);
        Ok(true)
    }

    fn release(mut self: Box<Self>) -> Result<()> {
        self.released = true;
        FileExt::unlock(&self.file).map_err(storage_err)
    }
}

impl Drop for JournalScope<'_> {
    fn drop(&mut self) {
        if !self.released {
            // Closing the file releases the lock as well.
            let _ = FileExt::unlock(&self.file);
        }
    }
}

fn apply_loss(records: &mut [Record], id: u64, loss: f64) {
    if let Some(record) = records.iter_mut().find(|r| r.id() == id) {
        record.loss = Some(loss);
    }
}

/// Replay every entry of the journal, in file order.
fn read_journal(file: &File) -> Result<Vec<Record>> {
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(storage_err)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line).map_err(storage_err)? {
            JournalEntry::Insert { record } => records.push(record),
            JournalEntry::Loss { id, loss } => apply_loss(&mut records, id, loss),
        }
    }

    Ok(records)
}

#[allow(clippy::needless_pass_by_value)]
fn storage_err(e: impl ToString) -> Error {
    Error::Storage(e.to_string())
}
