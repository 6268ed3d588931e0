use parking_lot::{Mutex, MutexGuard};

use super::{RecordStore, StoreScope};
use crate::error::Result;
use crate::record::Record;

/// In-memory record store.
///
/// This is a thin wrapper around `Mutex<Vec<Record>>`. Wrap it in an `Arc`
/// to share it between samplers on different threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn lock(&self) -> Result<Box<dyn StoreScope + '_>> {
        Ok(Box::new(MemoryScope {
            records: self.records.lock(),
        }))
    }
}

struct MemoryScope<'a> {
    records: MutexGuard<'a, Vec<Record>>,
}

impl StoreScope for MemoryScope<'_> {
    fn count_records(&mut self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn insert_record(&mut self, record: Record) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn set_loss(&mut self, id: u64, loss: f64) -> Result<bool> {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                record.loss = Some(loss);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
