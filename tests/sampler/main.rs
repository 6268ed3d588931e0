#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod grid;
mod random;

use std::sync::Arc;

use lockstep::storage::{MemoryStore, RecordStore};
use lockstep::{Record, SearchSpace};

/// a ∈ {1,2,3}, b ∈ {4,5}: a grid of six points.
fn small_grid() -> SearchSpace {
    SearchSpace::builder()
        .int("a", 1, 3)
        .int("b", 4, 5)
        .build()
        .unwrap()
}

fn mixed_space() -> SearchSpace {
    SearchSpace::builder()
        .uniform("lr", 1e-4, 1e-1)
        .int("layers", 1, 8)
        .categorical("act", 3)
        .build()
        .unwrap()
}

fn memory_store() -> Arc<dyn RecordStore> {
    Arc::new(MemoryStore::new())
}

fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().map(Record::id).collect()
}
