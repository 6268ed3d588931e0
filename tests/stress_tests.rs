//! Stress and large-scale tests.
//!
//! All tests are `#[ignore]`-gated so they don't run in normal CI.
//! Run with: `cargo test --all-features -- --ignored`

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use lockstep::sampler::{RandomSampler, Sampler};
use lockstep::storage::{MemoryStore, RecordStore};
use lockstep::{Error, Record, SearchSpace};

fn make_float_space(n: usize) -> SearchSpace {
    (0..n)
        .fold(SearchSpace::builder(), |b, i| {
            b.uniform(format!("x{i}"), -5.0, 5.0)
        })
        .build()
        .unwrap()
}

#[test]
#[ignore]
fn stress_many_draws_continuous() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let sampler = RandomSampler::new(Arc::clone(&store), make_float_space(5), 42).unwrap();

    for expected in 0..10_000 {
        let (token, _) = sampler.next().expect("continuous draws never exhaust");
        assert_eq!(token.id, expected);
    }
    assert_eq!(store.snapshot().unwrap().len(), 10_000);
}

#[test]
#[ignore]
fn stress_large_grid_exhaustion() {
    let space = SearchSpace::builder()
        .int("a", 0, 49)
        .int("b", 0, 39)
        .build()
        .unwrap();
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let sampler = RandomSampler::new(Arc::clone(&store), space, 42).unwrap();

    let mut seen = HashSet::new();
    loop {
        match sampler.next() {
            Ok((token, _)) => assert!(seen.insert(token.id), "id {} repeated", token.id),
            Err(Error::Exhausted { size }) => {
                assert_eq!(size, 2_000);
                break;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(seen.len(), 2_000);
}

#[test]
#[ignore]
fn stress_many_threads_many_dims() {
    let space = make_float_space(64);

    let reference_store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let reference = RandomSampler::new(Arc::clone(&reference_store), space.clone(), 9).unwrap();
    for _ in 0..1_600 {
        reference.next().unwrap();
    }

    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let sampler = RandomSampler::new(Arc::clone(&store), space.clone(), 9).unwrap();
            thread::spawn(move || {
                for _ in 0..100 {
                    sampler.next().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = store.snapshot().unwrap();
    let ids: Vec<u64> = records.iter().map(Record::id).collect();
    assert_eq!(ids, (0..1_600).collect::<Vec<_>>());
    assert_eq!(records, reference_store.snapshot().unwrap());
}
