use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use lockstep::sampler::{RandomSampler, Sampler, StoreAndSpace};
use lockstep::storage::{MemoryStore, RecordStore, StoreScope};
use lockstep::{Error, ParameterGrid, Record, Result, SearchSpace, SharedRng, Token};

use super::{ids, memory_store, mixed_space, small_grid};

/// Records produced by one sampler alone on a fresh store.
fn reference_run(space: &SearchSpace, seed: u64, steps: usize) -> Vec<Record> {
    let store = memory_store();
    let sampler = RandomSampler::new(Arc::clone(&store), space.clone(), seed).unwrap();
    for _ in 0..steps {
        sampler.next().unwrap();
    }
    store.snapshot().unwrap()
}

fn drain(sampler: &RandomSampler) -> Vec<u64> {
    let mut ids = Vec::new();
    loop {
        match sampler.next() {
            Ok((token, _)) => ids.push(token.id),
            Err(Error::Exhausted { .. }) => return ids,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[test]
fn test_seeded_grid_run_is_a_permutation() {
    let sampler = RandomSampler::new(memory_store(), small_grid(), 42).unwrap();

    let mut ids = Vec::new();
    for _ in 0..6 {
        ids.push(sampler.next().unwrap().0.id);
    }
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, [0, 1, 2, 3, 4, 5]);

    assert!(matches!(sampler.next(), Err(Error::Exhausted { size: 6 })));

    let rerun = RandomSampler::new(memory_store(), small_grid(), 42).unwrap();
    assert_eq!(drain(&rerun), ids);
}

#[test]
fn test_exhausted_is_sticky() {
    let sampler = RandomSampler::new(memory_store(), small_grid(), 1).unwrap();
    assert_eq!(drain(&sampler).len(), 6);
    for _ in 0..3 {
        assert!(matches!(sampler.next(), Err(Error::Exhausted { size: 6 })));
    }
    assert_eq!(sampler.store().snapshot().unwrap().len(), 6);
}

#[test]
fn test_grid_points_match_token_ids() {
    let space = small_grid();
    let grid = ParameterGrid::new(&space).unwrap();
    let sampler = RandomSampler::new(memory_store(), space, 3).unwrap();

    for _ in 0..6 {
        let (token, point) = sampler.next().unwrap();
        assert_eq!(Some(point), grid.get(token.id));
    }
}

#[test]
fn test_continuous_runs_are_reproducible() {
    let first = reference_run(&mixed_space(), 7, 20);
    let second = reference_run(&mixed_space(), 7, 20);
    assert_eq!(first, second);

    let other = reference_run(&mixed_space(), 8, 20);
    assert_ne!(first, other);
}

#[test]
fn test_continuous_ids_are_step_indices() {
    let space = mixed_space();
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::with_records(
        reference_run(&space, 99, 4),
    ));
    let sampler = RandomSampler::new(store, space, 5).unwrap();

    for expected in 4..10 {
        let (token, point) = sampler.next().unwrap();
        assert_eq!(token, Token::new(expected));
        assert_eq!(point.len(), 3);
    }
}

#[test]
fn test_continuous_values_in_bounds() {
    let space = mixed_space();
    let sampler = RandomSampler::new(memory_store(), space, 11).unwrap();

    for _ in 0..200 {
        let (_, point) = sampler.next().unwrap();
        let lr = point.get("lr").and_then(|v| v.as_f64()).unwrap();
        let layers = point.get("layers").and_then(|v| v.as_i64()).unwrap();
        let act = point.get("act").and_then(|v| v.as_index()).unwrap();
        assert!((1e-4..=1e-1).contains(&lr), "lr {lr} out of range");
        assert!((1..=8).contains(&layers), "layers {layers} out of range");
        assert!(act < 3, "act {act} out of range");
    }
}

#[test]
fn test_resume_grid_after_restart() {
    let reference = reference_run(&small_grid(), 42, 6);

    for k in 0..6 {
        let store = memory_store();
        let before = RandomSampler::new(Arc::clone(&store), small_grid(), 42).unwrap();
        for _ in 0..k {
            before.next().unwrap();
        }
        drop(before);

        let after = RandomSampler::new(Arc::clone(&store), small_grid(), 42).unwrap();
        drain(&after);
        assert_eq!(after.drawn(), 6);
        assert_eq!(
            ids(&store.snapshot().unwrap()),
            ids(&reference),
            "resumed after {k} records"
        );
    }
}

#[test]
fn test_resume_continuous_after_restart() {
    let space = mixed_space();
    let reference = reference_run(&space, 42, 12);

    for k in [0, 1, 5, 11] {
        let store: Arc<dyn RecordStore> =
            Arc::new(MemoryStore::with_records(reference[..k].to_vec()));
        let sampler = RandomSampler::new(Arc::clone(&store), space.clone(), 42).unwrap();
        for _ in k..12 {
            sampler.next().unwrap();
        }
        assert_eq!(store.snapshot().unwrap(), reference, "resumed after {k}");
    }
}

#[test]
fn test_alternating_samplers_match_single_run() {
    let space = mixed_space();
    let reference = reference_run(&space, 42, 10);

    let store = memory_store();
    let a = RandomSampler::new(Arc::clone(&store), space.clone(), 42).unwrap();
    let b = RandomSampler::new(Arc::clone(&store), space, 42).unwrap();
    for step in 0..10 {
        let sampler = if step % 3 == 0 { &b } else { &a };
        sampler.next().unwrap();
    }
    assert_eq!(store.snapshot().unwrap(), reference);

    let reference = reference_run(&small_grid(), 42, 6);
    let store = memory_store();
    let a = RandomSampler::new(Arc::clone(&store), small_grid(), 42).unwrap();
    let b = RandomSampler::new(Arc::clone(&store), small_grid(), 42).unwrap();
    for step in 0..6 {
        let sampler = if step % 2 == 0 { &a } else { &b };
        sampler.next().unwrap();
    }
    assert_eq!(store.snapshot().unwrap(), reference);
}

#[test]
fn test_threads_on_shared_store_match_single_run() {
    let space = mixed_space();
    let reference = reference_run(&space, 42, 100);

    let store = memory_store();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sampler = RandomSampler::new(Arc::clone(&store), space.clone(), 42).unwrap();
            thread::spawn(move || {
                for _ in 0..25 {
                    sampler.next().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.snapshot().unwrap(), reference);
}

#[test]
fn test_threads_exhaust_grid_without_repeats() {
    let space = SearchSpace::builder()
        .int("x", 0, 9)
        .int("y", 0, 9)
        .build()
        .unwrap();
    let reference = reference_run(&space, 42, 100);

    let store = memory_store();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sampler = RandomSampler::new(Arc::clone(&store), space.clone(), 42).unwrap();
            thread::spawn(move || drain(&sampler))
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "id {id} drawn twice");
        }
    }
    assert_eq!(seen.len(), 100);
    assert_eq!(ids(&store.snapshot().unwrap()), ids(&reference));
}

#[test]
fn test_foreign_records_are_never_redrawn() {
    let space = small_grid();
    let grid = ParameterGrid::new(&space).unwrap();
    let existing: Vec<Record> = [0, 2, 5]
        .into_iter()
        .map(|i| Record::new(Token::new(i), space.names(), &grid.coordinates(i).unwrap()).unwrap())
        .collect();
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::with_records(existing));

    let sampler = RandomSampler::new(store, space, 17).unwrap();
    let mut drawn = drain(&sampler);
    drawn.sort_unstable();
    assert_eq!(drawn, [1, 3, 4]);
}

#[test]
fn test_shared_generator_still_unique() {
    let rng = SharedRng::with_seed(42);
    let store = memory_store();
    let a = RandomSampler::new(Arc::clone(&store), small_grid(), rng.clone()).unwrap();
    let b = RandomSampler::new(Arc::clone(&store), small_grid(), rng).unwrap();
    assert!(a.rng().same_as(b.rng()));

    let mut all = Vec::new();
    for _ in 0..3 {
        all.push(a.next().unwrap().0.id);
        all.push(b.next().unwrap().0.id);
    }
    all.sort_unstable();
    assert_eq!(all, [0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_ambient_sampler_draws() {
    let sampler = RandomSampler::new(memory_store(), small_grid(), None::<u64>).unwrap();
    assert!(sampler.rng().same_as(&SharedRng::global()));
    let mut drawn = drain(&sampler);
    drawn.sort_unstable();
    assert_eq!(drawn, [0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_update_records_loss() {
    let store = memory_store();
    let sampler = RandomSampler::new(Arc::clone(&store), mixed_space(), 2).unwrap();

    let (first, _) = sampler.next().unwrap();
    let (second, _) = sampler.next().unwrap();
    sampler.update(&second, 0.5).unwrap();

    let records = store.snapshot().unwrap();
    assert_eq!(records[first.id as usize].loss, None);
    assert_eq!(records[second.id as usize].loss, Some(0.5));

    assert!(matches!(
        sampler.update(&Token::new(40), 1.0),
        Err(Error::UnknownToken(40))
    ));
}

/// Memory store whose next insert can be made to fail once.
struct FlakyStore {
    inner: MemoryStore,
    fail_next_insert: AtomicBool,
}

struct FlakyScope<'a> {
    inner: Box<dyn StoreScope + 'a>,
    fail_next_insert: &'a AtomicBool,
}

impl RecordStore for FlakyStore {
    fn lock(&self) -> Result<Box<dyn StoreScope + '_>> {
        Ok(Box::new(FlakyScope {
            inner: self.inner.lock()?,
            fail_next_insert: &self.fail_next_insert,
        }))
    }
}

impl StoreScope for FlakyScope<'_> {
    fn count_records(&mut self) -> Result<u64> {
        self.inner.count_records()
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        self.inner.all_records()
    }

    fn insert_record(&mut self, record: Record) -> Result<()> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(Error::Storage("disk full".into()));
        }
        self.inner.insert_record(record)
    }

    fn set_loss(&mut self, id: u64, loss: f64) -> Result<bool> {
        self.inner.set_loss(id, loss)
    }

    fn release(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.inner.release()
    }
}

#[test]
fn test_failed_insert_leaves_sampler_in_step() {
    for space in [mixed_space(), small_grid()] {
        let reference = reference_run(&space, 42, 4);

        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            fail_next_insert: AtomicBool::new(false),
        });
        let sampler = RandomSampler::new(store.clone(), space, 42).unwrap();
        sampler.next().unwrap();

        store.fail_next_insert.store(true, Ordering::SeqCst);
        assert!(matches!(sampler.next(), Err(Error::Storage(_))));
        assert_eq!(sampler.drawn(), 1);
        assert_eq!(store.snapshot().unwrap().len(), 1);

        for _ in 0..3 {
            sampler.next().unwrap();
        }
        assert_eq!(sampler.drawn(), 4);
        assert_eq!(store.snapshot().unwrap(), reference);
    }
}
