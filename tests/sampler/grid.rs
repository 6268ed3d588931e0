use std::sync::Arc;
use std::thread;

use lockstep::sampler::{GridSampler, Sampler, StoreAndSpace};
use lockstep::{Error, ParamValue, ParameterGrid, SearchSpace};

use super::{ids, memory_store, mixed_space, small_grid};

#[test]
fn test_grid_sampler_enumerates_in_order() {
    let space = small_grid();
    let grid = ParameterGrid::new(&space).unwrap();
    let sampler = GridSampler::new(memory_store(), space).unwrap();

    let points: Vec<_> = (0..6).map(|_| sampler.next().unwrap().1).collect();
    let expected: Vec<_> = grid.iter().collect();
    assert_eq!(points, expected);

    let pairs: Vec<(i64, i64)> = points
        .iter()
        .map(|p| {
            (
                p.get("a").and_then(ParamValue::as_i64).unwrap(),
                p.get("b").and_then(ParamValue::as_i64).unwrap(),
            )
        })
        .collect();
    assert_eq!(pairs, [(1, 4), (1, 5), (2, 4), (2, 5), (3, 4), (3, 5)]);

    assert!(matches!(sampler.next(), Err(Error::Exhausted { size: 6 })));
}

#[test]
fn test_grid_sampler_resumes_from_store() {
    let store = memory_store();
    let first = GridSampler::new(Arc::clone(&store), small_grid()).unwrap();
    first.next().unwrap();
    first.next().unwrap();
    drop(first);

    let second = GridSampler::new(Arc::clone(&store), small_grid()).unwrap();
    assert!(!second.is_exhausted().unwrap());
    let (token, _) = second.next().unwrap();
    assert_eq!(token.id, 2);
}

#[test]
fn test_grid_sampler_threads_cover_grid_once() {
    let space = SearchSpace::builder()
        .categorical("c", 4)
        .quantized("q", 0.0, 1.0, 0.25)
        .build()
        .unwrap();
    let store = memory_store();

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let sampler = GridSampler::new(Arc::clone(&store), space.clone()).unwrap();
            thread::spawn(move || {
                let mut n = 0;
                while sampler.next().is_ok() {
                    n += 1;
                }
                n
            })
        })
        .collect();
    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(total, 20);
    assert_eq!(ids(&store.snapshot().unwrap()), (0..20).collect::<Vec<_>>());
}

#[test]
fn test_grid_sampler_update() {
    let store = memory_store();
    let sampler = GridSampler::new(Arc::clone(&store), small_grid()).unwrap();
    let (token, _) = sampler.next().unwrap();
    sampler.update(&token, -1.5).unwrap();
    assert_eq!(store.snapshot().unwrap()[0].loss, Some(-1.5));
}

#[test]
fn test_grid_sampler_requires_discrete_space() {
    assert!(matches!(
        GridSampler::new(memory_store(), mixed_space()),
        Err(Error::NotDiscrete)
    ));
}
