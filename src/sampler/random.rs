//! Random sampler implementation.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::grid::ParameterGrid;
use crate::record::{Record, Token};
use crate::rng::{self, SeedSource, SharedRng};
use crate::sampler::{Sampler, StoreAndSpace};
use crate::space::{Point, SearchSpace};
use crate::storage::{MemoryStore, RecordStore, StoreScope};

/// A reproducible random sampler that never hands out the same grid point
/// twice, even across processes sharing one store.
///
/// The number of records in the store is the global step index. Before each
/// draw the sampler fast-forwards its generator to the position that index
/// implies, by discarding the draws that other samplers made in the
/// meantime. Any number of samplers seeded alike therefore produce, together,
/// exactly the sequence a single sampler would have produced alone, whatever
/// the interleaving.
///
/// * **Fully discrete space**: draws without replacement over the
///   [`ParameterGrid`]. The token id is the grid index. Each step costs one
///   entropy unit. Returns [`Error::Exhausted`] once every index is recorded.
/// * **Otherwise**: draws an independent point of the unit cube. The token id
///   is the step index. Each step costs one entropy unit per dimension.
///
/// The fast-forward arithmetic assumes every sampler writing to a store uses
/// the same per-step cost. Mixing discrete and continuous samplers, or
/// spaces of different sizes, on one store silently breaks reproducibility.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use lockstep::prelude::*;
///
/// let store = Arc::new(MemoryStore::new());
/// let space = SearchSpace::builder()
///     .int("a", 1, 3)
///     .int("b", 4, 5)
///     .build()
///     .unwrap();
///
/// let sampler = RandomSampler::new(store, space, 42).unwrap();
///
/// let mut ids = Vec::new();
/// loop {
///     match sampler.next() {
///         Ok((token, _point)) => ids.push(token.id),
///         Err(Error::Exhausted { .. }) => break,
///         Err(e) => panic!("{e}"),
///     }
/// }
/// ids.sort_unstable();
/// assert_eq!(ids, [0, 1, 2, 3, 4, 5]);
/// ```
pub struct RandomSampler {
    store: Arc<dyn RecordStore>,
    space: SearchSpace,
    grid: Option<ParameterGrid>,
    rng: SharedRng,
    /// Entropy-consuming steps this instance has accounted for. Never
    /// persisted; reconciled against the store on every draw and only
    /// advanced, together with the generator, once a record is committed.
    drawn: AtomicU64,
}

impl RandomSampler {
    /// Creates a sampler over `space` that records draws in `store`.
    ///
    /// `seed` is anything convertible into a [`SeedSource`]: a `u64` seed,
    /// `None` for the process-wide generator, or a [`SharedRng`] handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GridTooLarge`] if the space is discrete but has more
    /// assignments than fit in a `u64`.
    pub fn new(
        store: Arc<dyn RecordStore>,
        space: SearchSpace,
        seed: impl Into<SeedSource>,
    ) -> Result<Self> {
        let grid = if space.is_discrete() {
            Some(ParameterGrid::new(&space)?)
        } else {
            None
        };

        Ok(Self {
            store,
            space,
            grid,
            rng: seed.into().into_rng(),
            drawn: AtomicU64::new(0),
        })
    }

    /// Creates a builder for a sampler.
    #[must_use]
    pub fn builder() -> RandomSamplerBuilder {
        RandomSamplerBuilder::new()
    }

    /// The grid drawn from, if the space is fully discrete.
    #[must_use]
    pub fn grid(&self) -> Option<&ParameterGrid> {
        self.grid.as_ref()
    }

    /// The generator handle this sampler draws from.
    #[must_use]
    pub fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Number of steps this instance has accounted for so far.
    #[must_use]
    pub fn drawn(&self) -> u64 {
        self.drawn.load(Ordering::SeqCst)
    }

    /// Without-replacement draw over the grid at step `step`, advancing
    /// `rng` from this instance's position.
    fn draw_from_grid(
        &self,
        scope: &mut dyn StoreScope,
        rng: &mut fastrand::Rng,
        grid: &ParameterGrid,
        step: u64,
    ) -> Result<(Token, Vec<f64>)> {
        let size = grid.len();
        if step >= size {
            trace_info!(size, "search space exhausted");
            return Err(Error::Exhausted { size });
        }

        // Ascending, so the choice only depends on the generator state and
        // not on the order the store enumerates records in.
        let mut taken: Vec<u64> = scope
            .all_records()?
            .iter()
            .map(Record::id)
            .filter(|&id| id < size)
            .collect();
        taken.sort_unstable();
        taken.dedup();

        let available = size - taken.len() as u64;
        if available == 0 {
            trace_info!(size, "search space exhausted");
            return Err(Error::Exhausted { size });
        }

        let burned = step.saturating_sub(self.drawn());
        rng::burn(rng, burned);
        let k = rng::choose_index(rng, available);

        trace_debug!(step, burned, available, "grid draw");

        let index = nth_available(&taken, k);
        Ok((Token::new(index), grid.cell_centres(index)))
    }

    /// Independent unit-cube draw at step `step`, advancing `rng` from this
    /// instance's position.
    fn draw_continuous(&self, rng: &mut fastrand::Rng, step: u64) -> (Token, Vec<f64>) {
        let n = self.space.len();

        let burned = (n as u64).saturating_mul(step.saturating_sub(self.drawn()));
        rng::burn(rng, burned);
        let raw = rng::unit_vector(rng, n);

        trace_debug!(step, burned, "continuous draw");

        (Token::new(step), raw)
    }
}

/// The `k`-th (0-based) integer not present in `taken`, which must be
/// sorted ascending without duplicates.
fn nth_available(taken: &[u64], k: u64) -> u64 {
    let mut candidate = k;
    for &t in taken {
        if t <= candidate {
            candidate += 1;
        } else {
            break;
        }
    }
    candidate
}

impl StoreAndSpace for RandomSampler {
    fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn space(&self) -> &SearchSpace {
        &self.space
    }
}

impl Sampler for RandomSampler {
    fn next(&self) -> Result<(Token, Point)> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("random_next").entered();

        let mut scope = self.store.lock()?;
        let step = scope.count_records()?;
        trace_debug!(step, "store scope acquired");

        // Draw on a copy; the generator and `drawn` only move once the record
        // is committed, so a failed call leaves this instance in step.
        let mut rng = self.rng.lock();
        let mut draw = rng.clone();
        let (token, raw) = match &self.grid {
            Some(grid) => self.draw_from_grid(scope.as_mut(), &mut draw, grid, step)?,
            None => self.draw_continuous(&mut draw, step),
        };
        let point = self.space.map_unit(&raw)?;

        let record = Record::new(token, self.space.names(), &raw)?;
        scope.insert_record(record)?;
        scope.release()?;

        *rng = draw;
        self.drawn.fetch_max(step + 1, Ordering::SeqCst);
        drop(rng);

        trace_info!(id = token.id, step, "draw recorded");
        Ok((token, point))
    }
}

/// Builder for [`RandomSampler`].
///
/// # Defaults
///
/// - Store: a fresh [`MemoryStore`]
/// - Seed: [`SeedSource::Ambient`] (the process-wide generator)
///
/// # Examples
///
/// ```
/// use lockstep::prelude::*;
///
/// let space = SearchSpace::builder().uniform("x", 0.0, 1.0).build().unwrap();
/// let sampler = RandomSampler::builder()
///     .space(space)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let (token, _) = sampler.next().unwrap();
/// assert_eq!(token.id, 0);
/// ```
pub struct RandomSamplerBuilder {
    store: Option<Arc<dyn RecordStore>>,
    space: Option<SearchSpace>,
    seed: SeedSource,
}

impl RandomSamplerBuilder {
    fn new() -> Self {
        Self {
            store: None,
            space: None,
            seed: SeedSource::Ambient,
        }
    }

    /// Sets the store draws are recorded in.
    #[must_use]
    pub fn store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets a store handle that is shared with other samplers.
    #[must_use]
    pub fn shared_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the search space. Required.
    #[must_use]
    pub fn space(mut self, space: SearchSpace) -> Self {
        self.space = Some(space);
        self
    }

    /// Seeds a private generator.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = SeedSource::Seed(seed);
        self
    }

    /// Draws from an existing generator handle.
    #[must_use]
    pub fn rng(mut self, rng: SharedRng) -> Self {
        self.seed = SeedSource::Shared(rng);
        self
    }

    /// Sets the seed source explicitly.
    #[must_use]
    pub fn seed_source(mut self, seed: impl Into<SeedSource>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Builds the sampler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroDimensions`] if no space was set, and the errors
    /// of [`RandomSampler::new`].
    pub fn build(self) -> Result<RandomSampler> {
        let space = self.space.ok_or(Error::ZeroDimensions)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        RandomSampler::new(store, space, self.seed)
    }
}
