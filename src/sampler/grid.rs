//! Grid search sampler implementation.
//!
//! `GridSampler` walks the [`ParameterGrid`] of a fully discrete space in
//! index order, one point per call, using the store size as its position.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::grid::ParameterGrid;
use crate::record::{Record, Token};
use crate::sampler::{Sampler, StoreAndSpace};
use crate::space::{Point, SearchSpace};
use crate::storage::RecordStore;

/// A sampler that exhaustively enumerates a discrete space.
///
/// The `i`-th record of the store always holds grid point `i`, so several
/// grid samplers on one store split the grid between them without overlap,
/// and a restarted sampler resumes where the store left off. No generator is
/// involved.
///
/// # Grid Exhaustion
///
/// Once every point has been recorded, [`next`](Sampler::next) returns
/// [`Error::Exhausted`]. Use [`is_exhausted`](Self::is_exhausted) to check
/// beforehand.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use lockstep::prelude::*;
///
/// let space = SearchSpace::builder()
///     .categorical("optimizer", 2)
///     .int("layers", 1, 2)
///     .build()
///     .unwrap();
/// let sampler = GridSampler::new(Arc::new(MemoryStore::new()), space).unwrap();
///
/// assert_eq!(sampler.grid_size(), 4);
/// for expected in 0..4 {
///     let (token, _) = sampler.next().unwrap();
///     assert_eq!(token.id, expected);
/// }
/// assert!(sampler.is_exhausted().unwrap());
/// ```
pub struct GridSampler {
    store: Arc<dyn RecordStore>,
    space: SearchSpace,
    grid: ParameterGrid,
}

impl GridSampler {
    /// Creates a grid sampler over `space` that records draws in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDiscrete`] if any dimension is continuous and
    /// [`Error::GridTooLarge`] if the grid cannot be enumerated.
    pub fn new(store: Arc<dyn RecordStore>, space: SearchSpace) -> Result<Self> {
        let grid = ParameterGrid::new(&space)?;
        Ok(Self { store, space, grid })
    }

    /// Total number of grid points.
    #[must_use]
    pub fn grid_size(&self) -> u64 {
        self.grid.len()
    }

    /// The grid being enumerated.
    #[must_use]
    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    /// Returns `true` if the store already holds as many records as there
    /// are grid points.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn is_exhausted(&self) -> Result<bool> {
        let mut scope = self.store.lock()?;
        let exhausted = scope.count_records()? >= self.grid.len();
        scope.release()?;
        Ok(exhausted)
    }
}

impl StoreAndSpace for GridSampler {
    fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn space(&self) -> &SearchSpace {
        &self.space
    }
}

impl Sampler for GridSampler {
    fn next(&self) -> Result<(Token, Point)> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("grid_next").entered();

        let mut scope = self.store.lock()?;
        let step = scope.count_records()?;
        trace_debug!(step, "store scope acquired");

        let size = self.grid.len();
        if step >= size {
            trace_info!(size, "grid exhausted");
            return Err(Error::Exhausted { size });
        }

        let token = Token::new(step);
        let raw = self.grid.cell_centres(step);
        let point = self.space.map_unit(&raw)?;

        scope.insert_record(Record::new(token, self.space.names(), &raw)?)?;
        scope.release()?;

        trace_info!(id = token.id, "grid point recorded");
        Ok((token, point))
    }
}
