//! Random-access enumeration of a fully discrete search space.
//!
//! Grid index `0..len()` is decoded in mixed radix over the dimension
//! cardinalities, with the last dimension varying fastest. Each dimension's
//! cell `k` out of `c` is represented by the raw coordinate of the cell
//! centre, `(k + 0.5) / c`, so mapping the coordinates through the space
//! always lands back on cell `k`.

use crate::error::{Error, Result};
use crate::space::{Point, SearchSpace};

/// Largest supported number of grid points, `2^53`.
///
/// Indices are drawn and decoded through `f64` arithmetic, which is exact
/// only up to this bound.
pub const MAX_GRID_SIZE: u64 = 1 << 53;

/// Enumerates every assignment of a fully discrete [`SearchSpace`].
///
/// A grid holds at most [`MAX_GRID_SIZE`] points.
///
/// # Examples
///
/// ```
/// use lockstep::{ParamValue, ParameterGrid, SearchSpace};
///
/// let space = SearchSpace::builder()
///     .int("a", 1, 3)
///     .int("b", 4, 5)
///     .build()
///     .unwrap();
/// let grid = ParameterGrid::new(&space).unwrap();
///
/// assert_eq!(grid.len(), 6);
/// let point = grid.get(1).unwrap();
/// assert_eq!(point.get("a"), Some(&ParamValue::Int(1)));
/// assert_eq!(point.get("b"), Some(&ParamValue::Int(5)));
/// ```
#[derive(Clone, Debug)]
pub struct ParameterGrid {
    space: SearchSpace,
    cardinalities: Vec<u64>,
    size: u64,
}

impl ParameterGrid {
    /// Builds the grid of a discrete space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDiscrete`] if any dimension is continuous and
    /// [`Error::GridTooLarge`] if the number of assignments exceeds
    /// [`MAX_GRID_SIZE`].
    pub fn new(space: &SearchSpace) -> Result<Self> {
        if !space.is_discrete() {
            return Err(Error::NotDiscrete);
        }

        let mut cardinalities = Vec::with_capacity(space.len());
        let mut size: u64 = 1;
        for dist in space.distributions() {
            let c = dist.cardinality().ok_or(Error::GridTooLarge)?;
            size = size
                .checked_mul(c)
                .filter(|&s| s <= MAX_GRID_SIZE)
                .ok_or(Error::GridTooLarge)?;
            cardinalities.push(c);
        }

        Ok(Self {
            space: space.clone(),
            cardinalities,
            size,
        })
    }

    /// Number of assignments in the grid.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Whether the grid has no assignment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Per-dimension cardinalities, in dimension order.
    #[must_use]
    pub fn cardinalities(&self) -> &[u64] {
        &self.cardinalities
    }

    /// Raw unit-cube coordinates of the assignment at `index`.
    ///
    /// Returns `None` if `index >= len()`.
    #[must_use]
    pub fn coordinates(&self, index: u64) -> Option<Vec<f64>> {
        (index < self.size).then(|| self.cell_centres(index))
    }

    /// Decodes `index` without a bounds check; indices wrap modulo `len()`.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn cell_centres(&self, index: u64) -> Vec<f64> {
        let mut raw = vec![0.0; self.cardinalities.len()];
        let mut rest = index;
        for (slot, &c) in raw.iter_mut().zip(&self.cardinalities).rev() {
            let k = rest % c;
            rest /= c;
            *slot = (k as f64 + 0.5) / c as f64;
        }
        raw
    }

    /// Concrete assignment at `index`.
    ///
    /// Returns `None` if `index >= len()`.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<Point> {
        let raw = self.coordinates(index)?;
        self.space.map_unit(&raw).ok()
    }

    /// Iterates over every assignment in index order.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.size).filter_map(|i| self.get(i))
    }
}
